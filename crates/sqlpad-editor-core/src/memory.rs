//! In-memory surface host and parent binding.
//!
//! Used for headless editing and by the test suites: surfaces record what
//! was painted and the host counts attachments, so lifecycle guarantees
//! (one surface per mount, release exactly once) can be checked directly.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::engine::{EngineError, Surface, SurfaceHost};
use crate::error::LifecycleError;
use crate::extension::EngineSettings;
use crate::mount::{MountContext, ParentBinding};
use crate::transaction::EditorState;
use crate::types::{Dimensions, MountId, Selection};

/// Snapshot of one paint.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintRecord {
    pub text: String,
    pub selection: Selection,
    pub language: Option<SmolStr>,
    pub width: f64,
    pub height: f64,
    pub line_numbers: bool,
}

#[derive(Debug, Default)]
struct HostState {
    attached: usize,
    peak_attached: usize,
    created: usize,
    removed: usize,
    paints: usize,
    last_paint: Option<PaintRecord>,
    fail_next_attach: Option<SmolStr>,
}

/// A mount point that keeps surfaces in memory.
///
/// Clones share counters, so a test can keep a handle while the engine owns
/// another.
#[derive(Clone, Debug)]
pub struct MemoryHost {
    mount: MountId,
    state: Rc<RefCell<HostState>>,
}

impl MemoryHost {
    pub fn new(mount: impl Into<SmolStr>) -> Self {
        Self {
            mount: MountId::new(mount),
            state: Rc::default(),
        }
    }

    /// Make the next surface creation fail with `reason`.
    pub fn fail_next_attach(&self, reason: impl Into<SmolStr>) {
        self.state.borrow_mut().fail_next_attach = Some(reason.into());
    }

    /// Surfaces currently attached.
    pub fn attached(&self) -> usize {
        self.state.borrow().attached
    }

    /// Most surfaces ever attached at once.
    pub fn peak_attached(&self) -> usize {
        self.state.borrow().peak_attached
    }

    pub fn created(&self) -> usize {
        self.state.borrow().created
    }

    pub fn removed(&self) -> usize {
        self.state.borrow().removed
    }

    pub fn paint_count(&self) -> usize {
        self.state.borrow().paints
    }

    pub fn last_paint(&self) -> Option<PaintRecord> {
        self.state.borrow().last_paint.clone()
    }
}

impl SurfaceHost for MemoryHost {
    type Surface = MemorySurface;

    fn mount_id(&self) -> MountId {
        self.mount.clone()
    }

    fn create_surface(&self, _settings: &EngineSettings) -> Result<MemorySurface, EngineError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.fail_next_attach.take() {
            return Err(EngineError::SurfaceUnavailable(reason));
        }
        state.created += 1;
        state.attached += 1;
        state.peak_attached = state.peak_attached.max(state.attached);
        Ok(MemorySurface {
            host: self.state.clone(),
        })
    }
}

/// A surface that records paints into its host.
#[derive(Debug)]
pub struct MemorySurface {
    host: Rc<RefCell<HostState>>,
}

impl Surface for MemorySurface {
    fn paint(&mut self, state: &EditorState, settings: &EngineSettings) {
        let mut host = self.host.borrow_mut();
        host.paints += 1;
        host.last_paint = Some(PaintRecord {
            text: state.doc_string(),
            selection: state.selection(),
            language: settings.language.as_ref().map(|l| l.name.clone()),
            width: settings.theme.width,
            height: settings.theme.height,
            line_numbers: settings.line_numbers,
        });
    }

    fn remove(self) {
        let mut host = self.host.borrow_mut();
        host.attached -= 1;
        host.removed += 1;
    }
}

/// Resolves selectors against a fixed table of memory hosts.
#[derive(Debug, Default)]
pub struct MemoryBinding {
    mounts: RefCell<HashMap<SmolStr, (MemoryHost, Dimensions)>>,
}

impl MemoryBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mount point under `selector` and return its host.
    pub fn add_mount(&self, selector: &str, dimensions: Dimensions) -> MemoryHost {
        let host = MemoryHost::new(selector);
        self.mounts
            .borrow_mut()
            .insert(SmolStr::new(selector), (host.clone(), dimensions));
        host
    }

    pub fn set_dimensions(&self, selector: &str, dimensions: Dimensions) {
        if let Some(entry) = self.mounts.borrow_mut().get_mut(selector) {
            entry.1 = dimensions;
        }
    }

    pub fn remove_mount(&self, selector: &str) {
        self.mounts.borrow_mut().remove(selector);
    }
}

impl ParentBinding for MemoryBinding {
    type Host = MemoryHost;

    fn resolve(&self, selector: &str) -> Result<MountContext<MemoryHost>, LifecycleError> {
        match self.mounts.borrow().get(selector) {
            Some((host, dimensions)) => Ok(MountContext::new(host.clone(), *dimensions)),
            None => Err(LifecycleError::mount_unavailable(
                selector,
                "no mount point matches",
            )),
        }
    }
}
