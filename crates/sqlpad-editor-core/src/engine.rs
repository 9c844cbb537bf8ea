//! The editing engine and the surface it paints into.
//!
//! `EditorEngine` is the seam between lifecycle management and an actual
//! editor implementation. `RopeEngine` is the crate's own engine: it keeps an
//! `EditorState` and repaints a `Surface` supplied by a `SurfaceHost` (a DOM
//! element in the browser crate, a recording buffer in tests).

use smol_str::SmolStr;
use thiserror::Error;

use crate::extension::{EngineSettings, ExtensionSet};
use crate::transaction::{EditorState, Transaction};
use crate::types::MountId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The host could not attach a surface.
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(SmolStr),
    /// The transaction was built against an older state.
    #[error("stale transaction: built against version {found}, engine is at {expected}")]
    StaleTransaction { expected: u64, found: u64 },
}

/// Something the engine draws its state into.
pub trait Surface {
    fn paint(&mut self, state: &EditorState, settings: &EngineSettings);

    /// Detach from the host. Consumes the surface.
    fn remove(self);
}

/// Provider of surfaces at one mount point.
pub trait SurfaceHost {
    type Surface: Surface;

    fn mount_id(&self) -> MountId;

    fn create_surface(&self, settings: &EngineSettings) -> Result<Self::Surface, EngineError>;
}

/// An editor engine instance attached to a host.
pub trait EditorEngine: Sized {
    type Host: SurfaceHost;

    /// Create and attach an engine seeded with `document`, configured by
    /// resolving `extensions` in order.
    fn create(host: &Self::Host, document: &str, extensions: &ExtensionSet)
    -> Result<Self, EngineError>;

    fn state(&self) -> &EditorState;

    fn settings(&self) -> &EngineSettings;

    /// Apply a transaction built against the current state.
    fn apply(&mut self, transaction: Transaction) -> Result<(), EngineError>;

    /// Detach from the host and free the engine.
    fn destroy(self);
}

/// Rope-backed engine painting into a host surface.
pub struct RopeEngine<H: SurfaceHost> {
    state: EditorState,
    settings: EngineSettings,
    surface: H::Surface,
}

impl<H: SurfaceHost> RopeEngine<H> {
    pub fn surface(&self) -> &H::Surface {
        &self.surface
    }
}

impl<H: SurfaceHost> EditorEngine for RopeEngine<H> {
    type Host = H;

    fn create(host: &H, document: &str, extensions: &ExtensionSet) -> Result<Self, EngineError> {
        let settings = extensions.resolve();
        let mut surface = host.create_surface(&settings)?;
        let state = EditorState::new(document);
        surface.paint(&state, &settings);
        Ok(Self {
            state,
            settings,
            surface,
        })
    }

    fn state(&self) -> &EditorState {
        &self.state
    }

    fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn apply(&mut self, transaction: Transaction) -> Result<(), EngineError> {
        if transaction.start_version() != self.state.version() {
            return Err(EngineError::StaleTransaction {
                expected: self.state.version(),
                found: transaction.start_version(),
            });
        }
        self.state = transaction.into_state();
        self.surface.paint(&self.state, &self.settings);
        Ok(())
    }

    fn destroy(self) {
        self.surface.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryHost;
    use crate::providers::{EditorSettings, ExtensionProviders};
    use crate::transaction::{Change, TransactionSpec};
    use crate::types::{Dimensions, Selection};

    fn extensions() -> ExtensionSet {
        ExtensionProviders::default().compose(&EditorSettings::default(), Dimensions::new(640.0, 480.0))
    }

    #[test]
    fn test_create_paints_initial_document() {
        let host = MemoryHost::new("editor");
        let engine = RopeEngine::create(&host, "SELECT 1", &extensions()).unwrap();

        assert_eq!(engine.state().doc_string(), "SELECT 1");
        assert_eq!(host.attached(), 1);
        let paint = host.last_paint().unwrap();
        assert_eq!(paint.text, "SELECT 1");
        assert_eq!(paint.language.as_deref(), Some("sql"));
    }

    #[test]
    fn test_apply_and_destroy() {
        let host = MemoryHost::new("editor");
        let mut engine = RopeEngine::create(&host, "SELECT 1", &extensions()).unwrap();

        let tr = engine
            .state()
            .update(
                TransactionSpec::new()
                    .change(Change::insert(8, ";"))
                    .select(Selection::collapsed(9)),
            )
            .unwrap();
        engine.apply(tr).unwrap();
        assert_eq!(engine.state().doc_string(), "SELECT 1;");
        assert_eq!(host.last_paint().unwrap().selection, Selection::collapsed(9));

        engine.destroy();
        assert_eq!(host.attached(), 0);
        assert_eq!(host.removed(), 1);
    }

    #[test]
    fn test_stale_transaction_rejected() {
        let host = MemoryHost::new("editor");
        let mut engine = RopeEngine::create(&host, "SELECT 1", &extensions()).unwrap();

        let first = engine
            .state()
            .update(TransactionSpec::new().change(Change::insert(8, ";")))
            .unwrap();
        let stale = engine
            .state()
            .update(TransactionSpec::new().change(Change::insert(0, "-- ")))
            .unwrap();
        engine.apply(first).unwrap();

        assert_eq!(
            engine.apply(stale),
            Err(EngineError::StaleTransaction {
                expected: 1,
                found: 0
            })
        );
        assert_eq!(engine.state().doc_string(), "SELECT 1;");
    }

    #[test]
    fn test_create_fails_without_surface() {
        let host = MemoryHost::new("editor");
        host.fail_next_attach("detached");
        let result = RopeEngine::create(&host, "", &extensions());
        assert!(matches!(result, Err(EngineError::SurfaceUnavailable(_))));
        assert_eq!(host.attached(), 0);
    }
}
