//! Caller configuration and its live view for running instances.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback receiving the full document text.
pub type TextCallback = Rc<dyn Fn(&str)>;

/// Snapshot of what the host wants the editor to be.
#[derive(Clone, Default)]
pub struct EditorConfiguration {
    /// Document the engine is seeded with.
    pub initial_document: String,
    /// Discard document-changing transactions.
    pub readonly: bool,
    /// Called with the full document after every applied change.
    pub on_change: Option<TextCallback>,
    /// Called by the execute-query command with the full document.
    pub on_execute: Option<TextCallback>,
}

impl EditorConfiguration {
    pub fn new(initial_document: impl Into<String>) -> Self {
        Self {
            initial_document: initial_document.into(),
            ..Self::default()
        }
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn on_change(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_change = Some(Rc::new(callback));
        self
    }

    pub fn on_execute(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_execute = Some(Rc::new(callback));
        self
    }
}

impl fmt::Debug for EditorConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorConfiguration")
            .field("initial_document", &self.initial_document)
            .field("readonly", &self.readonly)
            .field("on_change", &self.on_change.is_some())
            .field("on_execute", &self.on_execute.is_some())
            .finish()
    }
}

/// Stable handle to the latest configuration.
///
/// The instance and its commands hold a clone of this handle rather than the
/// callbacks themselves, so replacing the configuration takes effect for the
/// next transaction without recreating the engine.
#[derive(Clone, Default, Debug)]
pub struct LiveConfig(Rc<RefCell<EditorConfiguration>>);

impl LiveConfig {
    pub fn new(config: EditorConfiguration) -> Self {
        Self(Rc::new(RefCell::new(config)))
    }

    pub fn replace(&self, config: EditorConfiguration) {
        *self.0.borrow_mut() = config;
    }

    pub fn is_readonly(&self) -> bool {
        self.0.borrow().readonly
    }

    pub fn initial_document(&self) -> String {
        self.0.borrow().initial_document.clone()
    }

    /// Forward a document change. No-op without a change callback.
    pub fn emit_change(&self, text: &str) {
        // Release the borrow before calling out; the callback may replace the config.
        let callback = self.0.borrow().on_change.clone();
        if let Some(callback) = callback {
            callback(text);
        }
    }

    /// Forward text to the execute callback. Returns false when there is none.
    pub fn execute(&self, text: &str) -> bool {
        let callback = self.0.borrow().on_execute.clone();
        match callback {
            Some(callback) => {
                callback(text);
                true
            }
            None => false,
        }
    }
}
