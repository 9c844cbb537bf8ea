//! One engine instance attached to one mount point.
//!
//! `EditorInstance` owns the engine for its whole life and is the only place
//! transactions reach it. Every transaction goes through `dispatch`, which
//! enforces the read-only policy, applies the transaction and forwards
//! document changes to the change callback.

use smol_str::SmolStr;

use crate::config::LiveConfig;
use crate::engine::{EditorEngine, EngineError};
use crate::error::LifecycleError;
use crate::extension::ExtensionSet;
use crate::input::{InputIntent, transaction_for_input};
use crate::keymap::{CommandContext, CommandOutcome, KeyCombo, KeydownResult};
use crate::mount::{MountContext, MountRegistry};
use crate::transaction::{EditorState, Transaction, TransactionError, TransactionSpec};
use crate::types::{InstanceId, MountId};

/// What happened to a dispatched transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Applied { doc_changed: bool },
    /// Dropped by the read-only policy.
    Discarded,
    /// The engine failed to apply an earlier transaction and accepts no more.
    Poisoned,
    /// The instance was already released.
    Released,
}

pub struct EditorInstance<E: EditorEngine> {
    id: InstanceId,
    mount: MountId,
    engine: Option<E>,
    config: LiveConfig,
    registry: MountRegistry,
    poisoned: bool,
}

impl<E: EditorEngine> EditorInstance<E> {
    /// Create an engine at `mount`, seeded with the configuration's initial
    /// document and configured by `extensions`.
    ///
    /// Fails with `DuplicateInstance` if the registry already has a live
    /// instance at this mount, and with `MountUnavailable` if the host
    /// refuses the surface. Nothing is left attached on failure.
    pub fn acquire(
        mount: &MountContext<E::Host>,
        extensions: &ExtensionSet,
        config: LiveConfig,
        registry: &MountRegistry,
    ) -> Result<Self, LifecycleError> {
        let id = InstanceId::next();
        let mount_id = mount.mount_id();
        registry.claim(&mount_id, id)?;

        let engine = match E::create(&mount.parent, &config.initial_document(), extensions) {
            Ok(engine) => engine,
            Err(err) => {
                registry.release(&mount_id, id);
                tracing::warn!(target: "sql_editor", mount = %mount_id, error = %err, "engine creation failed");
                return Err(match err {
                    EngineError::SurfaceUnavailable(reason) => LifecycleError::MountUnavailable {
                        selector: SmolStr::new(mount_id.as_str()),
                        reason,
                    },
                    other => other.into(),
                });
            }
        };

        tracing::info!(target: "sql_editor", mount = %mount_id, instance = %id, "Initialized");

        Ok(Self {
            id,
            mount: mount_id,
            engine: Some(engine),
            config,
            registry: registry.clone(),
            poisoned: false,
        })
    }

    /// Intercept a transaction before the engine sees it.
    ///
    /// Document-changing transactions are discarded while read-only. Applied
    /// document changes are reported to the change callback with the full
    /// new document; selection-only transactions are not.
    pub fn dispatch(&mut self, transaction: Transaction) -> DispatchOutcome {
        let Some(engine) = self.engine.as_mut() else {
            return DispatchOutcome::Released;
        };
        if self.poisoned {
            return DispatchOutcome::Poisoned;
        }

        let doc_changed = transaction.doc_changed();
        if doc_changed && self.config.is_readonly() {
            tracing::debug!(
                target: "sql_editor",
                instance = %self.id,
                user_event = transaction.user_event().unwrap_or(""),
                "discarded document change while read-only"
            );
            return DispatchOutcome::Discarded;
        }

        if let Err(err) = engine.apply(transaction) {
            tracing::error!(target: "sql_editor", instance = %self.id, error = %err, "failed to apply transaction");
            self.poisoned = true;
            return DispatchOutcome::Poisoned;
        }

        if doc_changed {
            let text = engine.state().doc_string();
            self.config.emit_change(&text);
        }
        DispatchOutcome::Applied { doc_changed }
    }

    /// Build a transaction from `spec` against the current state and dispatch it.
    pub fn update(&mut self, spec: TransactionSpec) -> Result<DispatchOutcome, TransactionError> {
        let Some(engine) = self.engine.as_ref() else {
            return Ok(DispatchOutcome::Released);
        };
        let transaction = engine.state().update(spec)?;
        Ok(self.dispatch(transaction))
    }

    /// Run the binding for `combo`, if any.
    pub fn handle_key(&mut self, combo: &KeyCombo) -> KeydownResult {
        if self.poisoned {
            return KeydownResult::NotHandled;
        }
        let Some(engine) = self.engine.as_ref() else {
            return KeydownResult::NotHandled;
        };
        let Some(binding) = engine.settings().binding_for(combo) else {
            return KeydownResult::NotHandled;
        };

        tracing::trace!(target: "sql_editor", command = %binding.name, key = %combo, "running command");
        let run = binding.run.clone();
        let outcome = run(&CommandContext::new(engine.state(), engine.settings(), &self.config));

        match outcome {
            CommandOutcome::NotHandled => KeydownResult::NotHandled,
            CommandOutcome::Handled => KeydownResult::Handled,
            CommandOutcome::Dispatch(spec) => {
                if let Err(err) = self.update(spec) {
                    tracing::warn!(target: "sql_editor", key = %combo, error = %err, "command produced an invalid transaction");
                }
                KeydownResult::Handled
            }
        }
    }

    /// Turn platform input into a transaction and dispatch it.
    ///
    /// Returns true when the input was consumed and the platform default
    /// should be suppressed. Discarded read-only edits count as consumed.
    pub fn handle_input(&mut self, intent: &InputIntent) -> bool {
        if self.poisoned {
            return false;
        }
        let Some(engine) = self.engine.as_ref() else {
            return false;
        };
        let Some(spec) = transaction_for_input(engine.state(), engine.settings(), intent) else {
            return false;
        };
        if let Err(err) = self.update(spec) {
            tracing::warn!(target: "sql_editor", input = ?intent.input_type, error = %err, "input produced an invalid transaction");
        }
        true
    }

    /// Send the current document to the execute callback.
    pub fn execute_query(&self) -> bool {
        match self.engine.as_ref() {
            Some(engine) => self.config.execute(&engine.state().doc_string()),
            None => false,
        }
    }

    /// Destroy the engine and free the mount point.
    pub fn release(&mut self) -> Result<(), LifecycleError> {
        let Some(engine) = self.engine.take() else {
            return Err(LifecycleError::DoubleRelease(self.id));
        };
        engine.destroy();
        self.registry.release(&self.mount, self.id);
        tracing::debug!(target: "sql_editor", mount = %self.mount, instance = %self.id, "Released");
        Ok(())
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn mount(&self) -> &MountId {
        &self.mount
    }

    pub fn is_live(&self) -> bool {
        self.engine.is_some()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn state(&self) -> Option<&EditorState> {
        self.engine.as_ref().map(E::state)
    }

    pub fn document(&self) -> Option<String> {
        self.state().map(EditorState::doc_string)
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }
}

impl<E: EditorEngine> Drop for EditorInstance<E> {
    fn drop(&mut self) {
        if self.engine.is_some() {
            let _ = self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfiguration;
    use crate::engine::RopeEngine;
    use crate::memory::MemoryHost;
    use crate::providers::{EditorSettings, ExtensionProviders};
    use crate::transaction::Change;
    use crate::types::Dimensions;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Instance = EditorInstance<RopeEngine<MemoryHost>>;

    fn mount(host: &MemoryHost) -> MountContext<MemoryHost> {
        MountContext::new(host.clone(), Dimensions::new(640.0, 480.0))
    }

    fn extensions() -> ExtensionSet {
        ExtensionProviders::default().compose(&EditorSettings::default(), Dimensions::new(640.0, 480.0))
    }

    #[test]
    fn test_acquire_and_release() {
        let host = MemoryHost::new("editor");
        let registry = MountRegistry::new();
        let config = LiveConfig::new(EditorConfiguration::new("SELECT 1"));

        let mut instance = Instance::acquire(&mount(&host), &extensions(), config, &registry).unwrap();
        assert!(instance.is_live());
        assert_eq!(instance.document().as_deref(), Some("SELECT 1"));
        assert_eq!(registry.holder(instance.mount()), Some(instance.id()));
        assert_eq!(host.attached(), 1);

        instance.release().unwrap();
        assert!(!instance.is_live());
        assert_eq!(host.attached(), 0);
        assert_eq!(registry.live_count(), 0);

        assert_eq!(
            instance.release(),
            Err(LifecycleError::DoubleRelease(instance.id()))
        );
        assert_eq!(host.removed(), 1);
    }

    #[test]
    fn test_duplicate_instance_rejected() {
        let host = MemoryHost::new("editor");
        let registry = MountRegistry::new();

        let first = Instance::acquire(&mount(&host), &extensions(), LiveConfig::default(), &registry).unwrap();
        let second = Instance::acquire(&mount(&host), &extensions(), LiveConfig::default(), &registry);

        assert!(matches!(
            second,
            Err(LifecycleError::DuplicateInstance { existing, .. }) if existing == first.id()
        ));
        assert_eq!(host.attached(), 1);
    }

    #[test]
    fn test_surface_failure_is_mount_unavailable() {
        let host = MemoryHost::new("editor");
        host.fail_next_attach("element detached");
        let registry = MountRegistry::new();

        let result = Instance::acquire(&mount(&host), &extensions(), LiveConfig::default(), &registry);
        assert!(matches!(result, Err(LifecycleError::MountUnavailable { .. })));
        assert_eq!(registry.live_count(), 0);
    }

    #[test]
    fn test_dispatch_reports_changes() {
        let host = MemoryHost::new("editor");
        let registry = MountRegistry::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let config = LiveConfig::new(
            EditorConfiguration::new("SELECT 1").on_change(move |doc| sink.borrow_mut().push(doc.to_string())),
        );
        let mut instance = Instance::acquire(&mount(&host), &extensions(), config, &registry).unwrap();

        let outcome = instance
            .update(TransactionSpec::new().change(Change::insert(8, ";")))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Applied { doc_changed: true });

        let outcome = instance
            .update(TransactionSpec::new().select(crate::types::Selection::new(0, 6)))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Applied { doc_changed: false });

        assert_eq!(*seen.borrow(), vec!["SELECT 1;".to_string()]);
    }

    #[test]
    fn test_readonly_discards_document_changes() {
        let host = MemoryHost::new("editor");
        let registry = MountRegistry::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        let config = LiveConfig::new(
            EditorConfiguration::new("SELECT 1")
                .readonly(true)
                .on_change(move |_| *counter.borrow_mut() += 1),
        );
        let mut instance = Instance::acquire(&mount(&host), &extensions(), config, &registry).unwrap();

        let outcome = instance
            .update(TransactionSpec::new().change(Change::insert(8, ";")))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Discarded);
        assert_eq!(instance.document().as_deref(), Some("SELECT 1"));
        assert_eq!(*calls.borrow(), 0);

        // Selection still moves.
        let outcome = instance
            .update(TransactionSpec::new().select(crate::types::Selection::collapsed(3)))
            .unwrap();
        assert_eq!(outcome, DispatchOutcome::Applied { doc_changed: false });
    }

    #[test]
    fn test_stale_transaction_poisons() {
        let host = MemoryHost::new("editor");
        let registry = MountRegistry::new();
        let mut instance =
            Instance::acquire(&mount(&host), &extensions(), LiveConfig::default(), &registry).unwrap();

        let stale = instance
            .state()
            .unwrap()
            .update(TransactionSpec::new().change(Change::insert(0, "a")))
            .unwrap();
        instance
            .update(TransactionSpec::new().change(Change::insert(0, "b")))
            .unwrap();

        assert_eq!(instance.dispatch(stale), DispatchOutcome::Poisoned);
        assert!(instance.is_poisoned());
        assert_eq!(
            instance.update(TransactionSpec::new().change(Change::insert(0, "c"))),
            Ok(DispatchOutcome::Poisoned)
        );
        assert_eq!(instance.document().as_deref(), Some("b"));
    }

    #[test]
    fn test_drop_releases() {
        let host = MemoryHost::new("editor");
        let registry = MountRegistry::new();
        {
            let _instance =
                Instance::acquire(&mount(&host), &extensions(), LiveConfig::default(), &registry).unwrap();
            assert_eq!(host.attached(), 1);
        }
        assert_eq!(host.attached(), 0);
        assert_eq!(registry.live_count(), 0);
    }
}
