//! Instance lifecycle across renders.
//!
//! A host calls `LifecycleManager::render` every time its inputs may have
//! changed. The manager keeps at most one live instance and recreates it only
//! when the mount point, the extension set or the initial document actually
//! change. Read-only flag and callbacks are swapped in place through
//! `LiveConfig`, so they never cause a recreation.

use std::fmt;

use crate::config::{EditorConfiguration, LiveConfig};
use crate::engine::EditorEngine;
use crate::error::LifecycleError;
use crate::extension::ExtensionSet;
use crate::input::InputIntent;
use crate::instance::{DispatchOutcome, EditorInstance};
use crate::keymap::{KeyCombo, KeydownResult};
use crate::mount::{MountContext, MountRegistry};
use crate::transaction::{EditorState, Transaction, TransactionError, TransactionSpec};
use crate::types::MountId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    #[default]
    Unmounted,
    Creating,
    Live,
    Destroying,
}

impl LifecycleState {
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Unmounted, Creating)
                | (Creating, Live)
                | (Creating, Unmounted)
                | (Live, Live)
                | (Live, Destroying)
                | (Destroying, Unmounted)
        )
    }

    fn transition(&mut self, next: LifecycleState) -> Result<(), LifecycleError> {
        if !self.can_transition_to(next) {
            return Err(LifecycleError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unmounted => "unmounted",
            Self::Creating => "creating",
            Self::Live => "live",
            Self::Destroying => "destroying",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Created,
    Recreated,
    Unchanged,
}

/// Inputs the live instance was created from.
struct RenderInputs {
    mount: MountId,
    extensions: ExtensionSet,
    document: String,
}

pub struct LifecycleManager<E: EditorEngine> {
    registry: MountRegistry,
    config: LiveConfig,
    state: LifecycleState,
    instance: Option<EditorInstance<E>>,
    inputs: Option<RenderInputs>,
}

impl<E: EditorEngine> LifecycleManager<E> {
    pub fn new(registry: MountRegistry) -> Self {
        Self {
            registry,
            config: LiveConfig::default(),
            state: LifecycleState::Unmounted,
            instance: None,
            inputs: None,
        }
    }

    /// Reconcile the instance with the latest inputs.
    pub fn render(
        &mut self,
        mount: &MountContext<E::Host>,
        extensions: &ExtensionSet,
        config: EditorConfiguration,
    ) -> Result<RenderOutcome, LifecycleError> {
        let document = config.initial_document.clone();
        self.config.replace(config);

        let mount_id = mount.mount_id();
        let Some(reason) = self.recreate_reason(&mount_id, extensions, &document) else {
            self.state.transition(LifecycleState::Live)?;
            if let Some(inputs) = self.inputs.as_mut() {
                inputs.document = document;
            }
            return Ok(RenderOutcome::Unchanged);
        };

        let existed = self.instance.is_some();
        if existed {
            tracing::debug!(target: "sql_editor", mount = %mount_id, reason, "recreating editor");
            self.teardown()?;
        }
        self.create(mount, extensions, document)?;
        Ok(if existed {
            RenderOutcome::Recreated
        } else {
            RenderOutcome::Created
        })
    }

    fn recreate_reason(
        &self,
        mount: &MountId,
        extensions: &ExtensionSet,
        document: &str,
    ) -> Option<&'static str> {
        let (Some(instance), Some(inputs)) = (self.instance.as_ref(), self.inputs.as_ref()) else {
            return Some("no instance");
        };
        if instance.is_poisoned() {
            return Some("engine poisoned");
        }
        if inputs.mount != *mount {
            return Some("mount point changed");
        }
        if !inputs.extensions.same_as(extensions) {
            return Some("extensions changed");
        }
        // A host echoing the change callback back as the new initial document
        // must not reset the editor.
        if inputs.document != document && instance.document().as_deref() != Some(document) {
            return Some("initial document changed");
        }
        None
    }

    fn create(
        &mut self,
        mount: &MountContext<E::Host>,
        extensions: &ExtensionSet,
        document: String,
    ) -> Result<(), LifecycleError> {
        self.state.transition(LifecycleState::Creating)?;
        match EditorInstance::acquire(mount, extensions, self.config.clone(), &self.registry) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.inputs = Some(RenderInputs {
                    mount: mount.mount_id(),
                    extensions: extensions.clone(),
                    document,
                });
                self.state.transition(LifecycleState::Live)
            }
            Err(err) => {
                self.state.transition(LifecycleState::Unmounted)?;
                Err(err)
            }
        }
    }

    fn teardown(&mut self) -> Result<(), LifecycleError> {
        if self.instance.is_none() {
            return Ok(());
        }
        self.state.transition(LifecycleState::Destroying)?;
        let released = match self.instance.take() {
            Some(mut instance) => instance.release(),
            None => Ok(()),
        };
        self.inputs = None;
        self.state.transition(LifecycleState::Unmounted)?;
        released
    }

    /// Release the instance, if any. Safe to call repeatedly.
    pub fn unmount(&mut self) -> Result<(), LifecycleError> {
        self.teardown()
    }

    /// Dispatch a transaction to the live instance.
    pub fn dispatch(&mut self, transaction: Transaction) -> DispatchOutcome {
        match self.instance.as_mut() {
            Some(instance) => instance.dispatch(transaction),
            None => DispatchOutcome::Released,
        }
    }

    pub fn update(&mut self, spec: TransactionSpec) -> Result<DispatchOutcome, TransactionError> {
        match self.instance.as_mut() {
            Some(instance) => instance.update(spec),
            None => Ok(DispatchOutcome::Released),
        }
    }

    pub fn handle_key(&mut self, combo: &KeyCombo) -> KeydownResult {
        match self.instance.as_mut() {
            Some(instance) => instance.handle_key(combo),
            None => KeydownResult::NotHandled,
        }
    }

    pub fn handle_input(&mut self, intent: &InputIntent) -> bool {
        self.instance
            .as_mut()
            .is_some_and(|instance| instance.handle_input(intent))
    }

    pub fn execute_query(&self) -> bool {
        self.instance
            .as_ref()
            .is_some_and(EditorInstance::execute_query)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_live(&self) -> bool {
        self.state == LifecycleState::Live
    }

    pub fn instance(&self) -> Option<&EditorInstance<E>> {
        self.instance.as_ref()
    }

    pub fn mount_id(&self) -> Option<&MountId> {
        self.inputs.as_ref().map(|inputs| &inputs.mount)
    }

    pub fn editor_state(&self) -> Option<&EditorState> {
        self.instance.as_ref().and_then(EditorInstance::state)
    }

    pub fn document(&self) -> Option<String> {
        self.instance.as_ref().and_then(EditorInstance::document)
    }

    pub fn config(&self) -> &LiveConfig {
        &self.config
    }

    pub fn registry(&self) -> &MountRegistry {
        &self.registry
    }
}

impl<E: EditorEngine> Drop for LifecycleManager<E> {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            tracing::error!(target: "sql_editor", error = %err, "failed to release editor on drop");
        }
    }
}
