//! The SQL editor as seen by a host: a selector, settings and a render call.

use smol_str::SmolStr;

use crate::config::EditorConfiguration;
use crate::engine::EditorEngine;
use crate::error::LifecycleError;
use crate::lifecycle::{LifecycleManager, RenderOutcome};
use crate::mount::{MountContext, MountRegistry, ParentBinding};
use crate::providers::{EditorSettings, ExtensionProviders};

/// Binds a SQL editor to the element a selector resolves to.
///
/// Each `render` resolves the mount point, runs the extension providers and
/// hands both to the lifecycle manager along with the caller's configuration.
pub struct SqlEditorHook<B, E>
where
    B: ParentBinding,
    E: EditorEngine<Host = B::Host>,
{
    selector: SmolStr,
    binding: B,
    settings: EditorSettings,
    providers: ExtensionProviders,
    manager: LifecycleManager<E>,
    mount: Option<MountContext<B::Host>>,
}

impl<B, E> SqlEditorHook<B, E>
where
    B: ParentBinding,
    E: EditorEngine<Host = B::Host>,
{
    pub fn new(selector: impl Into<SmolStr>, binding: B, registry: MountRegistry) -> Self {
        Self {
            selector: selector.into(),
            binding,
            settings: EditorSettings::default(),
            providers: ExtensionProviders::default(),
            manager: LifecycleManager::new(registry),
            mount: None,
        }
    }

    pub fn with_settings(mut self, settings: EditorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_providers(mut self, providers: ExtensionProviders) -> Self {
        self.providers = providers;
        self
    }

    /// Takes effect on the next render.
    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Resolve the mount point and reconcile the editor with `config`.
    ///
    /// If the mount point cannot be resolved the current instance, if any,
    /// is released and `MountUnavailable` is returned.
    pub fn render(&mut self, config: EditorConfiguration) -> Result<RenderOutcome, LifecycleError> {
        let mount = match self.binding.resolve(&self.selector) {
            Ok(mount) => mount,
            Err(err) => {
                tracing::warn!(target: "sql_editor", selector = %self.selector, error = %err, "mount point unavailable");
                self.mount = None;
                self.manager.unmount()?;
                return Err(err);
            }
        };

        let extensions = self.providers.compose(&self.settings, mount.dimensions);
        let result = self.manager.render(&mount, &extensions, config);
        self.mount = self.manager.is_live().then_some(mount);
        result
    }

    pub fn unmount(&mut self) -> Result<(), LifecycleError> {
        self.mount = None;
        self.manager.unmount()
    }

    /// The mount point of the live instance.
    pub fn mount(&self) -> Option<&MountContext<B::Host>> {
        self.mount.as_ref()
    }

    pub fn manager(&self) -> &LifecycleManager<E> {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut LifecycleManager<E> {
        &mut self.manager
    }
}
