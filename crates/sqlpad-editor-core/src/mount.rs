//! Mount points and the registry of live instances per mount.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::engine::SurfaceHost;
use crate::error::LifecycleError;
use crate::types::{Dimensions, InstanceId, MountId};

/// A resolved mount point: the parent surfaces attach to, and its size.
#[derive(Clone, Debug)]
pub struct MountContext<H> {
    pub parent: H,
    pub dimensions: Dimensions,
}

impl<H: SurfaceHost> MountContext<H> {
    pub fn new(parent: H, dimensions: Dimensions) -> Self {
        Self { parent, dimensions }
    }

    pub fn mount_id(&self) -> MountId {
        self.parent.mount_id()
    }
}

/// Resolves a selector to a mount point.
pub trait ParentBinding {
    type Host: SurfaceHost;

    fn resolve(&self, selector: &str) -> Result<MountContext<Self::Host>, LifecycleError>;
}

impl<B: ParentBinding> ParentBinding for Rc<B> {
    type Host = B::Host;

    fn resolve(&self, selector: &str) -> Result<MountContext<B::Host>, LifecycleError> {
        (**self).resolve(selector)
    }
}

/// Which instance holds each mount point.
///
/// Cloning shares the registry. All managers on a thread should share one
/// registry so two of them cannot attach to the same mount.
#[derive(Clone, Debug, Default)]
pub struct MountRegistry(Rc<RefCell<HashMap<MountId, InstanceId>>>);

thread_local! {
    static GLOBAL_REGISTRY: MountRegistry = MountRegistry::new();
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by everything on the current thread.
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Clone::clone)
    }

    /// Record `instance` as the holder of `mount`.
    pub fn claim(&self, mount: &MountId, instance: InstanceId) -> Result<(), LifecycleError> {
        let mut held = self.0.borrow_mut();
        if let Some(existing) = held.get(mount) {
            return Err(LifecycleError::DuplicateInstance {
                mount: mount.clone(),
                existing: *existing,
            });
        }
        held.insert(mount.clone(), instance);
        Ok(())
    }

    /// Clear `mount` if `instance` holds it. Returns whether anything was cleared.
    pub fn release(&self, mount: &MountId, instance: InstanceId) -> bool {
        let mut held = self.0.borrow_mut();
        if held.get(mount) == Some(&instance) {
            held.remove(mount);
            true
        } else {
            false
        }
    }

    pub fn holder(&self, mount: &MountId) -> Option<InstanceId> {
        self.0.borrow().get(mount).copied()
    }

    pub fn live_count(&self) -> usize {
        self.0.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let registry = MountRegistry::new();
        let mount = MountId::new("editor");
        let a = InstanceId::next();
        let b = InstanceId::next();

        registry.claim(&mount, a).unwrap();
        assert_eq!(
            registry.claim(&mount, b),
            Err(LifecycleError::DuplicateInstance {
                mount: mount.clone(),
                existing: a
            })
        );

        // Only the holder can release.
        assert!(!registry.release(&mount, b));
        assert!(registry.release(&mount, a));
        assert_eq!(registry.live_count(), 0);

        registry.claim(&mount, b).unwrap();
        assert_eq!(registry.holder(&mount), Some(b));
    }

    #[test]
    fn test_global_is_shared() {
        let mount = MountId::new("global-registry-test");
        let id = InstanceId::next();
        MountRegistry::global().claim(&mount, id).unwrap();
        assert_eq!(MountRegistry::global().holder(&mount), Some(id));
        assert!(MountRegistry::global().release(&mount, id));
    }
}
