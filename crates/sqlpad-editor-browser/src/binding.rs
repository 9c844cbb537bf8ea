//! Resolving CSS selectors to mount points.

use sqlpad_editor_core::{Dimensions, LifecycleError, MountContext, ParentBinding};

use crate::surface::DomParent;

/// Resolves selectors against the current document.
#[derive(Debug, Clone, Default)]
pub struct SelectorBinding;

impl SelectorBinding {
    pub fn new() -> Self {
        Self
    }
}

impl ParentBinding for SelectorBinding {
    type Host = DomParent;

    fn resolve(&self, selector: &str) -> Result<MountContext<DomParent>, LifecycleError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| LifecycleError::mount_unavailable(selector, "no document"))?;

        let element = match document.query_selector(selector) {
            Ok(Some(element)) => element,
            Ok(None) => {
                return Err(LifecycleError::mount_unavailable(
                    selector,
                    "no element matches",
                ));
            }
            Err(_) => {
                return Err(LifecycleError::mount_unavailable(
                    selector,
                    "invalid selector",
                ));
            }
        };

        let rect = element.get_bounding_client_rect();
        let dimensions = Dimensions::new(rect.width(), rect.height());
        Ok(MountContext::new(DomParent::new(element), dimensions))
    }
}
