use smol_str::SmolStr;
use thiserror::Error;

use crate::engine::EngineError;
use crate::lifecycle::LifecycleState;
use crate::types::{InstanceId, MountId};

/// Errors from acquiring, rendering and releasing editor instances.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LifecycleError {
    /// The mount point could not be resolved or accepted no surface.
    #[error("mount point {selector:?} unavailable: {reason}")]
    MountUnavailable { selector: SmolStr, reason: SmolStr },

    /// A live instance already holds this mount point.
    #[error("mount point {mount} already holds live instance {existing}")]
    DuplicateInstance { mount: MountId, existing: InstanceId },

    /// Release was called on an instance that was already released.
    #[error("instance {0} was already released")]
    DoubleRelease(InstanceId),

    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl LifecycleError {
    pub fn mount_unavailable(selector: impl Into<SmolStr>, reason: impl Into<SmolStr>) -> Self {
        Self::MountUnavailable {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Errors that indicate a bug in the caller rather than an environmental failure.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Self::DuplicateInstance { .. } | Self::DoubleRelease(_) | Self::InvalidTransition { .. }
        )
    }
}
