//! sqlpad-editor-core: SQL editor lifecycle without platform dependencies.
//!
//! This crate provides:
//! - `TextBuffer` trait and the ropey-backed `EditorRope`
//! - `EditorState` / `Transaction` - validated, versioned document mutations
//! - `EngineExtension` and the ordered `ExtensionSet` built by the providers
//! - `EditorEngine` / `SurfaceHost` - the seam to a painting surface
//! - `EditorInstance` - one engine per mount, with read-only interception
//! - `LifecycleManager` / `SqlEditorHook` - input-gated creation and release

pub mod config;
pub mod engine;
pub mod error;
pub mod extension;
pub mod hook;
pub mod input;
pub mod instance;
pub mod keymap;
pub mod language;
pub mod lifecycle;
pub mod memory;
pub mod mount;
pub mod providers;
pub mod text;
pub mod theme;
pub mod transaction;
pub mod types;

pub use config::{EditorConfiguration, LiveConfig, TextCallback};
pub use engine::{EditorEngine, EngineError, RopeEngine, Surface, SurfaceHost};
pub use error::LifecycleError;
pub use extension::{
    EngineExtension, EngineSettings, Extension, ExtensionFragment, ExtensionKind, ExtensionSet,
    compose_extensions,
};
pub use hook::SqlEditorHook;
pub use input::{InputIntent, InputType, transaction_for_input};
pub use instance::{DispatchOutcome, EditorInstance};
pub use keymap::{
    Command, CommandContext, CommandOutcome, Key, KeyBinding, KeyCombo, KeydownResult, Modifiers,
};
pub use language::{LanguageSupport, sql};
pub use lifecycle::{LifecycleManager, LifecycleState, RenderOutcome};
pub use memory::{MemoryBinding, MemoryHost, MemorySurface, PaintRecord};
pub use mount::{MountContext, MountRegistry, ParentBinding};
pub use providers::{
    AppearanceSettings, BehaviourSettings, EditorSettings, ExtensionProviders, KeymapSettings,
    Provider,
};
pub use smol_str::SmolStr;
pub use text::{EditorRope, TextBuffer};
pub use theme::{Theme, editor_theme};
pub use transaction::{Change, EditorState, Transaction, TransactionError, TransactionSpec};
pub use types::{Dimensions, InstanceId, MountId, Selection};
