//! Browser DOM layer for the sqlpad SQL editor.
//!
//! This crate provides the DOM side of the editor lifecycle. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `binding`: CSS selector resolution to mount points
//! - `surface`: editor element tree, painting and removal
//! - `cursor`: Selection API handling and selection restoration
//! - `events`: beforeinput, keydown, composition and selection listeners
//! - `platform`: Browser/OS detection for platform-specific behavior
//!
//! # Re-exports
//!
//! This crate re-exports `sqlpad-editor-core` for convenience, so consumers
//! only need to depend on `sqlpad-editor-browser`.

pub use sqlpad_editor_core;
pub use sqlpad_editor_core::*;

pub mod binding;
pub mod color;
pub mod cursor;
pub mod events;
pub mod offsets;
pub mod platform;
pub mod surface;

pub use binding::SelectorBinding;
pub use events::{
    EditorEvents, EditorListeners, input_intent_from_event, key_combo_from_event,
    key_combo_from_parts, parse_browser_input_type,
};
pub use platform::{Platform, platform};
pub use surface::{DomParent, DomSurface, MOUNT_ATTRIBUTE};

/// The DOM-backed engine.
pub type DomEngine = RopeEngine<DomParent>;

/// A SQL editor hook mounted by CSS selector.
pub type DomEditorHook = SqlEditorHook<SelectorBinding, DomEngine>;

/// Editor settings for the running platform.
pub fn platform_settings() -> EditorSettings {
    let mut settings = EditorSettings::default();
    settings.keymap.mac = platform().mac;
    settings
}
