//! WASM bindings for the sqlpad SQL editor.
//!
//! Exposes `SqlEditor`, a selector-bound editor hook for JavaScript and
//! TypeScript apps. Hosts call `render` on every re-render; the editor is
//! created once and reused until its inputs change.

mod editor;
mod types;

pub use editor::*;
pub use types::*;

use wasm_bindgen::prelude::*;

/// Install the panic hook and route `tracing` to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
    {
        use tracing::Level;
        use tracing::subscriber::set_global_default;
        use tracing_subscriber::Registry;
        use tracing_subscriber::layer::SubscriberExt;

        let level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };
        let wasm_layer = tracing_wasm::WASMLayer::new(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(level)
                .build(),
        );
        let reg = Registry::default().with(wasm_layer);
        // A host page may have installed its own subscriber.
        let _ = set_global_default(reg);
    }
}
