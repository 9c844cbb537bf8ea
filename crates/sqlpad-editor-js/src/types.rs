//! Types exposed to JavaScript via wasm-bindgen.

use serde::{Deserialize, Serialize};
use sqlpad_editor_browser::{
    AppearanceSettings, BehaviourSettings, EditorSettings, KeymapSettings,
};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// Data half of `render()` parameters. Callbacks are read separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct JsEditorParams {
    /// Initial document.
    pub code: String,
    pub readonly: bool,
}

#[wasm_bindgen(typescript_custom_section)]
const TS_EDITOR_CALLBACKS: &'static str = r#"
export interface SqlEditorCallbacks {
    /** Called with the full document after every change. */
    onChange?: (code: string) => void;
    /** Called with the full document when the execute shortcut is pressed. */
    onExecuteQuery?: (code: string) => void;
}

export type SqlEditorRenderParams = JsEditorParams & SqlEditorCallbacks;
"#;

/// Provider settings, flattened for JavaScript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase", default)]
pub struct JsEditorSettings {
    pub line_numbers: bool,
    pub highlight_active_line: bool,
    pub line_wrapping: bool,
    pub tab_size: usize,
    pub bracket_matching: bool,
    pub close_brackets: bool,
    /// Bind `Mod` to Cmd. Detected from the user agent when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<bool>,
}

impl Default for JsEditorSettings {
    fn default() -> Self {
        let defaults = EditorSettings::default();
        Self {
            mac: None,
            ..Self::from(&defaults)
        }
    }
}

impl From<&EditorSettings> for JsEditorSettings {
    fn from(settings: &EditorSettings) -> Self {
        Self {
            line_numbers: settings.appearance.line_numbers,
            highlight_active_line: settings.appearance.highlight_active_line,
            line_wrapping: settings.appearance.line_wrapping,
            tab_size: settings.behaviour.tab_size,
            bracket_matching: settings.behaviour.bracket_matching,
            close_brackets: settings.behaviour.close_brackets,
            mac: Some(settings.keymap.mac),
        }
    }
}

impl JsEditorSettings {
    pub fn into_settings(self, detected_mac: bool) -> EditorSettings {
        EditorSettings {
            appearance: AppearanceSettings {
                line_numbers: self.line_numbers,
                highlight_active_line: self.highlight_active_line,
                line_wrapping: self.line_wrapping,
            },
            behaviour: BehaviourSettings {
                tab_size: self.tab_size,
                bracket_matching: self.bracket_matching,
                close_brackets: self.close_brackets,
            },
            keymap: KeymapSettings {
                mac: self.mac.unwrap_or(detected_mac),
            },
        }
    }
}
