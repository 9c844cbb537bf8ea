//! Key combinations, bindings and the built-in editor commands.
//!
//! Keymap extensions push `KeyBinding`s onto the engine settings. A binding
//! runs a `Command` against a read-only `CommandContext`; commands that edit
//! return a `TransactionSpec`, which is then dispatched through the instance's
//! interception point like any other transaction.

use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::config::LiveConfig;
use crate::extension::EngineSettings;
use crate::text::TextBuffer;
use crate::transaction::{Change, EditorState, TransactionSpec};
use crate::types::Selection;

/// Keys that can take part in a binding.
///
/// Character keys are stored lowercased so `Mod-a` matches with or without
/// Shift's effect on the reported character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Character(SmolStr),
    Enter,
    Tab,
    Backspace,
    Delete,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    // Modifier keys on their own.
    Shift,
    Control,
    Alt,
    Meta,
    Unidentified,
}

impl Key {
    /// Create a character key.
    pub fn character(s: &str) -> Self {
        Self::Character(SmolStr::new(s.to_lowercase()))
    }

    /// Parse a key name as used in binding specs and by DOM `KeyboardEvent.key`.
    ///
    /// Returns None for names that are neither a known key nor a single character.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Enter" => Self::Enter,
            "Tab" => Self::Tab,
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Escape" | "Esc" => Self::Escape,
            "ArrowLeft" => Self::ArrowLeft,
            "ArrowRight" => Self::ArrowRight,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Shift" => Self::Shift,
            "Control" => Self::Control,
            "Alt" => Self::Alt,
            "Meta" => Self::Meta,
            "Space" => Self::Character(SmolStr::new_static(" ")),
            other if other.chars().count() == 1 => Self::character(other),
            _ => return None,
        };
        Some(key)
    }

    /// Check if this is a modifier key.
    pub fn is_modifier(&self) -> bool {
        matches!(self, Self::Shift | Self::Control | Self::Alt | Self::Meta)
    }
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Get the primary modifier for the platform (Cmd on Mac, Ctrl elsewhere).
    pub fn primary(mac: bool) -> Self {
        if mac { Self::META } else { Self::CTRL }
    }
}

/// A key combination for triggering a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn primary(key: Key, mac: bool) -> Self {
        Self {
            key,
            modifiers: Modifiers::primary(mac),
        }
    }

    /// Parse a binding spec such as `Mod-Enter`, `Shift-Tab` or `Ctrl-Alt-k`.
    ///
    /// `Mod` is Cmd on Mac and Ctrl elsewhere.
    pub fn parse(spec: &str, mac: bool) -> Option<Self> {
        let (prefix, key_name) = match spec.rsplit_once('-') {
            // "Mod--" binds the minus key.
            Some((prefix, "")) => (prefix.strip_suffix('-')?, "-"),
            Some((prefix, name)) => (prefix, name),
            None => ("", spec),
        };

        let mut modifiers = Modifiers::NONE;
        for part in prefix.split('-').filter(|p| !p.is_empty()) {
            match part {
                "Mod" => {
                    if mac {
                        modifiers.meta = true;
                    } else {
                        modifiers.ctrl = true;
                    }
                }
                "Ctrl" | "Control" => modifiers.ctrl = true,
                "Alt" => modifiers.alt = true,
                "Shift" => modifiers.shift = true,
                "Meta" | "Cmd" => modifiers.meta = true,
                _ => return None,
            }
        }

        Some(Self {
            key: Key::from_name(key_name)?,
            modifiers,
        })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl-")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt-")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift-")?;
        }
        if self.modifiers.meta {
            f.write_str("Meta-")?;
        }
        match &self.key {
            Key::Character(c) => f.write_str(c),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Result of handling a keydown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeydownResult {
    /// A binding handled the key, prevent the platform default.
    Handled,
    /// No binding claimed the key.
    NotHandled,
}

/// What a command did.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    NotHandled,
    Handled,
    /// Dispatch this mutation through the interception point.
    Dispatch(TransactionSpec),
}

/// Everything a command may look at. Commands never mutate engine state directly.
pub struct CommandContext<'a> {
    state: &'a EditorState,
    settings: &'a EngineSettings,
    config: &'a LiveConfig,
}

impl<'a> CommandContext<'a> {
    pub fn new(state: &'a EditorState, settings: &'a EngineSettings, config: &'a LiveConfig) -> Self {
        Self {
            state,
            settings,
            config,
        }
    }

    pub fn state(&self) -> &EditorState {
        self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        self.settings
    }

    /// Forward text to the currently configured execute callback.
    ///
    /// Returns false when no callback is configured.
    pub fn execute_query(&self, text: &str) -> bool {
        self.config.execute(text)
    }
}

pub type Command = Rc<dyn Fn(&CommandContext<'_>) -> CommandOutcome>;

/// A key combination bound to a named command.
#[derive(Clone)]
pub struct KeyBinding {
    pub combo: KeyCombo,
    pub name: SmolStr,
    pub run: Command,
}

impl KeyBinding {
    pub fn new(
        combo: KeyCombo,
        name: impl Into<SmolStr>,
        run: impl Fn(&CommandContext<'_>) -> CommandOutcome + 'static,
    ) -> Self {
        Self {
            combo,
            name: name.into(),
            run: Rc::new(run),
        }
    }
}

impl fmt::Debug for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyBinding")
            .field("combo", &self.combo)
            .field("name", &self.name)
            .finish()
    }
}

// === Built-in commands ===

/// Send the whole document to the execute callback.
pub fn execute_query(ctx: &CommandContext<'_>) -> CommandOutcome {
    let text = ctx.state().doc_string();
    if ctx.execute_query(&text) {
        CommandOutcome::Handled
    } else {
        CommandOutcome::NotHandled
    }
}

/// Select the entire document. Does not change the document.
pub fn select_all(ctx: &CommandContext<'_>) -> CommandOutcome {
    let len = ctx.state().len_chars();
    CommandOutcome::Dispatch(
        TransactionSpec::new()
            .select(Selection::new(0, len))
            .user_event("select"),
    )
}

/// Replace the selection with one indent unit.
pub fn insert_indent(ctx: &CommandContext<'_>) -> CommandOutcome {
    let selection = ctx.state().selection();
    let unit = ctx.settings().indent_unit();
    let caret = selection.start() + unit.chars().count();
    CommandOutcome::Dispatch(
        TransactionSpec::new()
            .change(Change::replace(selection.to_range(), unit))
            .select(Selection::collapsed(caret))
            .scroll_into_view()
            .user_event("input.indent"),
    )
}

/// Comment or uncomment every line touched by the selection, using the
/// language's line comment token.
pub fn toggle_line_comment(ctx: &CommandContext<'_>) -> CommandOutcome {
    let Some(token) = ctx
        .settings()
        .language
        .as_ref()
        .and_then(|l| l.line_comment.clone())
    else {
        return CommandOutcome::NotHandled;
    };

    let doc = ctx.state().doc();
    let selection = ctx.state().selection();
    let first = doc.line_of_char(selection.start());
    let mut last = doc.line_of_char(selection.end());
    // A selection ending at a line start does not touch that line.
    if last > first && selection.end() == doc.line_to_char(last) {
        last -= 1;
    }

    let prefix = format!("{token} ");
    let prefix_len = prefix.chars().count();
    let line_starts: Vec<usize> = (first..=last).map(|line| doc.line_to_char(line)).collect();

    let all_commented = line_starts.iter().all(|&start| {
        doc.slice(start..start + prefix_len)
            .is_some_and(|s| s.as_str() == prefix)
    });

    let changes = line_starts
        .into_iter()
        .map(|start| {
            if all_commented {
                Change::delete(start..start + prefix_len)
            } else {
                Change::insert(start, prefix.as_str())
            }
        })
        .collect();

    CommandOutcome::Dispatch(TransactionSpec {
        changes,
        selection: None,
        scroll_into_view: false,
        user_event: Some(SmolStr::new_static("comment")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfiguration;
    use crate::language::LanguageSupport;
    use std::cell::RefCell;

    fn run(
        command: impl Fn(&CommandContext<'_>) -> CommandOutcome,
        state: &EditorState,
        settings: &EngineSettings,
        config: &LiveConfig,
    ) -> CommandOutcome {
        let ctx = CommandContext::new(state, settings, config);
        command(&ctx)
    }

    fn sql_settings() -> EngineSettings {
        EngineSettings {
            language: Some(LanguageSupport::new("sql", Some("--"))),
            ..EngineSettings::default()
        }
    }

    #[test]
    fn test_parse_mod_enter() {
        let combo = KeyCombo::parse("Mod-Enter", false).unwrap();
        assert_eq!(combo, KeyCombo::with_modifiers(Key::Enter, Modifiers::CTRL));

        let combo = KeyCombo::parse("Mod-Enter", true).unwrap();
        assert_eq!(combo, KeyCombo::with_modifiers(Key::Enter, Modifiers::META));
    }

    #[test]
    fn test_parse_variants() {
        let combo = KeyCombo::parse("Shift-Tab", false).unwrap();
        assert!(combo.modifiers.shift);
        assert_eq!(combo.key, Key::Tab);

        let combo = KeyCombo::parse("Ctrl-Alt-K", false).unwrap();
        assert!(combo.modifiers.ctrl && combo.modifiers.alt);
        assert_eq!(combo.key, Key::character("k"));

        let combo = KeyCombo::parse("Mod--", false).unwrap();
        assert_eq!(combo.key, Key::character("-"));

        assert_eq!(KeyCombo::parse("a", false), Some(KeyCombo::new(Key::character("a"))));
        assert!(KeyCombo::parse("Hyper-a", false).is_none());
        assert!(KeyCombo::parse("Mod-NotAKey", false).is_none());
    }

    #[test]
    fn test_display() {
        let combo = KeyCombo::parse("Ctrl-Shift-/", false).unwrap();
        assert_eq!(combo.to_string(), "Ctrl-Shift-/");
        assert_eq!(KeyCombo::new(Key::Enter).to_string(), "Enter");
    }

    #[test]
    fn test_execute_query_uses_latest_callback() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let config = LiveConfig::new(
            EditorConfiguration::new("SELECT 1").on_execute(move |q| sink.borrow_mut().push(q.to_string())),
        );
        let state = EditorState::new("SELECT 1");
        let settings = EngineSettings::default();

        let outcome = run(execute_query, &state, &settings, &config);
        assert!(matches!(outcome, CommandOutcome::Handled));
        assert_eq!(*seen.borrow(), vec!["SELECT 1".to_string()]);

        config.replace(EditorConfiguration::new("SELECT 1"));
        let outcome = run(execute_query, &state, &settings, &config);
        assert!(matches!(outcome, CommandOutcome::NotHandled));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_select_all_is_selection_only() {
        let state = EditorState::new("SELECT 1");
        let outcome = run(select_all, &state, &EngineSettings::default(), &LiveConfig::default());
        let CommandOutcome::Dispatch(spec) = outcome else {
            panic!("expected dispatch");
        };
        let tr = state.update(spec).unwrap();
        assert!(!tr.doc_changed());
        assert_eq!(tr.selection(), Selection::new(0, 8));
    }

    #[test]
    fn test_insert_indent() {
        let state = EditorState::new("SELECT");
        let settings = EngineSettings {
            tab_size: 2,
            ..EngineSettings::default()
        };
        let CommandOutcome::Dispatch(spec) = run(insert_indent, &state, &settings, &LiveConfig::default())
        else {
            panic!("expected dispatch");
        };
        let tr = state.update(spec).unwrap();
        assert_eq!(tr.new_doc().to_string(), "  SELECT");
        assert_eq!(tr.selection(), Selection::collapsed(2));
    }

    #[test]
    fn test_toggle_line_comment_round_trip() {
        let settings = sql_settings();
        let config = LiveConfig::default();
        let state = EditorState::new("SELECT 1\nFROM t")
            .update(TransactionSpec::new().select(Selection::new(2, 11)))
            .unwrap()
            .into_state();

        let CommandOutcome::Dispatch(spec) = run(toggle_line_comment, &state, &settings, &config) else {
            panic!("expected dispatch");
        };
        let commented = state.update(spec).unwrap().into_state();
        assert_eq!(commented.doc_string(), "-- SELECT 1\n-- FROM t");

        let CommandOutcome::Dispatch(spec) = run(toggle_line_comment, &commented, &settings, &config)
        else {
            panic!("expected dispatch");
        };
        let uncommented = commented.update(spec).unwrap();
        assert_eq!(uncommented.new_doc().to_string(), "SELECT 1\nFROM t");
    }

    #[test]
    fn test_toggle_line_comment_stops_before_line_start() {
        let settings = sql_settings();
        let config = LiveConfig::default();
        let state = EditorState::new("SELECT 1\nFROM t")
            .update(TransactionSpec::new().select(Selection::new(0, 9)))
            .unwrap()
            .into_state();

        let CommandOutcome::Dispatch(spec) = run(toggle_line_comment, &state, &settings, &config) else {
            panic!("expected dispatch");
        };
        let tr = state.update(spec).unwrap();
        assert_eq!(tr.new_doc().to_string(), "-- SELECT 1\nFROM t");

        // A caret at a line start still toggles its own line.
        let caret = EditorState::new("SELECT 1\nFROM t")
            .update(TransactionSpec::new().select(Selection::collapsed(9)))
            .unwrap()
            .into_state();
        let CommandOutcome::Dispatch(spec) = run(toggle_line_comment, &caret, &settings, &config) else {
            panic!("expected dispatch");
        };
        assert_eq!(caret.update(spec).unwrap().new_doc().to_string(), "SELECT 1\n-- FROM t");
    }

    #[test]
    fn test_toggle_line_comment_without_language() {
        let state = EditorState::new("SELECT 1");
        let outcome = run(
            toggle_line_comment,
            &state,
            &EngineSettings::default(),
            &LiveConfig::default(),
        );
        assert!(matches!(outcome, CommandOutcome::NotHandled));
    }
}
