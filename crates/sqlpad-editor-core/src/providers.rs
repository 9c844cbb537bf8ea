//! Extension providers and their memoization.
//!
//! Each provider is a pure function of its own settings. `Provider` remembers
//! the last input and hands back the identical output until that input
//! changes, so a document edit or an unrelated settings change never produces
//! a new fragment, and the lifecycle manager can recognise an unchanged
//! extension set by identity.

use crate::extension::{
    Extension, ExtensionFragment, ExtensionKind, ExtensionSet, compose_extensions,
};
use crate::keymap::{
    CommandContext, CommandOutcome, KeyBinding, KeyCombo, execute_query, insert_indent,
    select_all, toggle_line_comment,
};
use crate::language::sql;
use crate::theme::editor_theme;
use crate::types::Dimensions;

/// Memoized pure function of `I`.
pub struct Provider<I, O> {
    build: Box<dyn Fn(&I) -> O>,
    last: Option<(I, O)>,
}

impl<I: Clone + PartialEq, O: Clone> Provider<I, O> {
    pub fn new(build: impl Fn(&I) -> O + 'static) -> Self {
        Self {
            build: Box::new(build),
            last: None,
        }
    }

    /// Output for `input`, recomputed only when it differs from the last input.
    pub fn get(&mut self, input: &I) -> O {
        if let Some((last_input, output)) = &self.last {
            if last_input == input {
                return output.clone();
            }
        }
        let output = (self.build)(input);
        self.last = Some((input.clone(), output.clone()));
        output
    }
}

/// Input of the appearance provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppearanceSettings {
    pub line_numbers: bool,
    pub highlight_active_line: bool,
    pub line_wrapping: bool,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            line_numbers: true,
            highlight_active_line: true,
            line_wrapping: false,
        }
    }
}

/// Input of the behaviour provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BehaviourSettings {
    pub tab_size: usize,
    pub bracket_matching: bool,
    pub close_brackets: bool,
}

impl Default for BehaviourSettings {
    fn default() -> Self {
        Self {
            tab_size: 2,
            bracket_matching: true,
            close_brackets: true,
        }
    }
}

/// Input of the keymap provider.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct KeymapSettings {
    /// Bind `Mod` to Cmd instead of Ctrl.
    pub mac: bool,
}

/// All provider inputs the host controls.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct EditorSettings {
    pub appearance: AppearanceSettings,
    pub behaviour: BehaviourSettings,
    pub keymap: KeymapSettings,
}

pub fn appearance_extensions(settings: &AppearanceSettings) -> Vec<Extension> {
    let mut extensions = Vec::new();
    if settings.line_numbers {
        extensions.push(Extension::from_fn(
            "line-numbers",
            ExtensionKind::Appearance,
            |s| s.line_numbers = true,
        ));
    }
    if settings.highlight_active_line {
        extensions.push(Extension::from_fn(
            "highlight-active-line",
            ExtensionKind::Appearance,
            |s| s.highlight_active_line = true,
        ));
    }
    if settings.line_wrapping {
        extensions.push(Extension::from_fn(
            "line-wrapping",
            ExtensionKind::Appearance,
            |s| s.line_wrapping = true,
        ));
    }
    extensions
}

pub fn behaviour_extensions(settings: &BehaviourSettings) -> Vec<Extension> {
    let tab_size = settings.tab_size;
    let mut extensions = vec![Extension::from_fn(
        "tab-size",
        ExtensionKind::Behaviour,
        move |s| s.tab_size = tab_size,
    )];
    if settings.bracket_matching {
        extensions.push(Extension::from_fn(
            "bracket-matching",
            ExtensionKind::Behaviour,
            |s| s.bracket_matching = true,
        ));
    }
    if settings.close_brackets {
        extensions.push(Extension::from_fn(
            "close-brackets",
            ExtensionKind::Behaviour,
            |s| s.close_brackets = true,
        ));
    }
    extensions
}

/// Built-in SQL editing keymap.
///
/// Unparseable specs are skipped rather than failing the whole keymap.
pub fn keymap_extensions(settings: &KeymapSettings) -> Vec<Extension> {
    let mac = settings.mac;
    vec![Extension::from_fn(
        "sql-keymap",
        ExtensionKind::Keymap,
        move |s| {
            let bindings: [(&str, &str, fn(&CommandContext<'_>) -> CommandOutcome); 4] = [
                ("Mod-Enter", "execute_query", execute_query),
                ("Mod-a", "select_all", select_all),
                ("Tab", "insert_indent", insert_indent),
                ("Mod-/", "toggle_line_comment", toggle_line_comment),
            ];
            for (spec, name, command) in bindings {
                match KeyCombo::parse(spec, mac) {
                    Some(combo) => s.keymap.push(KeyBinding::new(combo, name, command)),
                    None => tracing::warn!(target: "sql_editor", spec, "skipping unparseable key binding"),
                }
            }
        },
    )]
}

/// The language, theme, appearance, behaviour and keymap providers.
pub struct ExtensionProviders {
    language: Extension,
    theme: Provider<Dimensions, Extension>,
    appearance: Provider<AppearanceSettings, ExtensionFragment>,
    behaviour: Provider<BehaviourSettings, ExtensionFragment>,
    keymap: Provider<KeymapSettings, ExtensionFragment>,
}

impl Default for ExtensionProviders {
    fn default() -> Self {
        Self {
            language: sql(),
            theme: Provider::new(|dimensions: &Dimensions| editor_theme(*dimensions)),
            appearance: Provider::new(|s: &AppearanceSettings| appearance_extensions(s).into()),
            behaviour: Provider::new(|s: &BehaviourSettings| behaviour_extensions(s).into()),
            keymap: Provider::new(|s: &KeymapSettings| keymap_extensions(s).into()),
        }
    }
}

impl ExtensionProviders {
    pub fn with_language(mut self, language: Extension) -> Self {
        self.language = language;
        self
    }

    pub fn with_theme(mut self, build: impl Fn(&Dimensions) -> Extension + 'static) -> Self {
        self.theme = Provider::new(build);
        self
    }

    pub fn with_appearance(
        mut self,
        build: impl Fn(&AppearanceSettings) -> Vec<Extension> + 'static,
    ) -> Self {
        self.appearance = Provider::new(move |s| build(s).into());
        self
    }

    pub fn with_behaviour(
        mut self,
        build: impl Fn(&BehaviourSettings) -> Vec<Extension> + 'static,
    ) -> Self {
        self.behaviour = Provider::new(move |s| build(s).into());
        self
    }

    pub fn with_keymap(mut self, build: impl Fn(&KeymapSettings) -> Vec<Extension> + 'static) -> Self {
        self.keymap = Provider::new(move |s| build(s).into());
        self
    }

    /// Run every provider and compose their outputs in the fixed order.
    pub fn compose(&mut self, settings: &EditorSettings, dimensions: Dimensions) -> ExtensionSet {
        let theme = self.theme.get(&dimensions);
        let appearance = self.appearance.get(&settings.appearance);
        let behaviour = self.behaviour.get(&settings.behaviour);
        let keymap = self.keymap.get(&settings.keymap);
        compose_extensions(&self.language, &theme, &appearance, &behaviour, &keymap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{Key, Modifiers};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_provider_memoizes_on_input() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut provider = Provider::new(move |n: &u32| {
            counter.set(counter.get() + 1);
            n * 2
        });

        assert_eq!(provider.get(&2), 4);
        assert_eq!(provider.get(&2), 4);
        assert_eq!(calls.get(), 1);

        assert_eq!(provider.get(&3), 6);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_default_composition() {
        let mut providers = ExtensionProviders::default();
        let set = providers.compose(&EditorSettings::default(), Dimensions::new(640.0, 480.0));
        insta::assert_snapshot!(
            set.names().join(", "),
            @"lang-sql, theme, line-numbers, highlight-active-line, tab-size, bracket-matching, close-brackets, sql-keymap"
        );
    }

    #[test]
    fn test_resolved_default_settings() {
        let mut providers = ExtensionProviders::default();
        let settings = providers
            .compose(&EditorSettings::default(), Dimensions::new(640.0, 480.0))
            .resolve();

        assert_eq!(settings.language.as_ref().map(|l| l.name.as_str()), Some("sql"));
        assert!(settings.line_numbers);
        assert!(settings.highlight_active_line);
        assert!(!settings.line_wrapping);
        assert_eq!(settings.tab_size, 2);
        assert!(settings.close_brackets);
        assert_eq!(settings.theme.width, 640.0);

        let names: Vec<&str> = settings.keymap.iter().map(|b| b.name.as_str()).collect();
        insta::assert_snapshot!(
            names.join(", "),
            @"execute_query, select_all, insert_indent, toggle_line_comment"
        );

        let run = KeyCombo::with_modifiers(Key::Enter, Modifiers::CTRL);
        assert_eq!(settings.binding_for(&run).map(|b| b.name.as_str()), Some("execute_query"));
    }

    #[test]
    fn test_unchanged_inputs_give_identical_set() {
        let mut providers = ExtensionProviders::default();
        let settings = EditorSettings::default();
        let a = providers.compose(&settings, Dimensions::new(640.0, 480.0));
        let b = providers.compose(&settings, Dimensions::new(640.0, 480.0));
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_only_changed_provider_recomputes() {
        let mut providers = ExtensionProviders::default();
        let mut settings = EditorSettings::default();
        let before = providers.compose(&settings, Dimensions::new(640.0, 480.0));

        settings.behaviour.tab_size = 4;
        let after = providers.compose(&settings, Dimensions::new(640.0, 480.0));

        assert!(!before.same_as(&after));
        let before: Vec<_> = before.iter().collect();
        let after: Vec<_> = after.iter().collect();
        // lang, theme, two appearance extensions unchanged; behaviour replaced.
        for i in 0..4 {
            assert!(before[i].same(after[i]));
        }
        assert!(!before[4].same(after[4]));
        // Keymap fragment unchanged.
        assert!(before[7].same(after[7]));
    }

    #[test]
    fn test_resize_replaces_theme_only() {
        let mut providers = ExtensionProviders::default();
        let settings = EditorSettings::default();
        let before = providers.compose(&settings, Dimensions::new(640.0, 480.0));
        let after = providers.compose(&settings, Dimensions::new(300.0, 480.0));

        let before: Vec<_> = before.iter().collect();
        let after: Vec<_> = after.iter().collect();
        assert!(before[0].same(after[0]));
        assert!(!before[1].same(after[1]));
        assert!(before[2].same(after[2]));
    }
}
