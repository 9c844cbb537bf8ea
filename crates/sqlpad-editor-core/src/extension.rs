//! Engine extensions and their ordered composition.
//!
//! Every category of configuration (language, theme, appearance, behaviour,
//! keymap) is expressed through the same `EngineExtension` capability. An
//! `ExtensionSet` is the fixed-order concatenation of all of them; resolving it
//! folds each extension onto `EngineSettings` in order, so later entries
//! override earlier ones.

use std::fmt;
use std::rc::Rc;

use smol_str::SmolStr;

use crate::keymap::{KeyBinding, KeyCombo};
use crate::language::LanguageSupport;
use crate::theme::Theme;

/// Which provider category an extension belongs to.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    Language,
    Theme,
    Appearance,
    Behaviour,
    Keymap,
}

/// A capability that configures the engine.
pub trait EngineExtension {
    fn name(&self) -> &str;

    fn kind(&self) -> ExtensionKind;

    /// Apply this extension's settings. Called once per engine creation, in
    /// extension-set order.
    fn configure(&self, settings: &mut EngineSettings);
}

/// Shared handle to an engine extension.
///
/// Cloning shares the same extension; `same` compares identity, which is how
/// unchanged provider output is recognised.
#[derive(Clone)]
pub struct Extension(Rc<dyn EngineExtension>);

impl Extension {
    pub fn new<X: EngineExtension + 'static>(extension: X) -> Self {
        Self(Rc::new(extension))
    }

    /// Build an extension from a closure.
    pub fn from_fn(
        name: impl Into<SmolStr>,
        kind: ExtensionKind,
        configure: impl Fn(&mut EngineSettings) + 'static,
    ) -> Self {
        Self::new(FnExtension {
            name: name.into(),
            kind,
            configure,
        })
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn kind(&self) -> ExtensionKind {
        self.0.kind()
    }

    pub fn configure(&self, settings: &mut EngineSettings) {
        self.0.configure(settings)
    }

    /// Identity comparison.
    pub fn same(&self, other: &Extension) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .finish()
    }
}

struct FnExtension<F> {
    name: SmolStr,
    kind: ExtensionKind,
    configure: F,
}

impl<F: Fn(&mut EngineSettings)> EngineExtension for FnExtension<F> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ExtensionKind {
        self.kind
    }

    fn configure(&self, settings: &mut EngineSettings) {
        (self.configure)(settings)
    }
}

/// Immutable provider output. Providers hand out a new fragment when their
/// inputs change and never modify one they already returned.
pub type ExtensionFragment = Rc<[Extension]>;

/// Ordered extensions for one engine instance.
///
/// Only `compose_extensions` builds one, so the language extension is always
/// first and the category order is fixed.
#[derive(Clone, Debug)]
pub struct ExtensionSet {
    extensions: Rc<[Extension]>,
}

/// Concatenate provider outputs as
/// `[language, theme, ...appearance, ...behaviour, ...keymap]`.
pub fn compose_extensions(
    language: &Extension,
    theme: &Extension,
    appearance: &[Extension],
    behaviour: &[Extension],
    keymap: &[Extension],
) -> ExtensionSet {
    let mut extensions =
        Vec::with_capacity(2 + appearance.len() + behaviour.len() + keymap.len());
    extensions.push(language.clone());
    extensions.push(theme.clone());
    extensions.extend_from_slice(appearance);
    extensions.extend_from_slice(behaviour);
    extensions.extend_from_slice(keymap);

    ExtensionSet {
        extensions: extensions.into(),
    }
}

impl ExtensionSet {
    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(Extension::name).collect()
    }

    /// True when both sets hold the identical extensions in the same order.
    pub fn same_as(&self, other: &ExtensionSet) -> bool {
        self.extensions.len() == other.extensions.len()
            && self
                .extensions
                .iter()
                .zip(other.extensions.iter())
                .all(|(a, b)| a.same(b))
    }

    /// Fold all extensions onto default settings, in order.
    pub fn resolve(&self) -> EngineSettings {
        let mut settings = EngineSettings::default();
        for extension in self.extensions.iter() {
            extension.configure(&mut settings);
        }
        settings
    }
}

/// Effective engine configuration after resolving an `ExtensionSet`.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    pub language: Option<LanguageSupport>,
    pub theme: Theme,
    pub line_numbers: bool,
    pub highlight_active_line: bool,
    pub line_wrapping: bool,
    pub tab_size: usize,
    pub bracket_matching: bool,
    pub close_brackets: bool,
    pub keymap: Vec<KeyBinding>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            language: None,
            theme: Theme::default(),
            line_numbers: false,
            highlight_active_line: false,
            line_wrapping: false,
            tab_size: 4,
            bracket_matching: false,
            close_brackets: false,
            keymap: Vec::new(),
        }
    }
}

impl EngineSettings {
    /// The binding for a key combination. Later bindings win.
    pub fn binding_for(&self, combo: &KeyCombo) -> Option<&KeyBinding> {
        self.keymap.iter().rev().find(|b| b.combo == *combo)
    }

    /// Whitespace inserted for one level of indentation.
    pub fn indent_unit(&self) -> String {
        " ".repeat(self.tab_size.max(1))
    }
}
