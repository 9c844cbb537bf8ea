//! Language support extension.
//!
//! The grammar itself is outside this crate; the engine only needs to know
//! the language name (for styling hooks) and its line comment token.

use smol_str::SmolStr;

use crate::extension::{Extension, ExtensionKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageSupport {
    pub name: SmolStr,
    pub line_comment: Option<SmolStr>,
}

impl LanguageSupport {
    pub fn new(name: impl Into<SmolStr>, line_comment: Option<&str>) -> Self {
        Self {
            name: name.into(),
            line_comment: line_comment.map(SmolStr::new),
        }
    }
}

/// SQL language mode.
pub fn sql() -> Extension {
    Extension::from_fn("lang-sql", ExtensionKind::Language, |settings| {
        settings.language = Some(LanguageSupport::new("sql", Some("--")));
    })
}
