//! Dynamic language handles.
//!
//! Builders accept a language either as a name (`"rust"`, `"python"`) or as
//! an `ast_grep_language::SupportLang` handle. The name form is normalized
//! once at the builder boundary; thereafter the typed handle is used.

use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub enum LanguageSpec {
    Name(String),
    Handle(SupportLang),
}

impl LanguageSpec {
    /// Normalize to a typed language handle.
    pub fn resolve(&self) -> Result<SupportLang, TreeSitterError> {
        match self {
            LanguageSpec::Handle(lang) => Ok(*lang),
            LanguageSpec::Name(name) => SupportLang::from_str(name)
                .map_err(|_| TreeSitterError::UnknownLanguage { name: name.clone() }),
        }
    }

    /// The tree-sitter grammar behind this language.
    pub fn ts_language(&self) -> Result<tree_sitter::Language, TreeSitterError> {
        Ok(self.resolve()?.get_ts_language())
    }
}

impl From<&str> for LanguageSpec {
    fn from(name: &str) -> Self {
        LanguageSpec::Name(name.to_string())
    }
}

impl From<String> for LanguageSpec {
    fn from(name: String) -> Self {
        LanguageSpec::Name(name)
    }
}

impl From<SupportLang> for LanguageSpec {
    fn from(lang: SupportLang) -> Self {
        LanguageSpec::Handle(lang)
    }
}
