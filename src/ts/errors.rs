use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("unknown language: {name}")]
    UnknownLanguage { name: String },

    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse source code")]
    ParseFailed,

    #[error("invalid tree-sitter query: {message}")]
    InvalidQuery { message: String },
}
