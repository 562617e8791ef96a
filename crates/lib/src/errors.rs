use sqlmorph_lib_core::errors::{SQLLexError, SQLParseError, SQLUnsupportedError};
use thiserror::Error;

/// Anything that can go wrong between SQL text in and SQL text out.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] SQLLexError),
    #[error(transparent)]
    Parse(#[from] SQLParseError),
    #[error(transparent)]
    Unsupported(#[from] SQLUnsupportedError),
    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),
}
