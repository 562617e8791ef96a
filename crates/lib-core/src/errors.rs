use fancy_regex::Regex;
use itertools::Itertools;
use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::ExprKind;
use crate::dialects::init::DialectKind;
use crate::parser::markers::PositionMarker;
use crate::parser::token::Token;

#[derive(PartialEq, Eq, Debug, Clone, Error)]
#[error("{message}")]
pub struct SQLLexError {
    message: String,
    position_marker: PositionMarker,
}

impl SQLLexError {
    pub fn new(message: String, position_marker: PositionMarker) -> SQLLexError {
        SQLLexError {
            message,
            position_marker,
        }
    }

    pub fn position(&self) -> &PositionMarker {
        &self.position_marker
    }
}

/// The token stream did not match any grammar rule at a position.
///
/// `expected` lists what would have been accepted there, `found` describes
/// the token that was actually seen.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{description} at {position_marker}")]
pub struct SQLParseError {
    pub description: String,
    pub expected: Vec<String>,
    pub found: SmolStr,
    pub position_marker: PositionMarker,
}

impl SQLParseError {
    pub fn new(description: impl Into<String>, token: &Token) -> Self {
        Self {
            description: description.into(),
            expected: Vec::new(),
            found: token.text.clone(),
            position_marker: token.position.clone(),
        }
    }

    pub fn unexpected(expected: Vec<String>, token: &Token) -> Self {
        let description = match expected.as_slice() {
            [single] => format!("Expected {single} but found {}", token.describe()),
            _ => format!(
                "Expected one of [{}] but found {}",
                expected.iter().join(", "),
                token.describe()
            ),
        };

        Self {
            description,
            expected,
            found: token.text.clone(),
            position_marker: token.position.clone(),
        }
    }

    pub fn position(&self) -> &PositionMarker {
        &self.position_marker
    }

    #[track_caller]
    pub fn matches(&self, regexp: &str) -> bool {
        let value = &self.description;
        let regex = Regex::new(regexp).expect("Invalid regex pattern");

        if let Ok(true) = regex.is_match(value) {
            true
        } else {
            let msg = format!("Regex pattern did not match.\nRegex: {regexp:?}\nInput: {value:?}");

            if regexp == value {
                panic!("{msg}\nDid you mean to escape the regex?");
            } else {
                panic!("{}", msg);
            }
        }
    }
}

/// The generator for `dialect` has no way to render an AST node kind.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
#[error("{node_kind} expressions are not supported by the {} dialect", dialect.name())]
pub struct SQLUnsupportedError {
    pub node_kind: ExprKind,
    pub dialect: DialectKind,
}

impl SQLUnsupportedError {
    pub fn new(node_kind: ExprKind, dialect: DialectKind) -> Self {
        Self { node_kind, dialect }
    }
}

#[cfg(test)]
mod tests {
    use super::{SQLParseError, SQLUnsupportedError};
    use crate::ast::ExprKind;
    use crate::dialects::init::DialectKind;
    use crate::parser::markers::PositionMarker;
    use crate::parser::token::{Token, TokenKind};

    #[test]
    fn parse_error_lists_expected_tokens() {
        let token = Token::new(TokenKind::Keyword, "AS", PositionMarker::point(4, 1, 5));
        let err = SQLParseError::unexpected(vec!["','".into(), "')'".into()], &token);

        assert_eq!(err.found, "AS");
        assert_eq!(
            err.to_string(),
            "Expected one of [',', ')'] but found 'AS' at line 1, position 5"
        );
        assert!(err.matches("found 'AS'"));
    }

    #[test]
    fn unsupported_error_names_node_and_dialect() {
        let err = SQLUnsupportedError::new(ExprKind::Quantile, DialectKind::Ansi);

        assert_eq!(
            err.to_string(),
            "quantile expressions are not supported by the ansi dialect"
        );
    }
}
