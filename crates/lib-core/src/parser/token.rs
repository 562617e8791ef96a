use smol_str::SmolStr;

use super::markers::PositionMarker;

#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Hash,
    strum_macros::IntoStaticStr,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TokenKind {
    Whitespace,
    Newline,
    InlineComment,
    BlockComment,
    Word,
    Keyword,
    QuotedIdentifier,
    StringLiteral,
    NumericLiteral,
    HexStringLiteral,
    BitStringLiteral,
    StartBracket,
    EndBracket,
    Comma,
    Dot,
    Star,
    Plus,
    Minus,
    Divide,
    Percent,
    Concat,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Semicolon,
    EndOfFile,
}

impl TokenKind {
    /// Tokens the lexer drops before handing the sequence to the parser.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::InlineComment
                | TokenKind::BlockComment
        )
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A single lexed token.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    pub kind: TokenKind,
    pub text: SmolStr,
    pub position: PositionMarker,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<SmolStr>, position: PositionMarker) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn end_of_file(position: PositionMarker) -> Self {
        Self::new(TokenKind::EndOfFile, "", position)
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    /// The normalized name used to look up dialect overrides.
    pub fn construct_id(&self) -> SmolStr {
        self.text.to_ascii_uppercase().into()
    }

    /// How the token is described in parse errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfFile => "end of input".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Token, TokenKind};
    use crate::parser::markers::PositionMarker;

    #[test]
    fn keywords_match_case_insensitively() {
        let token = Token::new(TokenKind::Keyword, "As", PositionMarker::default());

        assert!(token.is_keyword("AS"));
        assert!(!token.is_keyword("ASC"));
    }

    #[test]
    fn construct_id_is_uppercased() {
        let token = Token::new(TokenKind::Word, "tuple", PositionMarker::default());

        assert_eq!(token.construct_id(), "TUPLE");
        assert_eq!(token.describe(), "'tuple'");
        assert_eq!(
            Token::end_of_file(PositionMarker::default()).describe(),
            "end of input"
        );
    }

    #[test]
    fn token_kind_names() {
        assert_eq!(TokenKind::StartBracket.as_str(), "start_bracket");
        assert!(TokenKind::BlockComment.is_trivia());
        assert!(!TokenKind::Word.is_trivia());
    }
}
