use std::borrow::Cow;

use crate::ast::Expr;
use crate::dialects::Dialect;
use crate::errors::SQLParseError;
use crate::helpers::ToFunctionParser;
use crate::parser::Parser;
use crate::parser::function::CastParser;
use crate::parser::lexer::Matcher;
use crate::parser::token::TokenKind;

const RESERVED_KEYWORDS: &str = "SELECT
DISTINCT
FROM
WHERE
GROUP
BY
HAVING
ORDER
ASC
DESC
LIMIT
AS
AND
OR
NOT
NULL
TRUE
FALSE";

/// A small, unexpanded dialect with the base grammar and nothing else.
pub(crate) fn fresh_dialect() -> Dialect {
    let mut dialect = Dialect::new();

    dialect.set_lexer_matchers(vec![
        Matcher::regex("whitespace", r"[^\S\r\n]+", TokenKind::Whitespace),
        Matcher::regex("newline", r"\r\n|\n", TokenKind::Newline),
        Matcher::regex("inline_comment", r"--[^\n]*", TokenKind::InlineComment),
        Matcher::quoted("single_quote", '\'', '\'', TokenKind::StringLiteral),
        Matcher::quoted("double_quote", '"', '"', TokenKind::QuotedIdentifier),
        Matcher::regex(
            "numeric_literal",
            r"[0-9]+(\.[0-9]+)?",
            TokenKind::NumericLiteral,
        ),
        Matcher::string("not_equal", "<>", TokenKind::NotEquals),
        Matcher::string("less_than_or_equal", "<=", TokenKind::LessThanOrEqual),
        Matcher::string("greater_than_or_equal", ">=", TokenKind::GreaterThanOrEqual),
        Matcher::string("concat", "||", TokenKind::Concat),
        Matcher::string("less_than", "<", TokenKind::LessThan),
        Matcher::string("greater_than", ">", TokenKind::GreaterThan),
        Matcher::string("equals", "=", TokenKind::Equals),
        Matcher::string("comma", ",", TokenKind::Comma),
        Matcher::string("dot", ".", TokenKind::Dot),
        Matcher::string("star", "*", TokenKind::Star),
        Matcher::string("plus", "+", TokenKind::Plus),
        Matcher::string("minus", "-", TokenKind::Minus),
        Matcher::string("divide", "/", TokenKind::Divide),
        Matcher::string("percent", "%", TokenKind::Percent),
        Matcher::string("start_bracket", "(", TokenKind::StartBracket),
        Matcher::string("end_bracket", ")", TokenKind::EndBracket),
        Matcher::string("semicolon", ";", TokenKind::Semicolon),
        Matcher::regex("word", r"[\p{L}_][\p{L}\p{N}_]*", TokenKind::Word),
    ]);
    dialect.update_keywords_set_from_multiline_string("reserved_keywords", RESERVED_KEYWORDS);
    dialect.add_function_parsers([(Cow::Borrowed("CAST"), CastParser.to_function_parser())]);

    dialect
}

fn parse(dialect: &Dialect, sql: &str) -> Result<Vec<Expr>, SQLParseError> {
    let tokens = dialect.lexer().lex(sql).unwrap();
    Parser::new(dialect, tokens).parse()
}

#[track_caller]
pub(crate) fn parse_one(dialect: &Dialect, sql: &str) -> Expr {
    let mut statements = parse(dialect, sql).unwrap();
    assert_eq!(statements.len(), 1, "expected one statement in {sql:?}");
    statements.remove(0)
}

#[track_caller]
pub(crate) fn parse_err(dialect: &Dialect, sql: &str) -> SQLParseError {
    match parse(dialect, sql) {
        Ok(statements) => panic!("expected {sql:?} to fail, got {statements:?}"),
        Err(err) => err,
    }
}
