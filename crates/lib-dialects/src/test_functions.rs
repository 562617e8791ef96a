use sqlmorph_lib_core::ast::Expr;
use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::errors::{SQLParseError, SQLUnsupportedError};
use sqlmorph_lib_core::generator::Generator;
use sqlmorph_lib_core::parser::Parser;

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

/// Parses one statement with `read` and renders it with `write`.
#[track_caller]
pub(crate) fn transpile(
    read: &Dialect,
    sql: &str,
    write: &Dialect,
) -> Result<String, SQLUnsupportedError> {
    Generator::new(write).sql(&parse_one(read, sql))
}
