pub mod errors;
pub mod registry;

pub use sqlmorph_lib_core as core;
use sqlmorph_lib_core::ast::Expr;
use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::generator::Generator;
use sqlmorph_lib_core::parser::Parser;
use sqlmorph_lib_core::parser::token::TokenKind;
pub use sqlmorph_lib_dialects as dialects;

use crate::errors::Error;

/// Parses every `;` separated statement of `sql`.
pub fn parse(sql: &str, dialect: &Dialect) -> Result<Vec<Expr>, Error> {
    let tokens = dialect.lexer().lex(sql)?;
    Ok(Parser::new(dialect, tokens).parse()?)
}

/// Parses `sql`, which must hold exactly one statement.
pub fn parse_one(sql: &str, dialect: &Dialect) -> Result<Expr, Error> {
    let tokens = dialect.lexer().lex(sql)?;
    let mut parser = Parser::new(dialect, tokens);

    let expr = parser.parse_statement()?;
    parser.consume(TokenKind::Semicolon);
    parser.expect(TokenKind::EndOfFile, "end of input")?;

    Ok(expr)
}

pub fn generate(expr: &Expr, dialect: &Dialect) -> Result<String, Error> {
    Ok(Generator::new(dialect).sql(expr)?)
}

/// Reads `sql` with one dialect and writes each statement with another.
pub fn transpile(sql: &str, read: &Dialect, write: &Dialect) -> Result<Vec<String>, Error> {
    log::debug!("transpiling from {} to {}", read.name().name(), write.name().name());

    let generator = Generator::new(write);
    parse(sql, read)?
        .iter()
        .map(|statement| generator.sql(statement).map_err(Error::from))
        .collect()
}
