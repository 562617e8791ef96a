//! Strategies for parsing the argument lists of function calls.
//!
//! A dialect maps function names to a [`FunctionParser`]. The parser
//! consumes the name and the opening bracket, then hands over to the
//! strategy registered for the name, or to [`DefaultFunctionParser`].

use super::Parser;
use super::token::{Token, TokenKind};
use crate::ast::{Cast, DataType, DataTypeParam, Expr, FunctionCall, RegexpLike, Struct, VarMap};
use crate::errors::SQLParseError;

pub trait FunctionParser: Send + Sync {
    /// Parses the rest of a call to `name`. On entry the parser sits just
    /// past the opening bracket; the strategy consumes everything up to and
    /// including the matching closing bracket.
    fn parse(&self, parser: &mut Parser<'_>, name: &Token) -> Result<Expr, SQLParseError>;
}

/// Builds a canonical node from the arguments of a plain call. The error
/// explains why the arguments were rejected.
pub type FunctionBuilder = fn(Vec<Expr>) -> Result<Expr, String>;

/// Comma separated expressions, no aliases. The result goes through the
/// dialect's function builder for the name when there is one.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFunctionParser;

impl FunctionParser for DefaultFunctionParser {
    fn parse(&self, parser: &mut Parser<'_>, name: &Token) -> Result<Expr, SQLParseError> {
        let args = parser.parse_csv_to_end_bracket(Parser::parse_expression)?;

        match parser.dialect().function_builder(&name.construct_id()) {
            Some(builder) => builder(args).map_err(|reason| {
                SQLParseError::new(format!("Invalid call to {}: {reason}", name.text), name)
            }),
            None => Ok(Expr::Function(FunctionCall {
                name: name.text.clone(),
                args,
            })),
        }
    }
}

/// Comma separated elements, each of which may carry `AS name`. Produces a
/// [`Struct`] remembering the keyword as typed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructParser;

impl FunctionParser for StructParser {
    fn parse(&self, parser: &mut Parser<'_>, name: &Token) -> Result<Expr, SQLParseError> {
        let elements = parser.parse_csv_to_end_bracket(Parser::parse_aliased_expression)?;

        Ok(Expr::Struct(Struct {
            elements,
            surface: Some(name.text.clone()),
        }))
    }
}

/// `CAST(expr AS type)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CastParser;

impl FunctionParser for CastParser {
    fn parse(&self, parser: &mut Parser<'_>, _name: &Token) -> Result<Expr, SQLParseError> {
        let this = parser.parse_expression()?;
        parser.expect_keyword("AS")?;
        let to = parse_data_type(parser)?;
        parser.expect_end_bracket()?;

        Ok(Expr::Cast(Cast {
            this: Box::new(this),
            to,
        }))
    }
}

/// A strategy backed by a plain function.
#[derive(Clone, Copy)]
pub struct NativeFunctionParser {
    f: fn(&mut Parser<'_>, &Token) -> Result<Expr, SQLParseError>,
}

impl NativeFunctionParser {
    pub const fn new(f: fn(&mut Parser<'_>, &Token) -> Result<Expr, SQLParseError>) -> Self {
        Self { f }
    }
}

impl FunctionParser for NativeFunctionParser {
    fn parse(&self, parser: &mut Parser<'_>, name: &Token) -> Result<Expr, SQLParseError> {
        (self.f)(parser, name)
    }
}

/// A type name with optional bracketed parameters, e.g. `DECIMAL(10, 2)` or
/// `Nullable(Int64)`. The name is resolved to its canonical form through the
/// dialect's type aliases.
pub fn parse_data_type(parser: &mut Parser<'_>) -> Result<DataType, SQLParseError> {
    let kind = parser.peek().kind;
    let name = match kind {
        TokenKind::Word | TokenKind::Keyword => parser.advance().construct_id(),
        _ => return Err(parser.unexpected(&["data type"])),
    };

    let params = if parser.consume(TokenKind::StartBracket) {
        parser.parse_csv_to_end_bracket(parse_data_type_param)?
    } else {
        Vec::new()
    };

    let canonical = parser.dialect().canonical_type(&name);
    Ok(DataType {
        name: canonical.into(),
        params,
    })
}

fn parse_data_type_param(parser: &mut Parser<'_>) -> Result<DataTypeParam, SQLParseError> {
    let kind = parser.peek().kind;
    match kind {
        TokenKind::NumericLiteral => Ok(DataTypeParam::Number(parser.advance().text)),
        TokenKind::StringLiteral => {
            let token = parser.advance();
            Ok(DataTypeParam::String(parser.string_value(&token)))
        }
        TokenKind::Word | TokenKind::Keyword => parse_data_type(parser).map(DataTypeParam::Type),
        _ => Err(parser.unexpected(&["type parameter"])),
    }
}

/// Takes exactly `N` arguments out of `args`.
pub fn exact_args<const N: usize>(args: Vec<Expr>) -> Result<[Expr; N], String> {
    let count = args.len();
    <[Expr; N]>::try_from(args).map_err(|_| {
        let plural = if N == 1 { "" } else { "s" };
        format!("expected {N} argument{plural}, got {count}")
    })
}

pub fn build_approx_distinct(args: Vec<Expr>) -> Result<Expr, String> {
    let [this] = exact_args(args)?;
    Ok(Expr::ApproxDistinct(Box::new(this)))
}

pub fn build_any_value(args: Vec<Expr>) -> Result<Expr, String> {
    let [this] = exact_args(args)?;
    Ok(Expr::AnyValue(Box::new(this)))
}

pub fn build_regexp_like(args: Vec<Expr>) -> Result<Expr, String> {
    let [this, expression] = exact_args(args)?;
    Ok(Expr::RegexpLike(RegexpLike {
        this: Box::new(this),
        expression: Box::new(expression),
    }))
}

/// Splits alternating keys and values.
pub fn build_var_map(args: Vec<Expr>) -> Result<Expr, String> {
    if args.len() % 2 != 0 {
        return Err(format!(
            "expected an even number of arguments, got {}",
            args.len()
        ));
    }

    let mut keys = Vec::with_capacity(args.len() / 2);
    let mut values = Vec::with_capacity(args.len() / 2);
    let mut args = args.into_iter();
    while let (Some(key), Some(value)) = (args.next(), args.next()) {
        keys.push(key);
        values.push(value);
    }

    Ok(Expr::VarMap(VarMap { keys, values }))
}
