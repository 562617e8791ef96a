use std::borrow::Cow;

use sqlmorph_lib_core::ast::{Expr, ExprKind, FunctionCall, Literal, Quantile};
use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::dialects::init::DialectKind;
use sqlmorph_lib_core::errors::{SQLParseError, SQLUnsupportedError};
use sqlmorph_lib_core::generator::{Generator, NativeTransform, NormalizeFunctions, RenameFunction};
use sqlmorph_lib_core::helpers::{Config, ToFunctionParser, ToTransform};
use sqlmorph_lib_core::parser::function::{
    FunctionBuilder, NativeFunctionParser, StructParser, build_any_value, build_approx_distinct,
    build_regexp_like, build_var_map, exact_args,
};
use sqlmorph_lib_core::parser::lexer::Matcher;
use sqlmorph_lib_core::parser::token::{Token, TokenKind};
use sqlmorph_lib_core::parser::{Parser, TableModifier};
use sqlmorph_lib_core::value::Value;

use super::ansi::{self, raw_dialect};
use crate::clickhouse_keywords::CLICKHOUSE_RESERVED_KEYWORDS;

/// Type names as written, uppercased, that differ from the canonical name.
const TYPE_ALIASES: [(&str, &str); 12] = [
    ("FLOAT32", "FLOAT"),
    ("FLOAT64", "DOUBLE"),
    ("INT8", "TINYINT"),
    ("INT16", "SMALLINT"),
    ("INT32", "INT"),
    ("INT64", "BIGINT"),
    ("UINT8", "UTINYINT"),
    ("UINT16", "USMALLINT"),
    ("UINT32", "UINT"),
    ("UINT64", "UBIGINT"),
    ("TUPLE", "STRUCT"),
    ("STRING", "TEXT"),
];

/// Type names are case sensitive.
const TYPE_NAMES: [(&str, &str); 25] = [
    ("ARRAY", "Array"),
    ("BIGINT", "Int64"),
    ("DATE", "Date"),
    ("DATETIME", "DateTime"),
    ("DATETIME64", "DateTime64"),
    ("DOUBLE", "Float64"),
    ("FIXEDSTRING", "FixedString"),
    ("FLOAT", "Float32"),
    ("INT", "Int32"),
    ("INT128", "Int128"),
    ("INT256", "Int256"),
    ("LOWCARDINALITY", "LowCardinality"),
    ("MAP", "Map"),
    ("NULLABLE", "Nullable"),
    ("SMALLINT", "Int16"),
    ("STRUCT", "Tuple"),
    ("TEXT", "String"),
    ("TINYINT", "Int8"),
    ("UBIGINT", "UInt64"),
    ("UINT", "UInt32"),
    ("UINT128", "UInt128"),
    ("UINT256", "UInt256"),
    ("USMALLINT", "UInt16"),
    ("UTINYINT", "UInt8"),
    ("UUID", "UUID"),
];

pub fn dialect(config: Option<&Value>) -> Dialect {
    let mut clickhouse_dialect = raw_dialect();
    clickhouse_dialect.name = DialectKind::Clickhouse;

    clickhouse_dialect.insert_lexer_matchers(
        vec![
            Matcher::regex("hash_comment", r"#[^\n]*", TokenKind::InlineComment),
            Matcher::quoted("back_quote", '`', '`', TokenKind::QuotedIdentifier),
            Matcher::regex(
                "hex_literal",
                r"0[xX][0-9a-fA-F]+",
                TokenKind::HexStringLiteral,
            ),
            Matcher::regex("bit_literal", r"0b[01]+", TokenKind::BitStringLiteral),
        ],
        "numeric_literal",
    );
    clickhouse_dialect.patch_lexer_matchers(vec![
        Matcher::quoted("single_quote", '\'', '\'', TokenKind::StringLiteral).escape('\\'),
    ]);

    clickhouse_dialect.update_keywords_set_from_multiline_string(
        "reserved_keywords",
        CLICKHOUSE_RESERVED_KEYWORDS,
    );

    clickhouse_dialect.add_function_parsers([
        (Cow::Borrowed("TUPLE"), StructParser.to_function_parser()),
        (
            Cow::Borrowed("QUANTILE"),
            NativeFunctionParser::new(parse_quantile).to_function_parser(),
        ),
    ]);

    clickhouse_dialect.add_function_builders([
        (Cow::Borrowed("UNIQ"), build_approx_distinct as FunctionBuilder),
        (Cow::Borrowed("ANY"), build_any_value),
        (Cow::Borrowed("MATCH"), build_regexp_like),
        (Cow::Borrowed("MAP"), build_var_map),
    ]);

    clickhouse_dialect.add_table_modifiers([(Cow::Borrowed("FINAL"), wrap_final as TableModifier)]);

    clickhouse_dialect.add_type_aliases(TYPE_ALIASES);
    clickhouse_dialect.add_type_names(TYPE_NAMES);

    clickhouse_dialect.add_transforms([
        (ExprKind::Struct, NativeTransform::new(tuple_sql).to_transform()),
        (ExprKind::Quantile, NativeTransform::new(quantile_sql).to_transform()),
        (ExprKind::ApproxDistinct, RenameFunction::new("uniq").to_transform()),
        (ExprKind::AnyValue, RenameFunction::new("any").to_transform()),
        (ExprKind::RegexpLike, RenameFunction::new("match").to_transform()),
        (ExprKind::VarMap, NativeTransform::new(map_sql).to_transform()),
        (ExprKind::Final, NativeTransform::new(final_sql).to_transform()),
        (ExprKind::Literal, NativeTransform::new(literal_sql).to_transform()),
    ]);

    // Function names are case sensitive.
    clickhouse_dialect.generator_config.normalize_functions = NormalizeFunctions::None;

    clickhouse_dialect.config(|this| {
        ansi::apply_generator_config(this, config);
        this.expand();
    })
}

fn wrap_final(table: Expr) -> Expr {
    Expr::Final(Box::new(table))
}

/// `quantile(level)(expr)`, or `quantile(expr)` for the median.
fn parse_quantile(parser: &mut Parser<'_>, name: &Token) -> Result<Expr, SQLParseError> {
    let invalid =
        |reason: String| SQLParseError::new(format!("Invalid call to {}: {reason}", name.text), name);

    let params = parser.parse_csv_to_end_bracket(Parser::parse_expression)?;

    if !parser.consume(TokenKind::StartBracket) {
        if params.is_empty() {
            return Ok(Expr::Function(FunctionCall {
                name: name.text.clone(),
                args: params,
            }));
        }

        let [this] = exact_args(params).map_err(invalid)?;
        return Ok(Expr::Quantile(Quantile {
            this: Box::new(this),
            quantile: Box::new(Expr::number("0.5")),
        }));
    }

    let [quantile] = exact_args(params).map_err(invalid)?;
    let args = parser.parse_csv_to_end_bracket(Parser::parse_expression)?;
    let [this] = exact_args(args).map_err(invalid)?;

    Ok(Expr::Quantile(Quantile {
        this: Box::new(this),
        quantile: Box::new(quantile),
    }))
}

/// Keeps the keyword as typed when it was `tuple`, whatever its case.
fn tuple_sql(generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
    let Expr::Struct(node) = expr else {
        return generator.default_sql(expr);
    };

    let keyword = match &node.surface {
        Some(surface) if surface.eq_ignore_ascii_case("tuple") => surface.as_str(),
        _ => "tuple",
    };

    Ok(format!("{keyword}({})", generator.expressions(&node.elements)?))
}

fn quantile_sql(generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
    let Expr::Quantile(node) = expr else {
        return generator.default_sql(expr);
    };

    Ok(format!(
        "quantile({})({})",
        generator.sql(&node.quantile)?,
        generator.sql(&node.this)?
    ))
}

/// `map(k1, v1, k2, v2)`.
fn map_sql(generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
    let Expr::VarMap(node) = expr else {
        return generator.default_sql(expr);
    };

    let args = node
        .keys
        .iter()
        .zip(&node.values)
        .flat_map(|(key, value)| [key, value]);
    Ok(format!("map({})", generator.expressions(args)?))
}

fn final_sql(generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
    let Expr::Final(this) = expr else {
        return generator.default_sql(expr);
    };

    Ok(format!("{} FINAL", generator.sql(this)?))
}

fn literal_sql(generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
    match expr {
        Expr::Literal(Literal::HexString(digits)) => Ok(format!("0x{digits}")),
        Expr::Literal(Literal::BitString(digits)) => Ok(format!("0b{digits}")),
        _ => generator.default_sql(expr),
    }
}
