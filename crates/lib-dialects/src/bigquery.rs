use std::borrow::Cow;

use sqlmorph_lib_core::ast::{Expr, ExprKind};
use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::dialects::init::DialectKind;
use sqlmorph_lib_core::errors::SQLUnsupportedError;
use sqlmorph_lib_core::generator::{Generator, NativeTransform};
use sqlmorph_lib_core::helpers::{Config, ToFunctionParser, ToTransform};
use sqlmorph_lib_core::parser::function::StructParser;
use sqlmorph_lib_core::parser::lexer::Matcher;
use sqlmorph_lib_core::parser::token::TokenKind;
use sqlmorph_lib_core::value::Value;

use super::ansi::{self, raw_dialect};
use crate::bigquery_keywords::BIGQUERY_RESERVED_KEYWORDS;

pub fn dialect(config: Option<&Value>) -> Dialect {
    let mut dialect = raw_dialect();
    dialect.name = DialectKind::Bigquery;

    dialect.insert_lexer_matchers(
        vec![Matcher::quoted(
            "back_quote",
            '`',
            '`',
            TokenKind::QuotedIdentifier,
        )],
        "numeric_literal",
    );
    dialect.patch_lexer_matchers(vec![
        Matcher::quoted("single_quote", '\'', '\'', TokenKind::StringLiteral).escape('\\'),
    ]);

    dialect.update_keywords_set_from_multiline_string(
        "reserved_keywords",
        BIGQUERY_RESERVED_KEYWORDS,
    );

    dialect.add_function_parsers([(Cow::Borrowed("STRUCT"), StructParser.to_function_parser())]);
    dialect.add_transforms([(
        ExprKind::Struct,
        NativeTransform::new(struct_sql).to_transform(),
    )]);

    dialect.add_type_aliases([
        ("INT64", "BIGINT"),
        ("FLOAT64", "DOUBLE"),
        ("STRING", "TEXT"),
        ("BOOL", "BOOLEAN"),
    ]);
    dialect.add_type_names([
        ("BIGINT", "INT64"),
        ("INT", "INT64"),
        ("SMALLINT", "INT64"),
        ("TINYINT", "INT64"),
        ("DOUBLE", "FLOAT64"),
        ("FLOAT", "FLOAT64"),
        ("TEXT", "STRING"),
        ("VARCHAR", "STRING"),
        ("BOOLEAN", "BOOL"),
        ("DECIMAL", "NUMERIC"),
    ]);

    dialect.generator_config.identifier_quote = ('`', '`');

    dialect.config(|this| {
        ansi::apply_generator_config(this, config);
        this.expand();
    })
}

/// `STRUCT(...)` with named fields.
fn struct_sql(generator: &Generator<'_>, expr: &Expr) -> Result<String, SQLUnsupportedError> {
    let Expr::Struct(node) = expr else {
        return generator.default_sql(expr);
    };

    Ok(format!("STRUCT({})", generator.expressions(&node.elements)?))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sqlmorph_lib_core::ast::{Expr, Identifier, Struct};

    use crate::test_functions::{parse_err, parse_one, transpile};

    #[test]
    fn struct_with_aliases() {
        let dialect = super::dialect(None);

        let Expr::Struct(Struct { elements, surface }) =
            parse_one(&dialect, "STRUCT(1 AS a, 'x' AS b, c)")
        else {
            panic!("expected a struct");
        };

        assert_eq!(surface.as_deref(), Some("STRUCT"));
        assert_eq!(
            elements,
            vec![
                Expr::number(1).alias(Identifier::new("a")),
                Expr::string("x").alias(Identifier::new("b")),
                Expr::ident("c"),
            ]
        );
    }

    #[test]
    fn round_trips() {
        let dialect = super::dialect(None);

        for sql in [
            "SELECT STRUCT(1 AS a, STRUCT(b AS c) AS d) FROM `project.dataset.table`",
            "SELECT STRUCT() AS s",
            "SELECT APPROX_DISTINCT(x), ANY_VALUE(y) FROM t GROUP BY z",
        ] {
            assert_eq!(transpile(&dialect, sql, &dialect).unwrap(), sql);
        }

        assert_eq!(
            transpile(&dialect, "select struct(a as x)", &dialect).unwrap(),
            "SELECT STRUCT(a AS x)"
        );
    }

    #[test]
    fn types_use_bigquery_names() {
        let dialect = super::dialect(None);

        assert_eq!(
            transpile(&dialect, "SELECT CAST(a AS INT64), CAST(b AS string)", &dialect).unwrap(),
            "SELECT CAST(a AS INT64), CAST(b AS STRING)"
        );
        assert_eq!(
            transpile(&dialect, "SELECT CAST(a AS DECIMAL(10, 2))", &dialect).unwrap(),
            "SELECT CAST(a AS NUMERIC(10, 2))"
        );
    }

    #[test]
    fn strings_use_backslash_escapes() {
        let dialect = super::dialect(None);

        assert_eq!(parse_one(&dialect, r"'a\'b'"), Expr::string("a'b"));
        assert_eq!(
            transpile(&dialect, r"SELECT 'a\'b', 'tab\there'", &dialect).unwrap(),
            r"SELECT 'a\'b', 'tab\there'"
        );
    }

    #[test]
    fn tuple_is_not_overridden() {
        let dialect = super::dialect(None);

        let err = parse_err(&dialect, "SELECT tuple(a AS x)");
        assert_eq!(err.found, "AS");
    }

    #[test]
    fn reserved_words_are_quoted_with_backticks() {
        let dialect = super::dialect(None);

        assert_eq!(
            transpile(&dialect, "SELECT `window`, `from` FROM t", &dialect).unwrap(),
            "SELECT `window`, `from` FROM t"
        );
    }
}
