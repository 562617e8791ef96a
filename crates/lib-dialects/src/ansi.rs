use std::borrow::Cow;

use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::helpers::{Config, ToFunctionParser};
use sqlmorph_lib_core::parser::function::{
    CastParser, FunctionBuilder, build_any_value, build_approx_distinct, build_regexp_like,
};
use sqlmorph_lib_core::parser::lexer::{Cursor, Matcher};
use sqlmorph_lib_core::parser::token::TokenKind;
use sqlmorph_lib_core::value::Value;

use super::ansi_keywords::ANSI_RESERVED_KEYWORDS;

pub fn dialect(config: Option<&Value>) -> Dialect {
    raw_dialect().config(|this| {
        apply_generator_config(this, config);
        this.expand();
    })
}

/// The base every other dialect is layered over: lexer, keywords, and the
/// function registries of standard SQL. Not yet expanded.
pub fn raw_dialect() -> Dialect {
    let mut ansi_dialect = Dialect::new();

    ansi_dialect.set_lexer_matchers(lexer_matchers());
    ansi_dialect
        .update_keywords_set_from_multiline_string("reserved_keywords", ANSI_RESERVED_KEYWORDS);

    ansi_dialect.add_function_parsers([(Cow::Borrowed("CAST"), CastParser.to_function_parser())]);
    ansi_dialect.add_function_builders([
        (
            Cow::Borrowed("APPROX_DISTINCT"),
            build_approx_distinct as FunctionBuilder,
        ),
        (Cow::Borrowed("ANY_VALUE"), build_any_value),
        (Cow::Borrowed("REGEXP_LIKE"), build_regexp_like),
    ]);

    ansi_dialect
}

/// Layers generator settings from a configuration map over the dialect's
/// defaults.
pub(crate) fn apply_generator_config(dialect: &mut Dialect, config: Option<&Value>) {
    if let Some(config) = config {
        dialect.generator_config.apply(config);
    }
}

fn lexer_matchers() -> Vec<Matcher> {
    vec![
        Matcher::regex("whitespace", r"[^\S\r\n]+", TokenKind::Whitespace),
        Matcher::regex("inline_comment", r"--[^\n]*", TokenKind::InlineComment),
        Matcher::native("block_comment", block_comment, TokenKind::BlockComment),
        Matcher::quoted("single_quote", '\'', '\'', TokenKind::StringLiteral),
        Matcher::quoted("double_quote", '"', '"', TokenKind::QuotedIdentifier),
        Matcher::native(
            "numeric_literal",
            numeric_literal,
            TokenKind::NumericLiteral,
        ),
        Matcher::regex("newline", r"(\r\n|\n)", TokenKind::Newline),
        Matcher::string("not_equal", "<>", TokenKind::NotEquals),
        Matcher::string("bang_not_equal", "!=", TokenKind::NotEquals),
        Matcher::string("less_than_or_equal", "<=", TokenKind::LessThanOrEqual),
        Matcher::string(
            "greater_than_or_equal",
            ">=",
            TokenKind::GreaterThanOrEqual,
        ),
        Matcher::string("concat", "||", TokenKind::Concat),
        Matcher::string("equals", "=", TokenKind::Equals),
        Matcher::string("greater_than", ">", TokenKind::GreaterThan),
        Matcher::string("less_than", "<", TokenKind::LessThan),
        Matcher::string("dot", ".", TokenKind::Dot),
        Matcher::string("comma", ",", TokenKind::Comma),
        Matcher::string("plus", "+", TokenKind::Plus),
        Matcher::string("minus", "-", TokenKind::Minus),
        Matcher::string("divide", "/", TokenKind::Divide),
        Matcher::string("percent", "%", TokenKind::Percent),
        Matcher::string("star", "*", TokenKind::Star),
        Matcher::string("start_bracket", "(", TokenKind::StartBracket),
        Matcher::string("end_bracket", ")", TokenKind::EndBracket),
        Matcher::string("semicolon", ";", TokenKind::Semicolon),
        Matcher::regex("word", "[\\p{L}_][\\p{L}\\p{N}_]*", TokenKind::Word),
    ]
}

fn numeric_literal(cursor: &mut Cursor) -> bool {
    let first_char = cursor.shift();
    match first_char {
        '0'..='9' | '.' => {
            let has_decimal = first_char == '.';

            if has_decimal {
                if cursor.peek().is_ascii_digit() {
                    cursor.shift_while(|c| c.is_ascii_digit());
                } else {
                    return false;
                }
            } else {
                cursor.shift_while(|c| c.is_ascii_digit());
                if cursor.peek() == '.' {
                    cursor.shift();
                    cursor.shift_while(|c| c.is_ascii_digit());
                }
            }

            if let 'e' | 'E' = cursor.peek() {
                cursor.shift();
                if let '+' | '-' = cursor.peek() {
                    cursor.shift();
                }
                let mut exp_digits = false;
                while cursor.peek().is_ascii_digit() {
                    cursor.shift();
                    exp_digits = true;
                }
                if !exp_digits {
                    return false;
                }
            }

            let next_char = cursor.peek();
            if next_char == '.' || next_char.is_ascii_alphanumeric() || next_char == '_' {
                return false;
            }

            true
        }
        _ => false,
    }
}

/// Block comments nest.
fn block_comment(cursor: &mut Cursor) -> bool {
    if cursor.shift() != '/' {
        return false;
    }

    if cursor.shift() != '*' {
        return false;
    }

    let mut depth = 1usize;

    loop {
        match cursor.shift() {
            Cursor::EOF => {
                cursor.mark_unterminated();
                return false;
            }
            '/' if cursor.peek() == '*' => {
                cursor.shift();
                depth += 1;
            }
            '*' if cursor.peek() == '/' => {
                cursor.shift();
                depth -= 1;
                if depth == 0 {
                    break true;
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sqlmorph_lib_core::ast::{Expr, ExprKind, Identifier, Quantile, RegexpLike, Struct};
    use sqlmorph_lib_core::dialects::init::DialectKind;
    use sqlmorph_lib_core::errors::SQLUnsupportedError;
    use sqlmorph_lib_core::generator::Generator;
    use sqlmorph_lib_core::parser::token::TokenKind;
    use sqlmorph_lib_core::value::Value;

    use crate::test_functions::{parse_err, parse_one, transpile};

    #[test]
    fn lexes_numbers_and_comments() {
        let dialect = super::dialect(None);
        let tokens = dialect
            .lexer()
            .lex("1.5e3 /* a /* nested */ comment */ .5 -- trailing")
            .unwrap();

        let texts = tokens.iter().map(|token| token.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, ["1.5e3", ".5", ""]);
        assert_eq!(tokens[0].kind, TokenKind::NumericLiteral);
    }

    #[test]
    fn unterminated_constructs_fail_to_lex() {
        let dialect = super::dialect(None);

        let err = dialect.lexer().lex("SELECT 'abc").unwrap_err();
        assert_eq!(err.to_string(), "Unterminated single quote at line 1, position 8");

        let err = dialect.lexer().lex("SELECT 1 /* open").unwrap_err();
        assert_eq!(err.position().line_pos, 10);

        assert!(dialect.lexer().lex("SELECT `a`").is_err());
    }

    #[test]
    fn plain_functions_do_not_accept_aliases() {
        let dialect = super::dialect(None);

        let err = parse_err(&dialect, "SELECT tuple(a AS x)");
        assert_eq!(err.found, "AS");
        assert_eq!(err.expected, vec!["','", "')'"]);
    }

    #[test]
    fn canonical_builders() {
        let dialect = super::dialect(None);

        assert_eq!(
            parse_one(&dialect, "approx_distinct(a)"),
            Expr::ApproxDistinct(Box::new(Expr::ident("a")))
        );
        assert_eq!(
            parse_one(&dialect, "any_value(a)"),
            Expr::AnyValue(Box::new(Expr::ident("a")))
        );
        // UNIQ is ClickHouse only.
        assert_eq!(
            parse_one(&dialect, "uniq(a)"),
            Expr::function("uniq", vec![Expr::ident("a")])
        );
        assert!(parse_err(&dialect, "any_value()").matches("expected 1 argument, got 0"));
        assert_eq!(
            parse_one(&dialect, "regexp_like(a, 'x.*')"),
            Expr::RegexpLike(RegexpLike {
                this: Box::new(Expr::ident("a")),
                expression: Box::new(Expr::string("x.*")),
            })
        );
        // MATCH is ClickHouse only.
        assert_eq!(
            parse_one(&dialect, "match(a, 'x')"),
            Expr::function("match", vec![Expr::ident("a"), Expr::string("x")])
        );
    }

    #[test]
    fn round_trips() {
        let dialect = super::dialect(None);

        for sql in [
            "SELECT a, b AS c FROM t WHERE a >= 1 AND NOT b = 2",
            "SELECT COUNT(*) FROM s.t AS x GROUP BY a HAVING COUNT(*) > 1",
            "SELECT DISTINCT a || 'b' FROM (SELECT a FROM t) AS s ORDER BY a DESC LIMIT 5",
            "SELECT CAST(a AS DECIMAL(10, 2)), APPROX_DISTINCT(b), ANY_VALUE(c)",
            "SELECT (1, 2), (a + b) * c, -a, \"Mixed Case\"",
            "SELECT a = (NOT b), NOT NOT c, d AND NOT e, REGEXP_LIKE(f, 'g')",
            "SELECT 'it''s', 'back\\slash'",
        ] {
            assert_eq!(transpile(&dialect, sql, &dialect).unwrap(), sql);
        }
    }

    #[test]
    fn keywords_and_functions_are_uppercased() {
        let dialect = super::dialect(None);

        assert_eq!(
            transpile(&dialect, "select coalesce(a, 1) x from t", &dialect).unwrap(),
            "SELECT COALESCE(a, 1) AS x FROM t"
        );
        assert_eq!(
            transpile(&dialect, "select a != b", &dialect).unwrap(),
            "SELECT a <> b"
        );
    }

    #[test]
    fn configuration_overrides_generator_settings() {
        let config = Value::from([
            ("identify", Value::Bool(true)),
            ("normalize_functions", Value::String("lower".into())),
        ]);
        let dialect = super::dialect(Some(&config));

        assert_eq!(
            transpile(&dialect, "SELECT COALESCE(a, b) FROM t", &dialect).unwrap(),
            r#"SELECT coalesce("a", "b") FROM "t""#
        );
    }

    #[test]
    fn only_positional_structs_render() {
        let dialect = super::dialect(None);
        let generator = Generator::new(&dialect);

        let positional = Expr::Struct(Struct {
            elements: vec![Expr::ident("a")],
            surface: Some("tuple".into()),
        });
        assert_eq!(generator.sql(&positional).unwrap(), "STRUCT(a)");

        let named = Expr::Struct(Struct {
            elements: vec![Expr::ident("a").alias(Identifier::new("x"))],
            surface: Some("tuple".into()),
        });
        assert_eq!(
            generator.sql(&named),
            Err(SQLUnsupportedError::new(ExprKind::Struct, DialectKind::Ansi))
        );
    }

    #[test]
    fn not_binds_looser_than_comparisons() {
        let dialect = super::dialect(None);

        assert_eq!(parse_err(&dialect, "SELECT a = NOT b").found, "NOT");
        assert_eq!(parse_err(&dialect, "SELECT a * NOT b").found, "NOT");
    }

    #[test]
    fn quantile_is_unsupported() {
        let dialect = super::dialect(None);
        let node = Expr::Quantile(Quantile {
            this: Box::new(Expr::ident("x")),
            quantile: Box::new(Expr::number("0.5")),
        });

        assert_eq!(
            Generator::new(&dialect).sql(&node),
            Err(SQLUnsupportedError::new(ExprKind::Quantile, DialectKind::Ansi))
        );
    }
}
