use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::dialects::init::DialectKind;
use sqlmorph_lib_core::value::Value;

pub mod ansi;
mod ansi_keywords;
#[cfg(feature = "bigquery")]
pub mod bigquery;
#[cfg(feature = "bigquery")]
mod bigquery_keywords;
#[cfg(feature = "clickhouse")]
pub mod clickhouse;
#[cfg(feature = "clickhouse")]
mod clickhouse_keywords;

#[cfg(test)]
mod test_functions;

/// Builds and expands the dialect for `kind`, or `None` when it was compiled
/// out. `config` may override generator settings.
pub fn kind_to_dialect(kind: &DialectKind, config: Option<&Value>) -> Option<Dialect> {
    #[allow(unreachable_patterns)]
    Some(match kind {
        DialectKind::Ansi => ansi::dialect(config),
        #[cfg(feature = "bigquery")]
        DialectKind::Bigquery => bigquery::dialect(config),
        #[cfg(feature = "clickhouse")]
        DialectKind::Clickhouse => clickhouse::dialect(config),
        _ => return None,
    })
}

#[cfg(all(test, feature = "bigquery", feature = "clickhouse"))]
mod tests {
    use sqlmorph_lib_core::dialects::init::DialectKind;
    use strum::IntoEnumIterator;

    use crate::kind_to_dialect;
    use crate::test_functions::{parse_err, parse_one};

    #[test]
    fn every_kind_builds() {
        for kind in DialectKind::iter() {
            let dialect = kind_to_dialect(&kind, None).unwrap();
            assert_eq!(dialect.name(), kind);
        }
    }

    #[test]
    fn overrides_are_isolated_per_dialect() {
        let ansi = kind_to_dialect(&DialectKind::Ansi, None).unwrap();
        let bigquery = kind_to_dialect(&DialectKind::Bigquery, None).unwrap();
        let clickhouse = kind_to_dialect(&DialectKind::Clickhouse, None).unwrap();

        let sql = "tuple(a AS x)";
        assert!(matches!(parse_one(&clickhouse, sql), sqlmorph_lib_core::ast::Expr::Struct(_)));
        assert_eq!(parse_err(&ansi, sql).found, "AS");
        assert_eq!(parse_err(&bigquery, sql).found, "AS");

        assert!(ansi.function_parser("TUPLE").is_none());
        assert!(clickhouse.function_parser("STRUCT").is_none());
    }
}
