use std::str::FromStr;
use std::sync::Arc;

use sqlmorph_lib_core::dialects::Dialect;
use sqlmorph_lib_core::dialects::init::DialectKind;
use sqlmorph_lib_core::helpers::IndexMap;
use sqlmorph_lib_core::value::Value;
use sqlmorph_lib_dialects::kind_to_dialect;
use strum::IntoEnumIterator;

use crate::errors::Error;

/// The table of dialects a process works with.
///
/// Built once at start-up and handed to whatever parses or generates SQL.
/// Every dialect in it is already expanded and is shared read-only.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: IndexMap<DialectKind, Arc<Dialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dialect compiled into this build, in [`DialectKind`] order.
    pub fn builtin(config: Option<&Value>) -> Self {
        let mut registry = Self::new();

        for kind in DialectKind::iter() {
            if let Some(dialect) = kind_to_dialect(&kind, config) {
                registry.register(dialect);
            }
        }

        registry
    }

    /// Adds `dialect` under its own kind, returning the one it replaced.
    ///
    /// A dialect that was never expanded is expanded here, so misconfiguration
    /// panics on registration rather than on first use.
    pub fn register(&mut self, mut dialect: Dialect) -> Option<Arc<Dialect>> {
        if !dialect.is_expanded() {
            dialect.expand();
        }

        let kind = dialect.name();
        let previous = self.dialects.insert(kind, Arc::new(dialect));

        log::debug!(
            "registered dialect {}{}",
            kind.name(),
            if previous.is_some() { " (replaced)" } else { "" }
        );

        previous
    }

    pub fn get(&self, kind: DialectKind) -> Option<&Arc<Dialect>> {
        self.dialects.get(&kind)
    }

    /// Looks a dialect up by its case-insensitive name, e.g. `"clickhouse"`.
    pub fn get_by_name(&self, name: &str) -> Result<&Arc<Dialect>, Error> {
        DialectKind::from_str(name)
            .ok()
            .and_then(|kind| self.get(kind))
            .ok_or_else(|| Error::UnknownDialect(name.to_owned()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = DialectKind> + '_ {
        self.dialects.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.dialects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use sqlmorph_lib_core::dialects::init::DialectKind;
    use sqlmorph_lib_dialects::ansi;

    use super::DialectRegistry;
    use crate::errors::Error;
    use crate::parse_one;

    #[test]
    fn empty_registry() {
        let registry = DialectRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.get(DialectKind::Ansi).is_none());
        assert_eq!(
            registry.get_by_name("ansi").unwrap_err(),
            Error::UnknownDialect("ansi".into())
        );
    }

    #[cfg(all(feature = "bigquery", feature = "clickhouse"))]
    #[test]
    fn builtin_holds_every_kind() {
        let registry = DialectRegistry::builtin(None);

        assert_eq!(
            registry.kinds().collect::<Vec<_>>(),
            [DialectKind::Ansi, DialectKind::Bigquery, DialectKind::Clickhouse]
        );
        assert_eq!(
            registry.get_by_name("ClickHouse").unwrap().name(),
            DialectKind::Clickhouse
        );
        assert_eq!(
            registry.get_by_name("oracle").unwrap_err().to_string(),
            "Unknown dialect: oracle"
        );
    }

    #[test]
    fn register_replaces_the_same_kind() {
        let mut registry = DialectRegistry::new();

        assert!(registry.register(ansi::dialect(None)).is_none());
        let previous = registry.register(ansi::dialect(None));

        assert_eq!(previous.map(|dialect| dialect.name()), Some(DialectKind::Ansi));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_expands_raw_dialects() {
        let mut registry = DialectRegistry::new();
        registry.register(ansi::raw_dialect());

        let dialect = registry.get(DialectKind::Ansi).unwrap();
        assert!(dialect.is_expanded());
        assert!(parse_one("SELECT a FROM t", dialect).is_ok());
    }
}
