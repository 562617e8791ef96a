pub(crate) const CLICKHOUSE_RESERVED_KEYWORDS: &str = "FINAL";
