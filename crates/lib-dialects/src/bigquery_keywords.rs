pub(crate) const BIGQUERY_RESERVED_KEYWORDS: &str = "QUALIFY
UNNEST
WINDOW";
