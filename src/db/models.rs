/// Database row types for the persisted tables. Used by sqlx `query_as` in
/// the validator's read paths.

#[derive(Debug, sqlx::FromRow)]
pub struct HopRow {
    pub tx_hash: String,
    pub log_index: Option<i64>,
    pub hop_index: i64,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LabelDistRow {
    pub flow_source: String,
    pub count: i64,
    pub contracts: i64,
}
