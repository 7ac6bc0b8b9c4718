/// Durable wheel record, one row per channel key in the `wheels` table.
#[derive(Debug, sqlx::FromRow)]
pub struct WheelRow {
    pub partition_key: String,
    pub row_key: String,
    /// JSON array of option strings, in wheel order.
    pub options_json: String,
    /// Unix milliseconds of the last write.
    pub timestamp: i64,
    /// Concurrency token, incremented on every write.
    pub version: i64,
}

/// Decoded wheel record handed to the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelRecord {
    pub options: Vec<String>,
    pub version: i64,
    pub updated_at_ms: i64,
}

impl TryFrom<WheelRow> for WheelRecord {
    type Error = serde_json::Error;

    fn try_from(row: WheelRow) -> Result<Self, Self::Error> {
        let options: Option<Vec<String>> = serde_json::from_str(&row.options_json)?;
        Ok(Self {
            options: options.unwrap_or_default(),
            version: row.version,
            updated_at_ms: row.timestamp,
        })
    }
}
