use std::path::PathBuf;

/// Archived snapshot so the table layout never shifts under us.
pub const SOURCE_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";

pub const EXCHANGE_RATE_PATH: &str = "exchange_rate.csv";
pub const CSV_OUTPUT_PATH: &str = "./Largest_banks_data.csv";
pub const DB_PATH: &str = "Banks.db";
pub const TABLE_NAME: &str = "Largest_banks";
pub const JOURNAL_PATH: &str = "code_log.txt";

/// Everything a run needs, built once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// HTML page holding the ranking table.
    pub source_url: String,
    /// Field names the extractor is expected to produce, in order.
    pub expected_fields: Vec<String>,
    /// Local CSV with `Currency,Rate` rows.
    pub rates_path: PathBuf,
    /// Flat-file sink destination.
    pub csv_output_path: PathBuf,
    /// Single-file SQLite database.
    pub db_path: PathBuf,
    /// Relational sink table, replaced on every run.
    pub table_name: String,
    /// Append-only progress log.
    pub journal_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_url: SOURCE_URL.to_string(),
            expected_fields: vec!["Name".to_string(), "MC_USD_Billion".to_string()],
            rates_path: PathBuf::from(EXCHANGE_RATE_PATH),
            csv_output_path: PathBuf::from(CSV_OUTPUT_PATH),
            db_path: PathBuf::from(DB_PATH),
            table_name: TABLE_NAME.to_string(),
            journal_path: PathBuf::from(JOURNAL_PATH),
        }
    }
}
