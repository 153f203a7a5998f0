use thiserror::Error;

/// Errors a pipeline run can fail with. No stage recovers from another
/// stage's failure; every variant aborts the remainder of the run.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse source document: {0}")]
    Parse(String),

    #[error("market cap {value:?} for {name:?} is not numeric")]
    Cast { name: String, value: String },

    #[error("exchange rate table has no entry for {0}")]
    RateLookup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database connection error: {0}")]
    Connection(#[from] rusqlite::Error),

    #[error("query {sql:?} failed: {source}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },
}

pub type Result<T> = std::result::Result<T, EtlError>;
