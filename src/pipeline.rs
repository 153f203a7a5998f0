use crate::{
    config::PipelineConfig,
    error::{EtlError, Result},
    extract,
    journal::Journal,
    load, query,
    transform::{self, ExchangeRates},
};
use reqwest::Client;
use rusqlite::Connection;
use std::fmt;
use tracing::{error, info};

/// Where a run currently is. Strictly linear; `Done` and `Failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Extracting,
    Transforming,
    LoadingCsv,
    LoadingDb,
    Querying,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Extracting => "extracting",
            Stage::Transforming => "transforming",
            Stage::LoadingCsv => "loading-csv",
            Stage::LoadingDb => "loading-db",
            Stage::Querying => "querying",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Runs every stage in order, journaling progress before and after each one.
/// Fail-fast: the first error aborts the remainder of the run, leaving the
/// journal with entries up to the last completed stage.
pub struct Pipeline {
    config: PipelineConfig,
    journal: Journal,
    stage: Stage,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let journal = Journal::new(&config.journal_path);
        Self {
            config,
            journal,
            stage: Stage::Idle,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub async fn run(&mut self) -> Result<()> {
        match self.execute().await {
            Ok(()) => {
                self.stage = Stage::Done;
                info!("pipeline complete");
                Ok(())
            }
            Err(e) => {
                self.stage = Stage::Failed;
                error!("pipeline failed: {e}");
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<()> {
        let client = Client::new();

        self.enter(
            Stage::Extracting,
            "Preliminaries complete. Initiating ETL process",
        )?;
        let records = extract::extract(
            &client,
            &self.config.source_url,
            &self.config.expected_fields,
        )
        .await?;

        self.enter(
            Stage::Transforming,
            "Data extraction complete. Initiating Transformation process",
        )?;
        let rates = ExchangeRates::load(&self.config.rates_path)?;
        let records = transform::transform(records, &rates)?;

        self.enter(
            Stage::LoadingCsv,
            "Data transformation complete. Initiating loading process",
        )?;
        load::write_csv(&records, &self.config.csv_output_path)?;
        self.journal.record("Data saved to CSV file")?;

        self.stage = Stage::LoadingDb;
        let mut conn = Connection::open(&self.config.db_path)?;
        self.journal.record("SQL Connection initiated.")?;
        load::write_table(&records, &mut conn, &self.config.table_name)?;

        self.enter(
            Stage::Querying,
            "Data loaded to Database as table. Running the query",
        )?;
        for sql in query::bank_queries(&self.config.table_name) {
            println!("{sql}");
            let result = query::run_query(&conn, &sql)?;
            print!("{result}");
            self.journal.record("SQL Query")?;
        }

        // Explicit close on the success path; failure paths rely on Drop.
        conn.close().map_err(|(_, e)| EtlError::Connection(e))?;
        self.journal.record("SQL Connection Close")?;
        Ok(())
    }

    fn enter(&mut self, stage: Stage, message: &str) -> Result<()> {
        self.stage = stage;
        info!(stage = %stage, "{message}");
        self.journal.record(message)
    }
}
