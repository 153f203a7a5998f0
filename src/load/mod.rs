use crate::error::{EtlError, Result};
use crate::transform::EnrichedBankRecord;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

/// Serialize the record set as delimited text, overwriting anything at
/// `path`. The header row carries the five canonical field names and a
/// zero-record set still produces a valid header-only file. No leading
/// row-index column is persisted.
pub fn write_csv(records: &[EnrichedBankRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())?;
    writer.write_record(EnrichedBankRecord::FIELDS)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(records = records.len(), path = %path.as_ref().display(), "wrote CSV");
    Ok(())
}

/// Table names are spliced into SQL text, so only plain identifiers pass.
fn ensure_identifier(name: &str) -> Result<()> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(EtlError::Parse(format!(
            "{:?} is not a valid table name",
            name
        )))
    }
}

/// Replace `table_name` with the record set. Drop-and-recreate plus all
/// inserts run inside one transaction, so readers never observe a partially
/// rewritten table and a second run with the same set leaves identical
/// contents. No row-index column is persisted.
pub fn write_table(
    records: &[EnrichedBankRecord],
    conn: &mut Connection,
    table_name: &str,
) -> Result<()> {
    ensure_identifier(table_name)?;

    let tx = conn.transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};
         CREATE TABLE {table} (
             Name TEXT NOT NULL,
             MC_USD_Billion REAL NOT NULL,
             MC_GBP_Billion REAL NOT NULL,
             MC_EUR_Billion REAL NOT NULL,
             MC_INR_Billion REAL NOT NULL
         );",
        table = table_name
    ))?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} (Name, MC_USD_Billion, MC_GBP_Billion, MC_EUR_Billion, MC_INR_Billion)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            table_name
        ))?;
        for record in records {
            stmt.execute(params![
                record.name,
                record.mc_usd_billion,
                record.mc_gbp_billion,
                record.mc_eur_billion,
                record.mc_inr_billion,
            ])?;
        }
    }
    tx.commit()?;
    info!(records = records.len(), table = table_name, "replaced table");
    Ok(())
}
