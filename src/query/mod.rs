use crate::error::{EtlError, Result};
use rusqlite::{types::ValueRef, Connection};
use std::fmt;
use tracing::debug;

/// Column names and stringified rows from one read-only statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if cell.len() > widths[i] {
                    widths[i] = cell.len();
                }
            }
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, "  ")?;
            }
            write!(f, "{:width$}", column, width = widths[i])?;
        }
        writeln!(f)?;
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, "  ")?;
                }
                write!(f, "{:width$}", cell, width = widths[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// The three fixed statements run after the relational load, in order.
pub fn bank_queries(table_name: &str) -> [String; 3] {
    [
        format!("SELECT * FROM {table_name}"),
        format!("SELECT AVG(MC_GBP_Billion) FROM {table_name}"),
        format!("SELECT Name FROM {table_name} LIMIT 5"),
    ]
}

/// Execute one read-only statement. A missing table or column is a fatal
/// `Query` error, never swallowed.
pub fn run_query(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let query_err = |source| EtlError::Query {
        sql: sql.to_string(),
        source,
    };

    let mut stmt = conn.prepare(sql).map_err(|e| query_err(e))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let mut rows = Vec::new();
    let mut raw = stmt.query([]).map_err(|e| query_err(e))?;
    while let Some(row) = raw.next().map_err(|e| query_err(e))? {
        let mut cells = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let cell = match row.get_ref(i).map_err(|e| query_err(e))? {
                ValueRef::Null => "NULL".to_string(),
                ValueRef::Integer(v) => v.to_string(),
                ValueRef::Real(v) => v.to_string(),
                ValueRef::Text(v) => String::from_utf8_lossy(v).into_owned(),
                ValueRef::Blob(v) => format!("<{} byte blob>", v.len()),
            };
            cells.push(cell);
        }
        rows.push(cells);
    }
    debug!(sql, rows = rows.len(), "query complete");
    Ok(QueryResult { columns, rows })
}
