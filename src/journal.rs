use crate::error::Result;
use chrono::Local;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

/// Append-only progress log. One line per recorded event, in the form
/// `YYYY-MM-DD HH:MM:SS : <message>`. The file is created on first use and
/// never truncated, so successive runs accumulate a post-mortem trail.
pub struct Journal {
    path: PathBuf,
}

impl Journal {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one timestamped line. Each call opens and closes the file so a
    /// crash mid-run loses at most the line being written.
    pub fn record(&self, message: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} : {}", timestamp, message)?;
        Ok(())
    }
}
