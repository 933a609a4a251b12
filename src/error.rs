use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the extraction and reconciliation commands.
/// Field-level extraction misses are not errors; they degrade to
/// defaults or sentinels with a warning.
#[derive(Error, Debug)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("checklist table not found")]
    TableNotFound,

    #[error("checklist table has no data rows")]
    TableEmpty,

    #[error("required column not found: {0}")]
    MissingColumn(&'static str),

    #[error("no placeholders found in checklist")]
    NoPlaceholders,

    #[error("no changes made to template (no placeholders found or already processed)")]
    NothingToUpdate,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(Error::TableNotFound.to_string(), "checklist table not found");
        assert_eq!(
            Error::MissingColumn("ID").to_string(),
            "required column not found: ID"
        );
    }
}
