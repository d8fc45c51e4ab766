use thiserror::Error;

/// Errors raised while reading roster CSVs or writing drill reports.
#[derive(Debug, Error)]
pub enum IngestError {
    /// A row (or the header) is unusable. The whole load is rejected.
    #[error("{file}, line {line}: {reason}")]
    MalformedInput {
        file: String,
        line: u64,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub(crate) fn malformed(file: &str, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            file: file.to_string(),
            line,
            reason: reason.into(),
        }
    }
}
