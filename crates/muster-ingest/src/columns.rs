//! Header lookup shared by the roster and schedule readers.

use std::collections::HashMap;

use csv::StringRecord;

use crate::error::IngestError;

/// Column positions keyed by normalized header name.
///
/// Headers are matched case-insensitively with surrounding whitespace (and a
/// leading byte-order mark) removed.
pub(crate) struct Columns {
    file: String,
    index: HashMap<String, usize>,
}

impl Columns {
    pub(crate) fn from_headers(
        file: &str,
        headers: &StringRecord,
        required: &[&str],
    ) -> Result<Self, IngestError> {
        let mut index = HashMap::with_capacity(headers.len());
        for (pos, raw) in headers.iter().enumerate() {
            let name = normalize(raw);
            if name.is_empty() {
                continue;
            }
            if index.insert(name.clone(), pos).is_some() {
                return Err(IngestError::malformed(
                    file,
                    1,
                    format!("duplicate column '{name}'"),
                ));
            }
        }
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !index.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::malformed(
                file,
                1,
                format!("missing required column(s): {}", missing.join(", ")),
            ));
        }
        Ok(Self {
            file: file.to_string(),
            index,
        })
    }

    pub(crate) const fn row<'a>(&'a self, record: &'a StringRecord, line: u64) -> Row<'a> {
        Row {
            columns: self,
            record,
            line,
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_ascii_lowercase()
}

/// One data row with its 1-based line number in the source file.
pub(crate) struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
    line: u64,
}

impl Row<'_> {
    pub(crate) const fn line(&self) -> u64 {
        self.line
    }

    fn get(&self, name: &str) -> &str {
        self.columns
            .index
            .get(name)
            .and_then(|&pos| self.record.get(pos))
            .map_or("", str::trim)
    }

    /// A non-blank value for a required column.
    pub(crate) fn required(&self, name: &str) -> Result<&str, IngestError> {
        let value = self.get(name);
        if value.is_empty() {
            return Err(self.malformed(format!("'{name}' is blank")));
        }
        Ok(value)
    }

    /// The value of an optional column, empty when absent.
    pub(crate) fn optional(&self, name: &str) -> String {
        self.get(name).to_string()
    }

    pub(crate) fn malformed(&self, reason: impl Into<String>) -> IngestError {
        IngestError::malformed(&self.columns.file, self.line, reason)
    }
}
