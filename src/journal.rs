use chrono::Utc;
use huffpack::Layout;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// One line of the action journal.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub timestamp: String,
    pub action: String,
    pub input: String,
    pub output: String,
    pub layout: Layout,
    pub input_bytes: u64,
    pub output_bytes: u64,
}

impl JournalEntry {
    pub fn new(
        action: &str,
        input: &Path,
        output: &Path,
        layout: Layout,
        input_bytes: u64,
        output_bytes: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            action: action.to_string(),
            input: input.display().to_string(),
            output: output.display().to_string(),
            layout,
            input_bytes,
            output_bytes,
        }
    }
}

/// Appends `entry` to the journal at `path` as one JSON line.
pub fn record(path: &Path, entry: &JournalEntry) -> io::Result<()> {
    let json = serde_json::to_string(entry).map_err(io::Error::other)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(file, "{}", json)
}
