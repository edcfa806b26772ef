//! Incremental result ledger
//!
//! Appends each successful batch's output to a plain-text file so a crashed
//! or partially failed run leaves an auditable trail. The ledger is not
//! read back by the pipeline; the final report comes from the in-memory
//! context alone.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const SEPARATOR: &str = "################################################################################";
const FOOTER: &str = "--------------------------------------------------------------------------------";

/// One recorded batch result.
#[derive(Debug, Clone)]
pub struct LedgerEntry<'a> {
    /// 0-based batch index.
    pub index: usize,
    pub total_batches: usize,
    /// 1-based slice range covered by the batch.
    pub slice_start: usize,
    pub slice_end: usize,
    pub text: &'a str,
}

/// Writer for the progressive ledger file.
///
/// The first record truncates whatever a previous run left behind; every
/// later record appends.
pub struct ProgressLedger {
    path: PathBuf,
    started: bool,
}

impl ProgressLedger {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            started: false,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Write one delimited block. Errors are returned so the caller can
    /// log them; a failed write never fails the run.
    pub fn record(&mut self, entry: &LedgerEntry<'_>) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(!self.started)
            .append(self.started)
            .open(&self.path)?;

        writeln!(file, "\n{SEPARATOR}")?;
        writeln!(
            file,
            "### BATCH {} OF {} (slice {} to {}) ###",
            entry.index + 1,
            entry.total_batches,
            entry.slice_start,
            entry.slice_end
        )?;
        writeln!(file, "{SEPARATOR}\n")?;
        writeln!(file, "{}", entry.text.trim())?;
        writeln!(file, "\n{FOOTER}")?;

        self.started = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn entry(index: usize, text: &str) -> LedgerEntry<'_> {
        LedgerEntry {
            index,
            total_batches: 4,
            slice_start: index * 3 + 1,
            slice_end: index * 3 + 3,
            text,
        }
    }

    #[test]
    fn test_first_record_truncates_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");
        fs::write(&path, "stale content from a previous run").unwrap();

        let mut ledger = ProgressLedger::new(path.clone());
        ledger.record(&entry(0, "fresh findings")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("stale content"));
        assert!(content.contains("### BATCH 1 OF 4 (slice 1 to 3) ###"));
        assert!(content.contains("fresh findings"));
    }

    #[test]
    fn test_later_records_append_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.txt");

        let mut ledger = ProgressLedger::new(path.clone());
        ledger.record(&entry(0, "first block")).unwrap();
        ledger.record(&entry(1, "  second block\n")).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let first = content.find("first block").unwrap();
        let second = content.find("second block").unwrap();
        assert!(first < second);
        assert!(content.contains("### BATCH 2 OF 4 (slice 4 to 6) ###"));
        // Text is trimmed before writing.
        assert!(!content.contains("  second block"));
    }
}
