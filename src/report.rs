//! Final report persistence
//!
//! The final report is the last clinical context verbatim, with a small
//! header. It is written by the caller level, not the orchestrator, and
//! is independent of the incremental ledger.

use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn write_report(
    path: &Path,
    total_images: usize,
    clinical_context: &str,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "PROGRESSIVE CT ANALYSIS REPORT")?;
    writeln!(file, "TOTAL SLICES: {total_images}")?;
    writeln!(file, "{}", "=".repeat(60))?;
    writeln!(file)?;
    writeln!(file, "{clinical_context}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_header_and_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        write_report(&path, 42, "diffuse findings across all systems").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("PROGRESSIVE CT ANALYSIS REPORT\nTOTAL SLICES: 42\n"));
        assert!(content.contains("diffuse findings across all systems"));
    }
}
