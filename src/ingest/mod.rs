//! Batch ingestion of analysis artifacts and conversation transcripts.
//!
//! Each converter is a single sequential pass over a directory tree of
//! artifact files (`<root>/<date-bucket>/<file>`), one file at a time.
//! Per-file problems are logged and counted but never abort the batch,
//! and every converter is safe to re-run: rows that already exist are
//! skipped (calls, which upsert, are replaced verbatim).

pub mod artifact;
pub mod base_result;
pub mod conversation;
pub mod issue_result;
pub mod org_metadata;

pub use base_result::import_base_results;
pub use conversation::import_conversations;
pub use issue_result::import_issue_results;
pub use org_metadata::import_org_metadata;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use console::style;
use regex::Regex;

/// Filename suffix of JSON analysis artifacts.
pub const ANALYSIS_SUFFIX: &str = "_analysis.json";

/// Filename suffix of conversation transcripts.
pub const TRANSCRIPT_SUFFIX: &str = ".txt";

/// Extract the call id (lowercase UUID) from an artifact filename.
///
/// The UUID may appear anywhere in the name, e.g.
/// `alice_alice_queue_5551234_20250101_<uuid>_analysis.json`.
pub fn call_id_from_filename(filename: &str) -> Option<String> {
    static UUID_RE: OnceLock<Regex> = OnceLock::new();
    let re = UUID_RE.get_or_init(|| {
        Regex::new(r"[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}")
            .expect("valid uuid pattern")
    });
    re.find(filename).map(|m| m.as_str().to_string())
}

/// Collect artifact files under `<root>/<date-bucket>/`, sorted by path.
///
/// Entries directly under the root that are not directories are ignored,
/// matching the date-bucket layout produced by the analysis pipeline.
/// A missing root is a fatal error (it aborts before the per-file loop).
pub fn scan_artifacts(root: &Path, suffix: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for bucket in std::fs::read_dir(root)? {
        let bucket = bucket?;
        if !bucket.file_type()?.is_dir() {
            continue;
        }
        for entry in std::fs::read_dir(bucket.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if name.to_string_lossy().ends_with(suffix) {
                files.push(entry.path());
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Outcome counters for one converter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows written to the database.
    pub imported: usize,
    /// Files deliberately left alone (duplicates, non-issue calls, ...).
    pub skipped: usize,
    /// Files that could not be processed.
    pub failed: usize,
}

impl ImportSummary {
    /// Print the end-of-run summary.
    pub fn report(&self, what: &str) {
        println!("\n{} Import complete ({}):", style("✓").green(), what);
        println!("  Imported: {}", style(self.imported).green());
        println!("  Skipped:  {}", style(self.skipped).yellow());
        println!("  Failed:   {}", style(self.failed).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_id_extraction() {
        assert_eq!(
            call_id_from_filename(
                "alice_alice_queue_5551234_20250101_123e4567-e89b-12d3-a456-426614174000_analysis.json"
            )
            .as_deref(),
            Some("123e4567-e89b-12d3-a456-426614174000")
        );

        // No UUID in the name
        assert_eq!(call_id_from_filename("notes_analysis.json"), None);
        // Uppercase hex is not a canonical call id
        assert_eq!(
            call_id_from_filename("123E4567-E89B-12D3-A456-426614174000_analysis.json"),
            None
        );
    }

    #[test]
    fn test_scan_artifacts_walks_date_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let bucket = dir.path().join("2025-01-01");
        std::fs::create_dir(&bucket).unwrap();
        std::fs::write(bucket.join("a_analysis.json"), "[]").unwrap();
        std::fs::write(bucket.join("b.txt"), "x").unwrap();
        // File directly under the root is not part of any bucket
        std::fs::write(dir.path().join("stray_analysis.json"), "[]").unwrap();

        let found = scan_artifacts(dir.path(), ANALYSIS_SUFFIX).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("2025-01-01/a_analysis.json"));

        let texts = scan_artifacts(dir.path(), TRANSCRIPT_SUFFIX).unwrap();
        assert_eq!(texts.len(), 1);
    }

    #[test]
    fn test_scan_missing_root_is_fatal() {
        assert!(scan_artifacts(Path::new("/nonexistent/callsight"), ANALYSIS_SUFFIX).is_err());
    }
}
