//! Filesystem-backed domain collector.

use crossweave_domain::{CollectError, DomainCollector, RawPayload};
use std::fs;
use std::path::PathBuf;

/// Collector that drains candidate payloads from a spool directory
///
/// Layout is one subdirectory per domain, each `.json` file holding a single
/// [`RawPayload`]:
///
/// ```text
/// spool/
///   technology_news/
///     2026-02-11-chip-announcement.json
///     2026-02-11-funding-round.json
///   scientific_research/
///     arxiv-2401-01234.json
/// ```
///
/// Parsed files are deleted, so a payload is integrated once. Malformed files
/// stay in place and are logged each pass for the operator to fix or remove.
/// A domain without a subdirectory simply yields nothing.
pub struct SpoolCollector {
    root: PathBuf,
}

impl SpoolCollector {
    /// Collector rooted at the given spool directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl DomainCollector for SpoolCollector {
    fn fetch_candidates(
        &mut self,
        domain: &str,
        limit: usize,
    ) -> Result<Vec<RawPayload>, CollectError> {
        let dir = self.root.join(domain);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir)
            .map_err(|e| CollectError::Unavailable(format!("cannot read {}: {}", dir.display(), e)))?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        // Stable intake order regardless of directory iteration order
        files.sort();

        let mut payloads = Vec::new();
        for path in files {
            if payloads.len() >= limit {
                break;
            }

            let contents = fs::read_to_string(&path).map_err(|e| {
                CollectError::Unavailable(format!("cannot read {}: {}", path.display(), e))
            })?;
            match serde_json::from_str::<RawPayload>(&contents) {
                Ok(payload) => {
                    fs::remove_file(&path).map_err(|e| {
                        CollectError::Unavailable(format!(
                            "cannot consume {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    payloads.push(payload);
                }
                Err(e) => {
                    tracing::warn!(file = %path.display(), error = %e, "skipping malformed payload");
                }
            }
        }

        Ok(payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_payload(dir: &std::path::Path, name: &str, content: &str) {
        let payload = serde_json::json!({ "content": content, "confidence_hint": 0.8 });
        fs::write(dir.join(name), payload.to_string()).unwrap();
    }

    #[test]
    fn test_fetch_consumes_files() {
        let spool = tempfile::tempdir().unwrap();
        let domain_dir = spool.path().join("technology_news");
        fs::create_dir(&domain_dir).unwrap();
        write_payload(&domain_dir, "a.json", "first observation");
        write_payload(&domain_dir, "b.json", "second observation");

        let mut collector = SpoolCollector::new(spool.path());
        let payloads = collector.fetch_candidates("technology_news", 10).unwrap();

        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].content, "first observation");
        assert_eq!(fs::read_dir(&domain_dir).unwrap().count(), 0);

        // Second fetch finds nothing
        let payloads = collector.fetch_candidates("technology_news", 10).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_missing_domain_dir_yields_nothing() {
        let spool = tempfile::tempdir().unwrap();
        let mut collector = SpoolCollector::new(spool.path());
        assert!(collector.fetch_candidates("academic_papers", 10).unwrap().is_empty());
    }

    #[test]
    fn test_limit_leaves_excess_files() {
        let spool = tempfile::tempdir().unwrap();
        let domain_dir = spool.path().join("technology_news");
        fs::create_dir(&domain_dir).unwrap();
        for i in 0..5 {
            write_payload(&domain_dir, &format!("{}.json", i), &format!("claim {}", i));
        }

        let mut collector = SpoolCollector::new(spool.path());
        let payloads = collector.fetch_candidates("technology_news", 3).unwrap();

        assert_eq!(payloads.len(), 3);
        assert_eq!(fs::read_dir(&domain_dir).unwrap().count(), 2);
    }

    #[test]
    fn test_malformed_file_is_kept() {
        let spool = tempfile::tempdir().unwrap();
        let domain_dir = spool.path().join("technology_news");
        fs::create_dir(&domain_dir).unwrap();
        fs::write(domain_dir.join("broken.json"), "{ not json").unwrap();
        write_payload(&domain_dir, "ok.json", "valid claim");

        let mut collector = SpoolCollector::new(spool.path());
        let payloads = collector.fetch_candidates("technology_news", 10).unwrap();

        assert_eq!(payloads.len(), 1);
        assert!(domain_dir.join("broken.json").exists());
        assert!(!domain_dir.join("ok.json").exists());
    }

    #[test]
    fn test_non_json_files_ignored() {
        let spool = tempfile::tempdir().unwrap();
        let domain_dir = spool.path().join("technology_news");
        fs::create_dir(&domain_dir).unwrap();
        fs::write(domain_dir.join("README.txt"), "notes").unwrap();

        let mut collector = SpoolCollector::new(spool.path());
        assert!(collector.fetch_candidates("technology_news", 10).unwrap().is_empty());
        assert!(domain_dir.join("README.txt").exists());
    }
}
