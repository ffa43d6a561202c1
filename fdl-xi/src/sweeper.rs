//! Retention sweep of the telemetry directory
//!
//! Deletes XML files whose file name date is on or before
//! `today - retention_days`. Quarantined files live in their own directory and
//! are never touched.

use crate::telemetry::{capture_date, file_name_of, is_telemetry_name};
use chrono::{Days, NaiveDate};
use fdl_common::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
    /// Newest file date deleted; `None` when sweeping is disabled
    pub cutoff: Option<NaiveDate>,
    pub deleted: Vec<PathBuf>,
    /// Files that matched but could not be removed
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    xml_dir: PathBuf,
    retention_days: u32,
}

impl RetentionSweeper {
    pub fn new(xml_dir: impl Into<PathBuf>, retention_days: u32) -> Self {
        Self {
            xml_dir: xml_dir.into(),
            retention_days,
        }
    }

    /// Oldest date still kept is `today - retention_days + 1`
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        if self.retention_days == 0 {
            return None;
        }
        today.checked_sub_days(Days::new(u64::from(self.retention_days)))
    }

    pub fn sweep(&self, today: NaiveDate) -> Result<SweepReport> {
        let Some(cutoff) = self.cutoff(today) else {
            debug!("Retention sweep disabled");
            return Ok(SweepReport::default());
        };

        let mut report = SweepReport {
            cutoff: Some(cutoff),
            ..Default::default()
        };

        for entry in std::fs::read_dir(&self.xml_dir)? {
            let path = entry?.path();
            let name = file_name_of(&path);
            if !path.is_file() || !is_telemetry_name(&name) {
                continue;
            }
            let Some(date) = capture_date(&name) else {
                continue;
            };
            if date > cutoff {
                continue;
            }

            match std::fs::remove_file(&path) {
                Ok(()) => report.deleted.push(path),
                Err(e) => {
                    warn!("Failed to delete {}: {}", path.display(), e);
                    report.failed += 1;
                }
            }
        }

        report.deleted.sort();
        info!(
            "Deleted {} XML files dated {} or earlier from {}",
            report.deleted.len(),
            cutoff,
            self.xml_dir.display()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_deletes_files_at_or_before_cutoff() {
        let temp = TempDir::new().unwrap();
        for name in [
            "20251015230000_h.xml",
            "20251016120000_h.xml",
            "20251017000500_h.xml",
            "20251018000500_h.xml",
            "notes.txt",
            "readme.xml",
        ] {
            std::fs::write(temp.path().join(name), b"x").unwrap();
        }

        let sweeper = RetentionSweeper::new(temp.path(), 2);
        let report = sweeper.sweep(date("2025-10-18")).unwrap();

        assert_eq!(report.cutoff, Some(date("2025-10-16")));
        assert_eq!(report.deleted.len(), 2);
        assert!(!temp.path().join("20251016120000_h.xml").exists());
        assert!(temp.path().join("20251017000500_h.xml").exists());
        assert!(temp.path().join("notes.txt").exists());
        assert!(temp.path().join("readme.xml").exists());
    }

    #[test]
    fn test_zero_retention_disables_sweep() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("20200101000000_h.xml"), b"x").unwrap();

        let report = RetentionSweeper::new(temp.path(), 0)
            .sweep(date("2025-10-18"))
            .unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(temp.path().join("20200101000000_h.xml").exists());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp = TempDir::new().unwrap();
        let sweeper = RetentionSweeper::new(temp.path().join("gone"), 2);
        assert!(sweeper.sweep(date("2025-10-18")).is_err());
    }
}
