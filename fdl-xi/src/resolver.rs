//! Day and file resolution
//!
//! File names carry the capture time, which the controller gets wrong for a
//! few files around midnight. The content is authoritative: the growth day
//! most common among files *named* for the target date decides the logical
//! day, and every file in the directory carrying that growth day belongs to
//! it, whatever its name says.
//!
//! The directory is parsed once per run. Unparsable files named for the
//! target date are quarantined; unparsable files of other dates stay in place,
//! since the controller may still be writing them.

use crate::error::{AggregateError, NoDataReason, TelemetryError};
use crate::quarantine::Quarantine;
use crate::telemetry::{capture_date, file_name_of, is_telemetry_name, TelemetryFile};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Authoritative file set of one logical day
#[derive(Debug, Clone)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    pub growth_day: i64,
    /// Sorted by internal time, then file name
    pub files: Vec<TelemetryFile>,
    /// Parsed files whose name carries the target date
    pub candidate_count: usize,
    /// Candidates carrying the chosen growth day
    pub mode_count: usize,
    pub confidence: ModeConfidence,
    /// Files moved to quarantine during this scan
    pub quarantined: Vec<PathBuf>,
}

/// How well the chosen growth day is backed by the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeConfidence {
    Clear,
    /// Another growth day has the same count
    Tied,
    /// Fewer than half of the candidates agree
    Weak,
}

impl ResolvedDay {
    /// Chronologically last file; source of the running daily totals
    pub fn last(&self) -> Option<&TelemetryFile> {
        self.files.last()
    }
}

/// Resolves target dates against one telemetry directory
pub struct DayResolver<'a> {
    xml_dir: &'a Path,
    quarantine: &'a Quarantine,
}

impl<'a> DayResolver<'a> {
    pub fn new(xml_dir: &'a Path, quarantine: &'a Quarantine) -> Self {
        Self {
            xml_dir,
            quarantine,
        }
    }

    pub fn resolve(&self, date: NaiveDate) -> Result<ResolvedDay, AggregateError> {
        let (parsed, failures) = self.scan()?;
        let quarantined = self.quarantine_candidates(date, failures);

        let candidates: Vec<&TelemetryFile> = parsed
            .iter()
            .filter(|f| capture_date(&f.file_name) == Some(date))
            .collect();

        if candidates.is_empty() {
            return Err(AggregateError::NoData {
                date,
                reason: NoDataReason::NoCandidates,
            });
        }
        let candidate_count = candidates.len();

        let mut tally: BTreeMap<i64, usize> = BTreeMap::new();
        for file in &candidates {
            match file.growth_day {
                Some(day) => *tally.entry(day).or_default() += 1,
                None => debug!("Discarding {}: no growth day", file.file_name),
            }
        }

        let Some((growth_day, mode_count)) = pick_mode(&tally) else {
            return Err(AggregateError::NoData {
                date,
                reason: NoDataReason::NoGrowthDay,
            });
        };

        let confidence = mode_confidence(&tally, mode_count);
        match confidence {
            ModeConfidence::Tied => warn!(
                "Growth day for {} is tied across {:?}, using {}",
                date, tally, growth_day
            ),
            ModeConfidence::Weak => warn!(
                "Growth day {} for {} backed by only {} of {} candidates",
                growth_day,
                date,
                mode_count,
                tally.values().sum::<usize>()
            ),
            ModeConfidence::Clear => {}
        }

        let mut files: Vec<TelemetryFile> = parsed
            .into_iter()
            .filter(|f| f.growth_day == Some(growth_day))
            .filter(|f| {
                if f.internal_time.is_none() {
                    debug!("Discarding {}: no internal time", f.file_name);
                }
                f.internal_time.is_some()
            })
            .collect();

        if files.is_empty() {
            return Err(AggregateError::NoData {
                date,
                reason: NoDataReason::NoValidTime,
            });
        }

        files.sort_by(|a, b| {
            a.internal_time
                .cmp(&b.internal_time)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });

        let relabeled = files
            .iter()
            .filter(|f| capture_date(&f.file_name) != Some(date))
            .count();
        info!(
            "Resolved {} to growth day {}: {} files ({} named for another date)",
            date,
            growth_day,
            files.len(),
            relabeled
        );

        Ok(ResolvedDay {
            date,
            growth_day,
            files,
            candidate_count,
            mode_count,
            confidence,
            quarantined,
        })
    }

    /// Parse every telemetry file in the directory.
    ///
    /// Returns the parsed files and the quarantinable failures; read errors
    /// are logged and dropped.
    fn scan(&self) -> Result<(Vec<TelemetryFile>, Vec<(PathBuf, TelemetryError)>), AggregateError> {
        let dir_error = |source: std::io::Error| AggregateError::Directory {
            path: self.xml_dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(self.xml_dir).map_err(dir_error)? {
            let entry = entry.map_err(dir_error)?;
            let path = entry.path();
            if path.is_file() && is_telemetry_name(&file_name_of(&path)) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut parsed = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();

        for path in paths {
            match TelemetryFile::read(&path) {
                Ok(file) => parsed.push(file),
                Err(e) if e.is_quarantinable() => failures.push((path, e)),
                Err(e) => warn!("Skipping file: {}", e),
            }
        }

        Ok((parsed, failures))
    }

    /// Move unparsable candidates of `date` out of the directory
    fn quarantine_candidates(
        &self,
        date: NaiveDate,
        failures: Vec<(PathBuf, TelemetryError)>,
    ) -> Vec<PathBuf> {
        let mut quarantined = Vec::new();

        for (path, e) in failures {
            if capture_date(&file_name_of(&path)) != Some(date) {
                debug!("Leaving unparsable {} in place: {}", path.display(), e);
                continue;
            }

            warn!("{}", e);
            match self.quarantine.isolate(&path) {
                Ok(target) => {
                    warn!("Quarantined {} to {}", path.display(), target.display());
                    quarantined.push(target);
                }
                Err(move_err) => error!("Failed to quarantine {}: {}", path.display(), move_err),
            }
        }

        quarantined
    }
}

/// Most frequent growth day; ties go to the smaller value
fn pick_mode(tally: &BTreeMap<i64, usize>) -> Option<(i64, usize)> {
    let mut best: Option<(i64, usize)> = None;
    for (&day, &count) in tally {
        // ascending keys, strict comparison keeps the smaller day on ties
        if best.map_or(true, |(_, n)| count > n) {
            best = Some((day, count));
        }
    }
    best
}

fn mode_confidence(tally: &BTreeMap<i64, usize>, mode_count: usize) -> ModeConfidence {
    let voters: usize = tally.values().sum();
    if tally.values().filter(|&&n| n == mode_count).count() > 1 {
        ModeConfidence::Tied
    } else if mode_count * 2 < voters {
        ModeConfidence::Weak
    } else {
        ModeConfidence::Clear
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_mode_prefers_majority() {
        let tally = BTreeMap::from([(255, 2), (256, 90), (257, 3)]);
        assert_eq!(pick_mode(&tally), Some((256, 90)));
    }

    #[test]
    fn test_pick_mode_tie_takes_smaller_day() {
        let tally = BTreeMap::from([(257, 4), (256, 4)]);
        assert_eq!(pick_mode(&tally), Some((256, 4)));
    }

    #[test]
    fn test_mode_confidence() {
        let clear = BTreeMap::from([(255, 1), (256, 90)]);
        assert_eq!(mode_confidence(&clear, 90), ModeConfidence::Clear);

        let tied = BTreeMap::from([(256, 2), (257, 2)]);
        assert_eq!(mode_confidence(&tied, 2), ModeConfidence::Tied);

        let weak = BTreeMap::from([(255, 2), (256, 1), (257, 1), (258, 1)]);
        assert_eq!(mode_confidence(&weak, 2), ModeConfidence::Weak);

        // exactly half is enough
        let half = BTreeMap::from([(255, 2), (256, 1), (257, 1)]);
        assert_eq!(mode_confidence(&half, 2), ModeConfidence::Clear);
    }

    #[test]
    fn test_pick_mode_empty() {
        assert_eq!(pick_mode(&BTreeMap::new()), None);
    }
}
