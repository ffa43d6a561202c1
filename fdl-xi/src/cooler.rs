//! Closest-time egg cooler reading

use crate::telemetry::TelemetryFile;
use fdl_common::units::c_to_f_raw;
use fdl_common::ClockTime;

#[derive(Debug, Clone, PartialEq)]
pub struct CoolerReading {
    /// Internal time of the chosen file, rounded to the quarter hour
    pub time: ClockTime,
    pub temp_f: f64,
    pub file_name: String,
}

/// Egg room reading of the file closest to `target` within `tolerance`
/// minutes. Equal distances go to the earlier internal time. The window
/// does not wrap around midnight.
///
/// The closest file is chosen on time alone; when it carries no egg room
/// reading the result is `None`, never a reading from a further file.
pub fn closest_reading(
    files: &[TelemetryFile],
    target: ClockTime,
    tolerance: u16,
) -> Option<CoolerReading> {
    files
        .iter()
        .filter_map(|f| Some((f.internal_time?, f)))
        .map(|(time, f)| (time.abs_diff_minutes(target), time, f))
        .filter(|(diff, ..)| *diff <= tolerance)
        .min_by_key(|(diff, time, _)| (*diff, *time))
        .and_then(|(_, time, f)| {
            Some(CoolerReading {
                time: time.round_to_quarter(),
                temp_f: c_to_f_raw(f.egg_room_c?),
                file_name: f.file_name.clone(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(time: &str, egg_room_c: Option<f64>) -> TelemetryFile {
        TelemetryFile {
            path: PathBuf::from(format!("/x/{}.xml", time)),
            file_name: format!("{}.xml", time),
            internal_time: Some(ClockTime::parse(time).unwrap()),
            growth_day: Some(256),
            captured_at: None,
            outside_temp_c: None,
            inside_temp_c: None,
            light_active: None,
            egg_room_c,
            mortality: None,
            feed_kg: None,
            water: None,
            avg_weight_kg: None,
        }
    }

    fn six() -> ClockTime {
        ClockTime::parse("06:00").unwrap()
    }

    #[test]
    fn test_picks_smallest_difference() {
        let files = [file("05:35", Some(5.0)), file("06:20", Some(10.0))];
        let reading = closest_reading(&files, six(), 30).unwrap();
        assert_eq!(reading.time.to_string(), "06:15");
        assert_eq!(reading.temp_f, 50.0);
        assert_eq!(reading.file_name, "06:20.xml");
    }

    #[test]
    fn test_nothing_within_tolerance() {
        let files = [file("05:00", Some(5.0)), file("07:00", Some(5.0))];
        assert_eq!(closest_reading(&files, six(), 30), None);
    }

    #[test]
    fn test_tie_goes_to_earlier_time() {
        let files = [file("06:10", Some(10.0)), file("05:50", Some(5.0))];
        let reading = closest_reading(&files, six(), 30).unwrap();
        assert_eq!(reading.file_name, "05:50.xml");
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let files = [file("06:30", Some(0.0))];
        assert!(closest_reading(&files, six(), 30).is_some());
    }

    #[test]
    fn test_closest_file_without_reading_gives_none() {
        let files = [file("06:00", None), file("06:25", Some(7.0))];
        assert_eq!(closest_reading(&files, six(), 30), None);
    }

    #[test]
    fn test_further_file_without_reading_does_not_matter() {
        let files = [file("05:40", None), file("06:05", Some(1.0))];
        let reading = closest_reading(&files, six(), 30).unwrap();
        assert_eq!(reading.file_name, "06:05.xml");
    }
}
