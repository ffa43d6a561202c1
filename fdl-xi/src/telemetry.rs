//! Telemetry document parsing
//!
//! One XML file per controller sample, roughly every 15 minutes. The
//! controller writes `-9999` for a missing reading; that sentinel is turned
//! into `None` here and nowhere else.
//!
//! Element lookup mirrors the controller layout:
//! - `General/Time`, `General/GrowthDay`: ordering and grouping keys
//! - `Headers/TimeStamp`: UTC capture time (`YYYY/MM/DD HH:MM:SS`)
//! - `Light/Active`: light relay state
//! - everything else by element name anywhere in the document

use crate::error::TelemetryError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fdl_common::units::SENTINEL;
use fdl_common::ClockTime;
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};

const HEADER_TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";
const SENTINEL_TEXT: &str = "-9999";

/// One parsed telemetry file
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFile {
    pub path: PathBuf,
    pub file_name: String,

    /// Authoritative time of day of the sample
    pub internal_time: Option<ClockTime>,
    /// Authoritative day-of-flock-life counter
    pub growth_day: Option<i64>,
    /// Capture time from the document header
    pub captured_at: Option<DateTime<Utc>>,

    pub outside_temp_c: Option<f64>,
    pub inside_temp_c: Option<f64>,
    pub light_active: Option<bool>,
    pub egg_room_c: Option<f64>,

    // Running daily totals, reset by the controller at day start
    pub mortality: Option<i64>,
    pub feed_kg: Option<f64>,
    pub water: Option<f64>,
    pub avg_weight_kg: Option<f64>,
}

impl TelemetryFile {
    /// Read and parse a file from disk
    pub fn read(path: &Path) -> Result<Self, TelemetryError> {
        let text = std::fs::read_to_string(path).map_err(|source| TelemetryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse document text; `path` is only used for labelling
    pub fn parse(path: &Path, text: &str) -> Result<Self, TelemetryError> {
        let file_name = file_name_of(path);

        let doc = Document::parse(text).map_err(|e| TelemetryError::Malformed {
            file: file_name.clone(),
            message: e.to_string(),
        })?;
        let fields = Fields {
            doc: &doc,
            file_name: &file_name,
        };

        let internal_time = fields
            .child_text("General", "Time")
            .and_then(|s| ClockTime::parse(s).ok());
        let growth_day = fields
            .child_text("General", "GrowthDay")
            .and_then(|s| s.parse::<i64>().ok());
        let captured_at = fields
            .child_text("Headers", "TimeStamp")
            .and_then(|s| NaiveDateTime::parse_from_str(s, HEADER_TIMESTAMP_FORMAT).ok())
            .map(|naive| naive.and_utc());

        let light_active = match fields.child_text("Light", "Active") {
            Some(value) => Some(fields.integer("Active", value)? != 0),
            None => None,
        };

        Ok(Self {
            path: path.to_path_buf(),
            internal_time,
            growth_day,
            captured_at,
            outside_temp_c: fields.real("OutsideTemperature")?,
            inside_temp_c: fields.real("AverageTemperature")?,
            light_active,
            egg_room_c: fields.real("EggRoom")?,
            mortality: match fields.text("TotalDailyFemaleMortality") {
                Some(value) => Some(fields.integer("TotalDailyFemaleMortality", value)?),
                None => None,
            },
            feed_kg: fields.real("DailyFeed")?,
            water: fields.real("DailyWater")?,
            avg_weight_kg: fields.real("AverageWeight")?,
            file_name,
        })
    }

    /// Both ordering and grouping keys are present
    pub fn is_usable(&self) -> bool {
        self.internal_time.is_some() && self.growth_day.is_some()
    }
}

/// Field lookups over one parsed document
struct Fields<'a, 'input> {
    doc: &'a Document<'input>,
    file_name: &'a str,
}

impl<'a, 'input> Fields<'a, 'input> {
    fn element(&self, name: &str) -> Option<Node<'a, 'input>> {
        self.doc
            .descendants()
            .find(|n| n.is_element() && n.has_tag_name(name))
    }

    /// Text of the first `name` element; `None` when absent, empty or sentinel
    fn text(&self, name: &str) -> Option<&'a str> {
        self.element(name).and_then(present_text)
    }

    /// Text of `child` directly under the first `parent` that has one
    fn child_text(&self, parent: &str, child: &str) -> Option<&'a str> {
        self.doc
            .descendants()
            .filter(|n| n.is_element() && n.has_tag_name(parent))
            .find_map(|p| p.children().find(|c| c.is_element() && c.has_tag_name(child)))
            .and_then(present_text)
    }

    fn real(&self, name: &'static str) -> Result<Option<f64>, TelemetryError> {
        let Some(value) = self.text(name) else {
            return Ok(None);
        };
        let parsed: f64 = value.parse().map_err(|_| self.invalid(name, value))?;
        if parsed == SENTINEL || !parsed.is_finite() {
            return Ok(None);
        }
        Ok(Some(parsed))
    }

    fn integer(&self, name: &'static str, value: &str) -> Result<i64, TelemetryError> {
        value.parse::<i64>().map_err(|_| self.invalid(name, value))
    }

    fn invalid(&self, field: &'static str, value: &str) -> TelemetryError {
        TelemetryError::InvalidField {
            file: self.file_name.to_string(),
            field,
            value: value.to_string(),
        }
    }
}

fn present_text<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    let text = node.text()?.trim();
    if text.is_empty() || text == SENTINEL_TEXT {
        None
    } else {
        Some(text)
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Capture timestamp from a `YYYYMMDDHHMMSS_...xml` file name.
///
/// Coarse: the controller sometimes labels files near midnight with the
/// neighbouring day.
pub fn capture_stamp(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = file_name.split('_').next()?;
    let digits = stamp.get(..14)?;
    NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok()
}

/// Calendar date prefix of a telemetry file name
pub fn capture_date(file_name: &str) -> Option<NaiveDate> {
    let digits = file_name.get(..8)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

/// Whether a directory entry looks like a telemetry file
pub fn is_telemetry_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(general: &str, body: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<Data><Headers><TimeStamp>2025/10/18 11:00:00</TimeStamp></Headers>\
             <General>{}</General>{}</Data>",
            general, body
        )
    }

    fn parse(text: &str) -> Result<TelemetryFile, TelemetryError> {
        TelemetryFile::parse(Path::new("/x/20251018060000_house1.xml"), text)
    }

    #[test]
    fn test_parse_full_document() {
        let text = doc(
            "<Time>06:00</Time><GrowthDay>256</GrowthDay>",
            "<Climate><OutsideTemperature>12.5</OutsideTemperature>\
             <AverageTemperature>21.0</AverageTemperature></Climate>\
             <Light><Active>1</Active></Light>\
             <EggRoom>7.2</EggRoom>\
             <TotalDailyFemaleMortality>3</TotalDailyFemaleMortality>\
             <DailyFeed>100</DailyFeed><DailyWater>310</DailyWater>\
             <AverageWeight>1.9</AverageWeight>",
        );
        let file = parse(&text).unwrap();

        assert_eq!(file.file_name, "20251018060000_house1.xml");
        assert_eq!(file.internal_time.unwrap().to_string(), "06:00");
        assert_eq!(file.growth_day, Some(256));
        assert_eq!(file.captured_at.unwrap().to_rfc3339(), "2025-10-18T11:00:00+00:00");
        assert_eq!(file.outside_temp_c, Some(12.5));
        assert_eq!(file.inside_temp_c, Some(21.0));
        assert_eq!(file.light_active, Some(true));
        assert_eq!(file.egg_room_c, Some(7.2));
        assert_eq!(file.mortality, Some(3));
        assert_eq!(file.feed_kg, Some(100.0));
        assert_eq!(file.water, Some(310.0));
        assert_eq!(file.avg_weight_kg, Some(1.9));
        assert!(file.is_usable());
    }

    #[test]
    fn test_sentinels_become_none() {
        let text = doc(
            "<Time>-9999</Time><GrowthDay>-9999</GrowthDay>",
            "<OutsideTemperature>-9999</OutsideTemperature>\
             <AverageTemperature>-9999.0</AverageTemperature>\
             <Light><Active>-9999</Active></Light>\
             <TotalDailyFemaleMortality>-9999</TotalDailyFemaleMortality>",
        );
        let file = parse(&text).unwrap();

        assert_eq!(file.internal_time, None);
        assert_eq!(file.growth_day, None);
        assert_eq!(file.outside_temp_c, None);
        assert_eq!(file.inside_temp_c, None);
        assert_eq!(file.light_active, None);
        assert_eq!(file.mortality, None);
        assert!(!file.is_usable());
    }

    #[test]
    fn test_missing_elements_become_none() {
        let file = parse(&doc("<Time>06:00</Time>", "")).unwrap();
        assert_eq!(file.growth_day, None);
        assert_eq!(file.light_active, None);
        assert_eq!(file.feed_kg, None);
        assert!(!file.is_usable());
    }

    #[test]
    fn test_zero_is_a_reading() {
        let text = doc(
            "<Time>06:00</Time><GrowthDay>1</GrowthDay>",
            "<OutsideTemperature>0</OutsideTemperature><Light><Active>0</Active></Light>",
        );
        let file = parse(&text).unwrap();
        assert_eq!(file.outside_temp_c, Some(0.0));
        assert_eq!(file.light_active, Some(false));
    }

    #[test]
    fn test_unparsable_time_is_not_an_error() {
        let text = doc("<Time>soon</Time><GrowthDay>x</GrowthDay>", "");
        let file = parse(&text).unwrap();
        assert_eq!(file.internal_time, None);
        assert_eq!(file.growth_day, None);
    }

    #[test]
    fn test_malformed_xml_is_an_error() {
        let err = parse("<Data><General><Time>06:00</General>").unwrap_err();
        assert!(matches!(err, TelemetryError::Malformed { .. }));
        assert!(err.is_quarantinable());
    }

    #[test]
    fn test_non_numeric_reading_is_an_error() {
        let text = doc(
            "<Time>06:00</Time><GrowthDay>1</GrowthDay>",
            "<OutsideTemperature>warm</OutsideTemperature>",
        );
        match parse(&text).unwrap_err() {
            TelemetryError::InvalidField { field, value, .. } => {
                assert_eq!(field, "OutsideTemperature");
                assert_eq!(value, "warm");
            }
            other => panic!("Expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_time_only_read_under_general() {
        let text = "<Data><Alarm><Time>03:00</Time></Alarm>\
                    <General><Time>06:00</Time><GrowthDay>2</GrowthDay></General></Data>";
        let file = parse(text).unwrap();
        assert_eq!(file.internal_time.unwrap().to_string(), "06:00");
    }

    #[test]
    fn test_file_name_helpers() {
        let stamp = capture_stamp("20251018234500_house1.xml").unwrap();
        assert_eq!(stamp.to_string(), "2025-10-18 23:45:00");
        assert_eq!(
            capture_date("20251018234500_house1.xml"),
            NaiveDate::from_ymd_opt(2025, 10, 18)
        );
        assert_eq!(capture_date("notes.xml"), None);
        assert_eq!(capture_stamp("2025.xml"), None);
        assert!(is_telemetry_name("a.XML"));
        assert!(!is_telemetry_name("a.xml.tmp"));
    }
}
