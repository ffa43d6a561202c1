//! Light cycle state machine
//!
//! Fed the light relay flag of each file in chronological order. One on/off
//! cycle per day is expected; anything after the first lights-off is ignored.
//!
//! A day whose first flag is already on keeps being tracked: lights-on stays
//! empty with [`LightAnomaly::AlreadyOnAtStart`], but a later off transition
//! still records lights-off rather than abandoning the day at the anomaly.
//!
//! ```text
//! Unknown --inactive--> Off --active--> On --inactive--> Complete
//!    |                                  ^
//!    +--active (already on at start)----+
//! ```

use fdl_common::db::LightAnomaly;
use fdl_common::ClockTime;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    /// No flag observed yet
    Unknown,
    On,
    Off,
    /// Lights-off recorded
    Complete,
}

/// Derived light schedule, times rounded to the quarter hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LightSchedule {
    pub lights_on: Option<ClockTime>,
    pub lights_off: Option<ClockTime>,
    pub anomaly: Option<LightAnomaly>,
}

#[derive(Debug, Clone)]
pub struct LightCycle {
    state: LightState,
    lights_on: Option<ClockTime>,
    lights_off: Option<ClockTime>,
    anomaly: Option<LightAnomaly>,
}

impl Default for LightCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl LightCycle {
    pub fn new() -> Self {
        Self {
            state: LightState::Unknown,
            lights_on: None,
            lights_off: None,
            anomaly: None,
        }
    }

    pub fn state(&self) -> LightState {
        self.state
    }

    /// Feed one observation. `None` (no flag in the file) leaves the state
    /// untouched.
    pub fn observe(&mut self, time: ClockTime, active: Option<bool>) {
        let Some(active) = active else {
            return;
        };

        self.state = match (self.state, active) {
            (LightState::Unknown, true) => {
                debug!("Light already on at {}", time);
                self.anomaly = Some(LightAnomaly::AlreadyOnAtStart);
                LightState::On
            }
            (LightState::Unknown, false) => LightState::Off,
            (LightState::Off, true) => {
                self.lights_on = Some(time);
                LightState::On
            }
            (LightState::On, false) => {
                self.lights_off = Some(time);
                LightState::Complete
            }
            (state, _) => state,
        };
    }

    /// End of day: flag what is missing and round the recorded times
    pub fn finish(self) -> LightSchedule {
        let anomaly = self.anomaly.or(match self.state {
            LightState::On => Some(LightAnomaly::NeverOff),
            _ if self.lights_on.is_none() => Some(LightAnomaly::NeverOn),
            _ => None,
        });

        LightSchedule {
            lights_on: self.lights_on.map(ClockTime::round_to_quarter),
            lights_off: self.lights_off.map(ClockTime::round_to_quarter),
            anomaly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: &[(&str, Option<bool>)]) -> LightSchedule {
        let mut cycle = LightCycle::new();
        for (time, active) in events {
            cycle.observe(ClockTime::parse(time).unwrap(), *active);
        }
        cycle.finish()
    }

    fn t(s: &str) -> Option<ClockTime> {
        Some(ClockTime::parse(s).unwrap())
    }

    #[test]
    fn test_normal_day() {
        let schedule = run(&[
            ("00:05", Some(false)),
            ("06:00", Some(true)),
            ("20:00", Some(false)),
        ]);
        assert_eq!(schedule.lights_on, t("06:00"));
        assert_eq!(schedule.lights_off, t("20:00"));
        assert_eq!(schedule.anomaly, None);
    }

    #[test]
    fn test_times_are_rounded() {
        let schedule = run(&[
            ("00:05", Some(false)),
            ("05:53", Some(true)),
            ("20:07", Some(false)),
        ]);
        assert_eq!(schedule.lights_on, t("06:00"));
        assert_eq!(schedule.lights_off, t("20:00"));
    }

    #[test]
    fn test_already_on_at_start() {
        let schedule = run(&[("00:05", Some(true)), ("12:00", Some(true))]);
        assert_eq!(schedule.lights_on, None);
        assert_eq!(schedule.lights_off, None);
        assert_eq!(schedule.anomaly, Some(LightAnomaly::AlreadyOnAtStart));
    }

    #[test]
    fn test_already_on_still_records_lights_off() {
        let schedule = run(&[("00:05", Some(true)), ("20:00", Some(false))]);
        assert_eq!(schedule.lights_on, None);
        assert_eq!(schedule.lights_off, t("20:00"));
        assert_eq!(schedule.anomaly, Some(LightAnomaly::AlreadyOnAtStart));
    }

    #[test]
    fn test_never_off() {
        let schedule = run(&[("00:05", Some(false)), ("06:00", Some(true))]);
        assert_eq!(schedule.lights_on, t("06:00"));
        assert_eq!(schedule.lights_off, None);
        assert_eq!(schedule.anomaly, Some(LightAnomaly::NeverOff));
    }

    #[test]
    fn test_never_on() {
        let schedule = run(&[("00:05", Some(false)), ("23:50", Some(false))]);
        assert_eq!(schedule, LightSchedule {
            lights_on: None,
            lights_off: None,
            anomaly: Some(LightAnomaly::NeverOn),
        });
    }

    #[test]
    fn test_missing_flags_are_skipped() {
        let schedule = run(&[
            ("00:05", None),
            ("00:20", Some(false)),
            ("06:00", None),
            ("06:15", Some(true)),
            ("20:00", None),
            ("20:15", Some(false)),
        ]);
        assert_eq!(schedule.lights_on, t("06:15"));
        assert_eq!(schedule.lights_off, t("20:15"));
        assert_eq!(schedule.anomaly, None);
    }

    #[test]
    fn test_second_cycle_is_ignored() {
        let mut cycle = LightCycle::new();
        for (time, active) in [("01:00", false), ("06:00", true), ("20:00", false), ("21:00", true)] {
            cycle.observe(ClockTime::parse(time).unwrap(), Some(active));
        }
        assert_eq!(cycle.state(), LightState::Complete);
        let schedule = cycle.finish();
        assert_eq!(schedule.lights_on, t("06:00"));
        assert_eq!(schedule.lights_off, t("20:00"));
    }
}
