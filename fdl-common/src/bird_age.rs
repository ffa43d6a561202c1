//! Flock age in the `weeks.days` notation used on production forms

use chrono::NaiveDate;

/// Age of the flock on `date`, e.g. `"32.4"` for 32 weeks and 4 days.
///
/// Returns `None` when `date` precedes the hatch date.
pub fn bird_age(hatch_date: NaiveDate, date: NaiveDate) -> Option<String> {
    let days = (date - hatch_date).num_days();
    if days < 0 {
        return None;
    }
    Some(format!("{}.{}", days / 7, days % 7))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_bird_age_weeks_and_days() {
        assert_eq!(bird_age(d("2025-03-05"), d("2025-03-05")).as_deref(), Some("0.0"));
        assert_eq!(bird_age(d("2025-03-05"), d("2025-03-12")).as_deref(), Some("1.0"));
        assert_eq!(bird_age(d("2025-03-05"), d("2025-10-18")).as_deref(), Some("32.3"));
    }

    #[test]
    fn test_bird_age_before_hatch() {
        assert_eq!(bird_age(d("2025-03-05"), d("2025-03-04")), None);
    }
}
