//! Millisecond → five-field time breakdown
//!
//! The centisecond field keeps the legacy rendering: the centisecond count is
//! printed in tenths with one decimal, so 340 ms becomes `"3.4"` rather than
//! `"34"`.

use xztimer_types::TimeBreakdown;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

/// Format a millisecond value as (days, hours, minutes, seconds, centiseconds).
///
/// Negative values are clamped to zero. `days` is unpadded, the next three
/// fields are zero-padded to two digits.
pub fn format_time(millis: i64) -> TimeBreakdown {
    let t = millis.max(0);

    let days = t / MS_PER_DAY;
    let hours = (t / MS_PER_HOUR) % 24;
    let minutes = (t / MS_PER_MINUTE) % 60;
    let seconds = (t / MS_PER_SECOND) % 60;
    let centis = (t % MS_PER_SECOND) / 10;

    TimeBreakdown {
        days: days.to_string(),
        hours: format!("{hours:02}"),
        minutes: format!("{minutes:02}"),
        seconds: format!("{seconds:02}"),
        centiseconds: format!("{}.{}", centis / 10, centis % 10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_formats_as_all_zero_fields() {
        let t = format_time(0);
        assert_eq!(t.as_tuple(), ("0", "00", "00", "00", "0.0"));
    }

    #[test]
    fn hour_minute_second_with_centis() {
        // 1h 1m 1.34s
        let t = format_time(3_661_340);
        assert_eq!(t.as_tuple(), ("0", "01", "01", "01", "3.4"));
    }

    #[test]
    fn days_roll_over_hours() {
        // 1d 1h 1m 1.23s
        let t = format_time(90_061_230);
        assert_eq!(t.as_tuple(), ("1", "01", "01", "01", "2.3"));
    }

    #[test]
    fn days_are_not_padded() {
        let t = format_time(10 * MS_PER_DAY);
        assert_eq!(t.days, "10");
        assert_eq!(t.hours, "00");
    }

    #[test]
    fn centis_keep_tenths_rendering() {
        assert_eq!(format_time(59_999).as_tuple(), ("0", "00", "00", "59", "9.9"));
        assert_eq!(format_time(1_005).centiseconds, "0.0");
        assert_eq!(format_time(1_010).centiseconds, "0.1");
        assert_eq!(format_time(500).centiseconds, "5.0");
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        assert_eq!(format_time(-2_500), format_time(0));
    }
}
