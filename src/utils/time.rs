//! Localized (zh-CN) time labels used in prompt text.

use chrono::{DateTime, Duration, Utc, Weekday};

/// Render how long ago `then` was, relative to `now`.
///
/// Future timestamps (clock skew between writers) render as "刚刚".
pub fn format_time_ago_at(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(then);

    if duration < Duration::minutes(1) {
        "刚刚".to_string()
    } else if duration < Duration::hours(1) {
        format!("{}分钟前", duration.num_minutes())
    } else if duration < Duration::days(1) {
        format!("{}小时前", duration.num_hours())
    } else if duration < Duration::weeks(1) {
        let days = duration.num_days();
        if days == 1 {
            "昨天".to_string()
        } else {
            format!("{}天前", days)
        }
    } else if duration < Duration::days(30) {
        format!("{}周前", duration.num_weeks())
    } else if duration < Duration::days(365) {
        format!("{}个月前", duration.num_days() / 30)
    } else {
        format!("{}年前", duration.num_days() / 365)
    }
}

/// Render how long ago `then` was, relative to the wall clock.
pub fn format_time_ago(then: DateTime<Utc>) -> String {
    format_time_ago_at(then, Utc::now())
}

/// Break a duration in seconds into hours/minutes/seconds, dropping zero parts.
///
/// `3725` renders as `1小时2分5秒`, `3600` as `1小时`, `0` as `0秒`.
pub fn format_duration_secs(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{}小时", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}分", minutes));
    }
    if seconds > 0 {
        out.push_str(&format!("{}秒", seconds));
    }
    if out.is_empty() {
        out.push_str("0秒");
    }
    out
}

/// Day-period label for an hour of the day (0-23).
pub fn day_period(hour: u32) -> &'static str {
    match hour {
        0..=4 => "凌晨",
        5..=7 => "早上",
        8..=10 => "上午",
        11..=12 => "中午",
        13..=16 => "下午",
        17..=18 => "傍晚",
        19..=22 => "晚上",
        _ => "深夜",
    }
}

pub fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "星期一",
        Weekday::Tue => "星期二",
        Weekday::Wed => "星期三",
        Weekday::Thu => "星期四",
        Weekday::Fri => "星期五",
        Weekday::Sat => "星期六",
        Weekday::Sun => "星期日",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs_ago: i64) -> (DateTime<Utc>, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        (now - Duration::seconds(secs_ago), now)
    }

    #[test]
    fn test_time_ago_buckets() {
        let cases = [
            (10, "刚刚"),
            (5 * 60, "5分钟前"),
            (3 * 3600, "3小时前"),
            (26 * 3600, "昨天"),
            (3 * 86400, "3天前"),
            (15 * 86400, "2周前"),
            (65 * 86400, "2个月前"),
            (800 * 86400, "2年前"),
        ];
        for (secs, expected) in cases {
            let (then, now) = at(secs);
            assert_eq!(format_time_ago_at(then, now), expected, "{secs}s ago");
        }
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        let (then, now) = at(-120);
        assert_eq!(format_time_ago_at(then, now), "刚刚");
    }

    #[test]
    fn test_duration_examples() {
        assert_eq!(format_duration_secs(3725), "1小时2分5秒");
        assert_eq!(format_duration_secs(3600), "1小时");
        assert_eq!(format_duration_secs(65), "1分5秒");
        assert_eq!(format_duration_secs(7205), "2小时5秒");
        assert_eq!(format_duration_secs(0), "0秒");
    }

    #[test]
    fn test_day_period_boundaries() {
        assert_eq!(day_period(0), "凌晨");
        assert_eq!(day_period(5), "早上");
        assert_eq!(day_period(9), "上午");
        assert_eq!(day_period(12), "中午");
        assert_eq!(day_period(15), "下午");
        assert_eq!(day_period(18), "傍晚");
        assert_eq!(day_period(21), "晚上");
        assert_eq!(day_period(23), "深夜");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Sum the rendered components back into seconds.
        fn reconstruct(rendered: &str) -> u64 {
            let mut total = 0;
            let mut digits = String::new();
            for c in rendered.chars() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    continue;
                }
                let unit = match c {
                    '时' => 3600,
                    '分' => 60,
                    '秒' => 1,
                    _ => continue,
                };
                total += digits.parse::<u64>().unwrap() * unit;
                digits.clear();
            }
            total
        }

        proptest! {
            #[test]
            fn duration_components_reconstruct_total(d in 0u64..10_000_000) {
                let rendered = format_duration_secs(d);
                prop_assert_eq!(reconstruct(&rendered), d);
                if d > 0 {
                    prop_assert!(!rendered.starts_with('0'));
                }
            }
        }
    }
}
