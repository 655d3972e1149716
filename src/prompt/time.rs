//! Current-time section in the story's local time.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};

use crate::utils::time::{day_period, weekday_label};

/// Render `now` in the story's local time, e.g.
/// `## 当前时间\n2026年10月16日 星期五 下午 15:04`.
///
/// Out-of-range offsets fall back to UTC.
pub fn build_time_context_at(now: DateTime<Utc>, utc_offset_hours: i32) -> String {
    let offset = utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix());
    let local = now.with_timezone(&offset);

    format!(
        "## 当前时间\n{}年{}月{}日 {} {} {:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        weekday_label(local.weekday()),
        day_period(local.hour()),
        local.hour(),
        local.minute()
    )
}

pub fn build_time_context(utc_offset_hours: i32) -> String {
    build_time_context_at(Utc::now(), utc_offset_hours)
}
