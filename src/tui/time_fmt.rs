use std::sync::OnceLock;

use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::format_description::well_known::Rfc3339;

fn ts_ui_format() -> Option<&'static [FormatItem<'static>]> {
    static FMT: OnceLock<Option<Vec<FormatItem<'static>>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse(
            "[year]-[month repr:numerical padding:zero]-[day padding:zero] [hour padding:zero]:[minute padding:zero]",
        )
        .ok()
    })
    .as_deref()
}

fn fmt_abs(ts: &str) -> Option<String> {
    let dt = OffsetDateTime::parse(ts, &Rfc3339).ok()?;
    dt.format(ts_ui_format()?).ok()
}

pub(super) fn fmt_since(ts: &str, now: OffsetDateTime) -> Option<String> {
    let dt = OffsetDateTime::parse(ts, &Rfc3339).ok()?;
    let secs = (now - dt).whole_seconds();

    // clock skew between machines
    if secs < 0 {
        return None;
    }

    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    let s = if secs < 60 {
        "just now".to_string()
    } else if mins < 60 {
        format!("{mins}m ago")
    } else if hours < 48 {
        format!("{hours}h ago")
    } else if days < 14 {
        format!("{days}d ago")
    } else {
        return None;
    };
    Some(s)
}

/// Relative time for recent commits, a date for older ones.
pub(super) fn fmt_commit_time(ts: &str, now: OffsetDateTime) -> String {
    fmt_since(ts, now)
        .or_else(|| fmt_abs(ts))
        .unwrap_or_else(|| ts.to_string())
}
