#![forbid(unsafe_code)]

pub mod table;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

/// Renders an RFC 3339 timestamp as `YYYY-MM-DD HH:MM` (UTC). Unparsable input is returned as-is.
#[must_use]
pub fn format_timestamp(raw: &str) -> String {
    let Ok(ts) = time::OffsetDateTime::parse(raw, &Rfc3339) else {
        return raw.to_owned();
    };
    ts.to_offset(time::UtcOffset::UTC)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| raw.to_owned())
}

#[must_use]
pub fn truncate(s: &str, max: usize) -> String {
    let mut out: String = s.chars().take(max).collect();
    if s.chars().count() > max {
        out.push_str("...");
    }
    out
}
