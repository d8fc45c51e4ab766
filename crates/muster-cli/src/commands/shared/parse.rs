use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use muster_core::keys::PersonKey;

const LOCAL_MINUTE: &str = "%Y-%m-%dT%H:%M";

/// `YYYY-MM-DD`, or `fallback` when absent.
pub fn parse_date(raw: Option<&str>, fallback: NaiveDate) -> anyhow::Result<NaiveDate> {
    raw.map_or(Ok(fallback), |raw| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date '{raw}' (expected YYYY-MM-DD)"))
    })
}

/// `staff:ID` / `client:ID`.
pub fn parse_key(raw: &str) -> anyhow::Result<PersonKey> {
    raw.parse::<PersonKey>()
        .with_context(|| format!("invalid person '{raw}'"))
}

/// RFC 3339, or a local `YYYY-MM-DDTHH:MM[:SS]` read in `offset`.
///
/// The result is always expressed in `offset`, so the event lands on the
/// site's local day whatever offset the input was written in.
pub fn parse_timestamp(
    raw: &str,
    offset: FixedOffset,
) -> anyhow::Result<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&offset));
    }
    let naive = parse_local(raw)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .with_context(|| format!("'{raw}' does not exist in offset {offset}"))
}

/// A wall-clock `YYYY-MM-DDTHH:MM[:SS]` with no offset.
pub fn parse_local(raw: &str) -> anyhow::Result<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, LOCAL_MINUTE)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .with_context(|| format!("invalid time '{raw}' (expected YYYY-MM-DDTHH:MM)"))
}

/// `KEY` or `KEY=REASON` from a drill `--absent` flag.
pub fn parse_absence(raw: &str) -> anyhow::Result<(PersonKey, Option<String>)> {
    match raw.split_once('=') {
        Some((key, reason)) => Ok((parse_key(key)?, Some(reason.trim().to_string()))),
        None => Ok((parse_key(raw)?, None)),
    }
}
