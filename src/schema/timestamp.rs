use rusqlite::types::Type;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

// Fixed width so text ordering matches time ordering.
const STORED_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Current time at the precision the database keeps.
pub(crate) fn now() -> OffsetDateTime {
    let ts = OffsetDateTime::now_utc();
    ts.replace_microsecond(ts.microsecond()).unwrap_or(ts)
}

pub(crate) fn encode(ts: OffsetDateTime) -> String {
    // infallible for years 0..=9999, which now() stays within
    ts.to_offset(UtcOffset::UTC)
        .format(STORED_FORMAT)
        .unwrap_or_default()
}

pub(crate) fn decode(idx: usize, raw: &str) -> rusqlite::Result<OffsetDateTime> {
    PrimitiveDateTime::parse(raw, STORED_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn decode_json(idx: usize, raw: &str) -> rusqlite::Result<serde_json::Value> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
