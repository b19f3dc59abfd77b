use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

// Set to true to log rows skipped during decoding
const ENABLE_LOGS: bool = true;

use crate::log_warn;

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

/// Wraps a decode failure so it can leave a `query_map` closure.
pub fn decode_error(err: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{err:#}"),
        )),
    )
}

fn is_decode_error(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
    )
}

/// Drops rows whose stored values do not decode, logging each one.
///
/// A single malformed row written upstream must not hide every other row;
/// errors raised by SQLite itself still pass through.
pub fn decodable_rows<T, I>(
    rows: I,
    what: &'static str,
) -> impl Iterator<Item = rusqlite::Result<T>>
where
    I: Iterator<Item = rusqlite::Result<T>>,
{
    rows.filter(move |row| match row {
        Err(err) if is_decode_error(err) => {
            log_warn!("skipping undecodable {what} row: {err}");
            false
        }
        _ => true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_are_skipped_but_sqlite_errors_are_kept() {
        let rows = vec![
            Ok(1),
            Err(decode_error(anyhow::anyhow!("bad created_at"))),
            Ok(2),
            Err(rusqlite::Error::QueryReturnedNoRows),
        ];
        let kept: Vec<_> = decodable_rows(rows.into_iter(), "reading").collect();
        assert_eq!(kept.len(), 3);
        assert!(matches!(kept[0], Ok(1)));
        assert!(matches!(kept[1], Ok(2)));
        assert!(matches!(kept[2], Err(rusqlite::Error::QueryReturnedNoRows)));
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let parsed = parse_datetime("2024-05-01T10:00:00+07:00", "created_at").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T03:00:00+00:00");
    }

    #[test]
    fn garbage_timestamp_names_the_field() {
        let err = parse_datetime("yesterday", "window_end").unwrap_err();
        assert!(err.to_string().contains("window_end"));
    }
}
