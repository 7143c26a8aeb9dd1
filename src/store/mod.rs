pub mod audit;
pub mod contacts;

pub use audit::AuditStore;
pub use contacts::ContactStore;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("invalid {column} value: {value}")]
struct InvalidColumn {
    column: &'static str,
    value: String,
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    // Fixed-width representation so text ordering matches time ordering.
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: String, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_uuid(value: String, idx: usize) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&value)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

fn parse_optional_uuid(value: Option<String>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    value.map(|raw| parse_uuid(raw, idx)).transpose()
}

fn invalid_column(column: &'static str, value: String, idx: usize) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(InvalidColumn { column, value }))
}
