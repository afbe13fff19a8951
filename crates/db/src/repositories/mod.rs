use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

use cartlens_core::errors::DataSourceError;

pub mod category;
pub mod order_line;
pub mod service;

/// Ids bound per `IN (...)` query; SQLite caps bind parameters per statement.
pub(crate) const BIND_CHUNK: usize = 500;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for DataSourceError {
    fn from(error: RepositoryError) -> Self {
        DataSourceError(error.to_string())
    }
}

pub(crate) fn parse_price(raw: &str) -> Result<Decimal, RepositoryError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|error| RepositoryError::Decode(format!("invalid price `{raw}`: {error}")))
}

/// Accepts SQLite's `datetime()` text, ISO-8601 with `T`, RFC 3339 and bare dates.
pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, RepositoryError> {
    let trimmed = raw.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_local());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| RepositoryError::Decode(format!("invalid created_timestamp `{raw}`")))
}
