//! Record parsing and event serialization.
//!
//! One line of source text becomes one typed record; one record becomes one
//! opaque [`SerializedEvent`] payload. Both steps are pure and stateless.

pub mod taxi_fare;
pub mod taxi_ride;
pub mod types;

pub use taxi_fare::TaxiFare;
pub use taxi_ride::TaxiRide;
pub use types::ParseError;

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::batch::SerializedEvent;

pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A record type that can be replayed from one line of source text.
pub trait ReplayRecord: Serialize + Sized {
    /// Name used in progress lines and error context.
    const NAME: &'static str;

    fn parse(line: &str) -> Result<Self, ParseError>;

    /// Key identifying the vehicle/driver/vendor tuple the record belongs to.
    fn partition_key(&self) -> String;
}

/// Serializes a record into an event carrying its partition key.
pub fn serialize_event<R: ReplayRecord>(record: &R) -> Result<SerializedEvent, serde_json::Error> {
    let payload = serde_json::to_vec(record)?;
    Ok(SerializedEvent::with_partition_key(
        payload,
        record.partition_key(),
    ))
}

pub(crate) fn parse_field<T>(value: &str, field: &'static str) -> Result<T, ParseError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ParseError::InvalidField {
            field,
            message: e.to_string(),
        })
}

pub(crate) fn parse_time(value: &str, field: &'static str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|e| {
        ParseError::InvalidField {
            field,
            message: e.to_string(),
        }
    })
}

pub(crate) fn split_line(line: &str, expected: usize) -> Result<Vec<&str>, ParseError> {
    if line.trim().is_empty() {
        return Err(ParseError::EmptyLine);
    }
    let tokens: Vec<&str> = line.split(',').collect();
    if tokens.len() != expected {
        return Err(ParseError::FieldCount {
            expected,
            found: tokens.len(),
        });
    }
    Ok(tokens)
}
