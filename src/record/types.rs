use thiserror::Error;

/// A malformed input line. Aborts the run it occurred in; no data is ever
/// fabricated for a malformed record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("record line is empty")]
    EmptyLine,

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid value in field `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}
