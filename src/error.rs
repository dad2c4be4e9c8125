use thiserror::Error;

use crate::stats::StatFamily;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unmapped {family} field: {raw_key}")]
    UnknownField {
        family: StatFamily,
        raw_key: String,
    },

    #[error("{family} record is missing mandatory field {raw_key}")]
    MissingMandatoryField {
        family: StatFamily,
        raw_key: &'static str,
    },

    #[error("{family} field {raw_key} has non-integer value {value:?}")]
    InvalidValue {
        family: StatFamily,
        raw_key: String,
        value: String,
    },

    #[error("{family} field {raw_key} has an unexpected shape")]
    UnexpectedShape {
        family: StatFamily,
        raw_key: String,
    },

    #[error("header mismatch: expected {expected:?}, found {found:?}")]
    HeaderValidation {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("malformed {index} row: {reason}")]
    MalformedLookup { index: &'static str, reason: String },

    #[error("{element} entry {position} holds text where a record is expected")]
    TextInsteadOfRecord {
        element: &'static str,
        position: usize,
    },

    #[error("{entity} is missing identifier {field}")]
    MissingIdentifier {
        entity: &'static str,
        field: &'static str,
    },

    #[error("{entity} identifier {field} has unusable value {value:?}")]
    UnsafeIdentifier {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("failed to parse xml: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to compile pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
