//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path and body parsing failures become `invalid_request` errors carrying a
//! `field` and machine-readable `code` in their details.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::domain::{Error, SheetEntryKind};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidJson,
    InvalidField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn invalid_field_error(field: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": ErrorCode::InvalidField.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Resolve the `{kind}` path segment; unknown kinds are unknown resources.
pub(crate) fn parse_kind(value: &str) -> Result<SheetEntryKind, Error> {
    value
        .parse()
        .map_err(|_| Error::not_found(format!("unknown resource: {value}")))
}

/// Decode a raw request body as JSON.
///
/// An empty body yields `Ok(None)`; malformed JSON is an `invalid_request`.
pub(crate) fn parse_json_body(body: &[u8]) -> Result<Option<Value>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some).map_err(|err| {
        Error::invalid_request("request body must be valid JSON").with_details(json!({
            "code": ErrorCode::InvalidJson.as_str(),
            "reason": err.to_string(),
        }))
    })
}
