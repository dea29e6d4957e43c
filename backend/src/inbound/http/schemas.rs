//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. The
//! wrappers here mirror the JSON shape of their domain counterparts so the
//! generated document matches what handlers actually send.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The caller does not own the record.
    #[schema(rename = "permission_denied")]
    PermissionDenied,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "permission_denied")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "character belongs to another user")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "6f1c1b8e-3b9a-4c55-9d8e-0a4b1b2c3d4e")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Character`].
#[derive(ToSchema)]
#[schema(as = Character)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CharacterSchema {
    #[schema(format = "uuid")]
    id: String,
    /// Owner of the character.
    #[schema(format = "uuid")]
    user_id: String,
    #[schema(example = "dustinyschild")]
    name: String,
    race: Option<String>,
    class_name: Option<String>,
    #[schema(minimum = 1, maximum = 20)]
    level: Option<u8>,
    /// Skill ids in attachment order.
    #[schema(value_type = Vec<uuid::Uuid>)]
    skills: Vec<String>,
    #[schema(value_type = Vec<uuid::Uuid>)]
    stats: Vec<String>,
    #[schema(value_type = Vec<uuid::Uuid>)]
    saves: Vec<String>,
    #[schema(value_type = Vec<uuid::Uuid>)]
    spells: Vec<String>,
    #[schema(value_type = Vec<uuid::Uuid>)]
    attacks: Vec<String>,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::SheetEntry`].
///
/// Kind-specific payload fields (`name`, `bonus`, `score`, `level`,
/// `damage`, ...) sit alongside the envelope fields.
#[derive(ToSchema)]
#[schema(as = SheetEntry)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SheetEntrySchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    character_id: String,
    #[schema(format = "uuid")]
    user_id: String,
    #[schema(example = "Arcana")]
    name: String,
    #[schema(format = "date-time")]
    created_at: String,
}

/// Request body for creating or updating a sheet entry.
///
/// Only `name` is shared by every kind; the remaining fields depend on the
/// kind named in the path.
#[derive(ToSchema)]
#[schema(as = SheetEntryFields)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SheetEntryFieldsSchema {
    #[schema(example = "Arcana")]
    name: String,
}

/// OpenAPI schema for [`crate::domain::PopulatedCharacter`].
#[derive(ToSchema)]
#[schema(as = PopulatedCharacter)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PopulatedCharacterSchema {
    #[schema(format = "uuid")]
    id: String,
    #[schema(format = "uuid")]
    user_id: String,
    name: String,
    race: Option<String>,
    class_name: Option<String>,
    level: Option<u8>,
    skills: Vec<SheetEntrySchema>,
    stats: Vec<SheetEntrySchema>,
    saves: Vec<SheetEntrySchema>,
    spells: Vec<SheetEntrySchema>,
    attacks: Vec<SheetEntrySchema>,
    #[schema(format = "date-time")]
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::CharacterSummary`].
#[derive(ToSchema)]
#[schema(as = CharacterSummary)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CharacterSummarySchema {
    #[schema(format = "uuid")]
    character_id: String,
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> serde_json::Value {
        serde_json::to_value(T::schema()).expect("schema serialises")
    }

    #[rstest]
    fn error_code_schema_lists_every_code() {
        let schema = schema_json::<ErrorCodeSchema>();
        let values = schema
            .get("enum")
            .and_then(serde_json::Value::as_array)
            .expect("enum values");
        for code in [
            "invalid_request",
            "unauthorized",
            "permission_denied",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(values.iter().any(|value| value == code), "missing {code}");
        }
    }

    #[rstest]
    fn character_schema_uses_camel_case_fields() {
        let schema = schema_json::<CharacterSchema>();
        let properties = schema.get("properties").expect("properties");
        for field in ["userId", "className", "createdAt", "skills"] {
            assert!(properties.get(field).is_some(), "missing {field}");
        }
    }
}
