//! Sheet-entry API handlers, shared by all five entry kinds.
//!
//! ```text
//! POST /api/{kind}/{characterId} {"name":"Arcana","bonus":5,"proficient":true}
//! GET  /api/{kind}/{id}
//! PUT  /api/{kind}/{id} {"bonus":6}
//! ```
//!
//! `{kind}` is one of `skill`, `stat`, `save`, `spell`, or `attack`; any other
//! segment is an unknown resource.

use actix_web::{get, post, put, web};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{CharacterId, Error, SheetEntry, SheetEntryId, SheetEntryPayload};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::{ErrorSchema, SheetEntryFieldsSchema, SheetEntrySchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_json_body, parse_kind, parse_uuid};

#[derive(Debug, Deserialize)]
pub struct EntryPath {
    kind: String,
    id: String,
}

/// Create an entry of `kind` and attach it to a character the caller owns.
#[utoipa::path(
    post,
    path = "/api/{kind}/{characterId}",
    params(
        ("kind" = String, Path, description = "skill, stat, save, spell, or attack"),
        ("characterId" = String, Path, description = "Character to attach to")
    ),
    request_body(content = SheetEntryFieldsSchema, description = "Kind-specific entry fields"),
    responses(
        (status = 200, description = "Attached entry", body = SheetEntrySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Unknown kind or character", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "createSheetEntry"
)]
#[post("/{kind}/{id}")]
pub async fn create_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<EntryPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<SheetEntry>> {
    let EntryPath { kind, id } = path.into_inner();
    let kind = parse_kind(&kind)?;
    let character = parse_uuid(&id, FieldName::new("characterId")).map(CharacterId::from_uuid)?;
    let value = parse_json_body(&body)?
        .ok_or_else(|| Error::invalid_request("request body is required"))?;
    let payload = SheetEntryPayload::from_json(kind, value)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let entry = state.entries.attach(user.id(), &character, payload).await?;
    Ok(web::Json(entry))
}

/// Fetch an entry the caller owns.
#[utoipa::path(
    get,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "skill, stat, save, spell, or attack"),
        ("id" = String, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Sheet entry", body = SheetEntrySchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Unknown kind or entry", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "getSheetEntry"
)]
#[get("/{kind}/{id}")]
pub async fn get_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<EntryPath>,
) -> ApiResult<web::Json<SheetEntry>> {
    let EntryPath { kind, id } = path.into_inner();
    let kind = parse_kind(&kind)?;
    let id = parse_uuid(&id, FieldName::new("id")).map(SheetEntryId::from_uuid)?;
    let entry = state.entries_query.get(user.id(), kind, &id).await?;
    Ok(web::Json(entry))
}

/// Merge the body into an entry the caller owns.
///
/// The body is handed to the service unvalidated; it is only judged once
/// ownership has been established.
#[utoipa::path(
    put,
    path = "/api/{kind}/{id}",
    params(
        ("kind" = String, Path, description = "skill, stat, save, spell, or attack"),
        ("id" = String, Path, description = "Entry id")
    ),
    request_body(content = SheetEntryFieldsSchema, description = "Fields to overwrite"),
    responses(
        (status = 200, description = "Updated entry", body = SheetEntrySchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Unknown kind or entry", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["entries"],
    operation_id = "updateSheetEntry"
)]
#[put("/{kind}/{id}")]
pub async fn update_entry(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<EntryPath>,
    body: web::Bytes,
) -> ApiResult<web::Json<SheetEntry>> {
    let EntryPath { kind, id } = path.into_inner();
    let kind = parse_kind(&kind)?;
    let id = parse_uuid(&id, FieldName::new("id")).map(SheetEntryId::from_uuid)?;
    let patch = parse_json_body(&body)?.unwrap_or(Value::Null);
    let entry = state.entries.update(user.id(), kind, &id, patch).await?;
    Ok(web::Json(entry))
}

#[cfg(test)]
#[path = "sheet_entries_tests.rs"]
mod tests;
