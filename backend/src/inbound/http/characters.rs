//! Character API handlers.
//!
//! ```text
//! POST   /api/character {"name":"dustinyschild","race":"Gnome","level":3}
//! GET    /api/characters
//! GET    /api/character/{id}
//! PUT    /api/character/{id} {"race":null,"level":4}
//! DELETE /api/character/{id}
//! ```
//!
//! Updates distinguish an absent field (unchanged) from `null` (cleared), so
//! the update body is decoded by hand rather than through a serde struct.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::{
    Character, CharacterId, CharacterPatch, CharacterProfile, CharacterSummary, Error, ErrorCode,
    PopulatedCharacter,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::{
    CharacterSchema, CharacterSummarySchema, ErrorSchema, PopulatedCharacterSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_json_body, parse_uuid,
};

const ID: FieldName = FieldName::new("id");

/// Request body for `POST /api/character`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    #[schema(example = "dustinyschild")]
    pub name: Option<String>,
    #[schema(example = "Gnome")]
    pub race: Option<String>,
    #[schema(example = "Wizard")]
    pub class_name: Option<String>,
    #[schema(minimum = 1, maximum = 20, example = 3)]
    pub level: Option<u8>,
}

/// Request body for `PUT /api/character/{id}`.
///
/// Every field is optional; `null` clears `race`, `className`, and `level`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterRequest {
    pub name: Option<String>,
    pub race: Option<String>,
    pub class_name: Option<String>,
    #[schema(minimum = 1, maximum = 20)]
    pub level: Option<u8>,
}

impl TryFrom<CreateCharacterRequest> for CharacterProfile {
    type Error = Error;

    fn try_from(value: CreateCharacterRequest) -> Result<Self, Self::Error> {
        let name = value
            .name
            .ok_or_else(|| invalid_field_error("name", "name is required"))?;
        CharacterProfile::try_new(
            &name,
            value.race.as_deref(),
            value.class_name.as_deref(),
            value.level,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

fn character_id(raw: &str) -> Result<CharacterId, Error> {
    parse_uuid(raw, ID).map(CharacterId::from_uuid)
}

fn required_body(body: &[u8]) -> Result<Value, Error> {
    parse_json_body(body)?.ok_or_else(|| Error::invalid_request("request body is required"))
}

fn body_object(value: Value) -> Result<Map<String, Value>, Error> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::invalid_request("request body must be a JSON object")),
    }
}

fn text_field(field: &str, value: &Value) -> Result<String, Error> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| invalid_field_error(field, format!("{field} must be a string")))
}

fn clearable_text(field: &str, value: &Value) -> Result<Option<String>, Error> {
    match value {
        Value::Null => Ok(None),
        other => text_field(field, other).map(Some),
    }
}

fn clearable_level(value: &Value) -> Result<Option<u8>, Error> {
    match value {
        Value::Null => Ok(None),
        other => other
            .as_u64()
            .and_then(|level| u8::try_from(level).ok())
            .map(Some)
            .ok_or_else(|| invalid_field_error("level", "level must be an integer from 1 to 20")),
    }
}

/// Decode an update body into a patch. Unknown keys are ignored.
fn parse_patch(body: &[u8]) -> Result<CharacterPatch, Error> {
    let map = body_object(required_body(body)?)?;
    let mut patch = CharacterPatch::default();
    if let Some(value) = map.get("name") {
        patch.name = Some(text_field("name", value)?);
    }
    if let Some(value) = map.get("race") {
        patch.race = Some(clearable_text("race", value)?);
    }
    if let Some(value) = map.get("className") {
        patch.class_name = Some(clearable_text("className", value)?);
    }
    if let Some(value) = map.get("level") {
        patch.level = Some(clearable_level(value)?);
    }
    Ok(patch)
}

/// Create a character owned by the caller.
#[utoipa::path(
    post,
    path = "/api/character",
    request_body = CreateCharacterRequest,
    responses(
        (status = 200, description = "Created character", body = CharacterSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["characters"],
    operation_id = "createCharacter"
)]
#[post("/character")]
pub async fn create_character(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    body: web::Bytes,
) -> ApiResult<web::Json<Character>> {
    let request: CreateCharacterRequest = serde_json::from_value(required_body(&body)?)
        .map_err(|err| Error::invalid_request(format!("invalid character payload: {err}")))?;
    let profile = CharacterProfile::try_from(request)?;
    let character = state.characters.create(user.id(), profile).await?;
    Ok(web::Json(character))
}

/// List the caller's characters in creation order.
#[utoipa::path(
    get,
    path = "/api/characters",
    responses(
        (status = 200, description = "Character summaries", body = [CharacterSummarySchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["characters"],
    operation_id = "listCharacters"
)]
#[get("/characters")]
pub async fn list_characters(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<CharacterSummary>>> {
    let summaries = state.characters_query.list(user.id()).await?;
    Ok(web::Json(summaries))
}

/// Fetch a character with every sheet entry resolved.
#[utoipa::path(
    get,
    path = "/api/character/{id}",
    params(("id" = String, Path, description = "Character id")),
    responses(
        (status = 200, description = "Populated character", body = PopulatedCharacterSchema),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Character not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["characters"],
    operation_id = "getCharacter"
)]
#[get("/character/{id}")]
pub async fn get_character(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<PopulatedCharacter>> {
    let id = character_id(&path.into_inner())?;
    let character = state.characters_query.get(user.id(), &id).await?;
    Ok(web::Json(character))
}

/// Update a character's display attributes.
///
/// Ownership is checked before the body is judged, so a non-owner always
/// sees 401 whatever they sent.
#[utoipa::path(
    put,
    path = "/api/character/{id}",
    params(("id" = String, Path, description = "Character id")),
    request_body = UpdateCharacterRequest,
    responses(
        (status = 200, description = "Updated character", body = CharacterSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Character not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["characters"],
    operation_id = "updateCharacter"
)]
#[put("/character/{id}")]
pub async fn update_character(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<Character>> {
    let id = character_id(&path.into_inner())?;
    let parsed = parse_patch(&body);
    let patch = parsed.clone().unwrap_or_default();
    match state.characters.update(user.id(), &id, patch).await {
        Ok(character) => Ok(web::Json(character)),
        // An unparseable body reaches the service as an empty patch; report
        // the parse failure rather than the generic empty-patch message.
        Err(err) if err.code() == ErrorCode::InvalidRequest => Err(parsed.err().unwrap_or(err)),
        Err(err) => Err(err),
    }
}

/// Delete a character and every sheet entry attached to it.
#[utoipa::path(
    delete,
    path = "/api/character/{id}",
    params(("id" = String, Path, description = "Character id")),
    responses(
        (status = 204, description = "Character deleted"),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 401, description = "Unauthorised or not the owner", body = ErrorSchema),
        (status = 404, description = "Character not found", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["characters"],
    operation_id = "deleteCharacter"
)]
#[delete("/character/{id}")]
pub async fn delete_character(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = character_id(&path.into_inner())?;
    state.characters.delete(user.id(), &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "characters_tests.rs"]
mod tests;
