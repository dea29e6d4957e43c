//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the schema wrappers from
//! [`crate::inbound::http::schemas`], and the bearer-token security scheme.
//! Swagger UI serves it in debug builds and `openapi-dump` prints it.

use crate::inbound::http::characters::{CreateCharacterRequest, UpdateCharacterRequest};
use crate::inbound::http::schemas::{
    CharacterSchema, CharacterSummarySchema, ErrorCodeSchema, ErrorSchema,
    PopulatedCharacterSchema, SheetEntryFieldsSchema, SheetEntrySchema,
};
use crate::inbound::http::users::{LoginRequest, SignupRequest};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token returned by POST /api/signup or /api/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Character sheet API",
        description = "Accounts, characters, and their sheet entries."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::login,
        crate::inbound::http::characters::create_character,
        crate::inbound::http::characters::list_characters,
        crate::inbound::http::characters::get_character,
        crate::inbound::http::characters::update_character,
        crate::inbound::http::characters::delete_character,
        crate::inbound::http::sheet_entries::create_entry,
        crate::inbound::http::sheet_entries::get_entry,
        crate::inbound::http::sheet_entries::update_entry,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        CharacterSchema,
        CharacterSummarySchema,
        PopulatedCharacterSchema,
        SheetEntrySchema,
        SheetEntryFieldsSchema,
        SignupRequest,
        LoginRequest,
        CreateCharacterRequest,
        UpdateCharacterRequest,
    )),
    tags(
        (name = "users", description = "Signup and login"),
        (name = "characters", description = "Character records"),
        (name = "entries", description = "Skills, stats, saves, spells, and attacks"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
