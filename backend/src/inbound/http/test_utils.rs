//! Test helpers for inbound HTTP components.
//!
//! Handlers are exercised against mocked driving ports. Every bundle
//! resolves [`TEST_TOKEN`] to [`caller_id`] and rejects any other token.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName};
use actix_web::{App, web};
use uuid::Uuid;

use crate::domain::ports::{
    MockCharacterCommand, MockCharacterQuery, MockIdentityCommand, MockSheetEntryCommand,
    MockSheetEntryQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Bearer token accepted by [`MockPorts`].
pub const TEST_TOKEN: &str = "test-token";

/// User the test token resolves to.
pub fn caller_id() -> UserId {
    UserId::from_uuid(Uuid::from_u128(0x3fa8_5f64_5717_4562_b3fc_2c96_3f66_afa6))
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {TEST_TOKEN}"))
}

/// Mocked driving ports; set expectations before calling [`MockPorts::into_state`].
pub struct MockPorts {
    pub identity: MockIdentityCommand,
    pub characters: MockCharacterCommand,
    pub characters_query: MockCharacterQuery,
    pub entries: MockSheetEntryCommand,
    pub entries_query: MockSheetEntryQuery,
}

impl MockPorts {
    pub fn new() -> Self {
        let mut identity = MockIdentityCommand::new();
        identity.expect_resolve().returning(|token| {
            if token == TEST_TOKEN {
                Ok(caller_id())
            } else {
                Err(Error::unauthorized("invalid token"))
            }
        });
        Self {
            identity,
            characters: MockCharacterCommand::new(),
            characters_query: MockCharacterQuery::new(),
            entries: MockSheetEntryCommand::new(),
            entries_query: MockSheetEntryQuery::new(),
        }
    }

    pub fn into_state(self) -> HttpState {
        HttpState::new(HttpStatePorts {
            identity: Arc::new(self.identity),
            characters: Arc::new(self.characters),
            characters_query: Arc::new(self.characters_query),
            entries: Arc::new(self.entries),
            entries_query: Arc::new(self.entries_query),
        })
    }
}

/// App serving the full `/api` surface over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api").configure(configure_api))
}
