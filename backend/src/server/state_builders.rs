//! Builders wiring repositories, services, and tokens into HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use backend::domain::ports::{CharacterRepository, SheetEntryRepository, UserRepository};
use backend::domain::{CharacterService, IdentityService, SheetEntryService};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::memory::{
    InMemoryCharacterRepository, InMemorySheetEntryRepository, InMemoryUserRepository,
};
use backend::outbound::persistence::{
    DieselCharacterRepository, DieselSheetEntryRepository, DieselUserRepository,
};
use backend::outbound::tokens::JwtAccessTokens;

use super::ServerConfig;

/// Repositories backing one deployment.
struct Stores<U, C, S> {
    users: Arc<U>,
    characters: Arc<C>,
    entries: Arc<S>,
}

/// Build the driving ports over `stores`.
///
/// Each service implements both the command and the query port, so one
/// instance is shared between the two.
fn wire_ports<U, C, S>(
    stores: Stores<U, C, S>,
    tokens: Arc<JwtAccessTokens>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    U: UserRepository + 'static,
    C: CharacterRepository + 'static,
    S: SheetEntryRepository + 'static,
{
    let Stores {
        users,
        characters,
        entries,
    } = stores;
    let character_service = Arc::new(CharacterService::new(
        characters.clone(),
        entries.clone(),
        clock.clone(),
    ));
    let entry_service = Arc::new(SheetEntryService::new(characters, entries, clock));
    HttpStatePorts {
        identity: Arc::new(IdentityService::new(users, tokens)),
        characters: character_service.clone(),
        characters_query: character_service,
        entries: entry_service.clone(),
        entries_query: entry_service,
    }
}

/// Build HTTP state from configuration, choosing Diesel adapters when a pool
/// is present and in-memory stores otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(JwtAccessTokens::new(
        &config.token_secret,
        config.token_ttl,
        clock.clone(),
    ));
    let ports = match &config.db_pool {
        Some(pool) => wire_ports(
            Stores {
                users: Arc::new(DieselUserRepository::new(pool.clone())),
                characters: Arc::new(DieselCharacterRepository::new(pool.clone())),
                entries: Arc::new(DieselSheetEntryRepository::new(pool.clone())),
            },
            tokens,
            clock,
        ),
        None => {
            info!("no database configured; records are kept in memory");
            wire_ports(
                Stores {
                    users: Arc::new(InMemoryUserRepository::new()),
                    characters: Arc::new(InMemoryCharacterRepository::new()),
                    entries: Arc::new(InMemorySheetEntryRepository::new()),
                },
                tokens,
                clock,
            )
        }
    };
    web::Data::new(HttpState::new(ports))
}
