//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CharacterCommand, CharacterQuery, IdentityCommand, SheetEntryCommand, SheetEntryQuery,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub identity: Arc<dyn IdentityCommand>,
    pub characters: Arc<dyn CharacterCommand>,
    pub characters_query: Arc<dyn CharacterQuery>,
    pub entries: Arc<dyn SheetEntryCommand>,
    pub entries_query: Arc<dyn SheetEntryQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<dyn IdentityCommand>,
    pub characters: Arc<dyn CharacterCommand>,
    pub characters_query: Arc<dyn CharacterQuery>,
    pub entries: Arc<dyn SheetEntryCommand>,
    pub entries_query: Arc<dyn SheetEntryQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            identity,
            characters,
            characters_query,
            entries,
            entries_query,
        } = ports;
        Self {
            identity,
            characters,
            characters_query,
            entries,
            entries_query,
        }
    }
}
