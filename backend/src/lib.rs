//! Character sheet backend library.
//!
//! Hexagonal layout: [`domain`] holds entities, ports, and services;
//! [`inbound`] adapts HTTP onto the driving ports; [`outbound`] implements
//! the driven ports over PostgreSQL, memory, and JWT.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
