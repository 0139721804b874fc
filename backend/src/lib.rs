//! Ticket-sales backend with a race-free stock reservation core.
//!
//! Layering follows the hexagonal convention: `domain` holds entities,
//! services, and ports; `inbound` adapts HTTP onto driving ports; `outbound`
//! implements driven ports over PostgreSQL (Diesel), Redis, and bcrypt;
//! `server` wires the pieces together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
