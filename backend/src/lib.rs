//! Asset marketplace backend library.
//!
//! The crate follows a hexagonal layout: `domain` owns entities, services and
//! ports; `inbound` adapts HTTP requests onto driving ports; `outbound`
//! implements driven ports for PostgreSQL, in-process storage and credential
//! handling.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
