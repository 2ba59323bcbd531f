//! HTTP surface for the analysis core.
//!
//! Routes are nested under `/api/`. Handlers validate input, hand the
//! blocking pipeline work to `spawn_blocking`, and return JSON.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve_until_shutdown, start_server_on, ApiServer};
pub use types::ApiContext;
