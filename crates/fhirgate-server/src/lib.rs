//! fhirgate HTTP server
//!
//! REST transport over the fhirgate services:
//! - `POST /api/v1/parser/parse` and `POST /api/v1/parser/convert`
//! - `POST /api/v1/validation/validate` plus raw `validate/json` and `validate/xml`
//! - `GET /api/v1/validation/version`, `GET /api/v1/info` and `GET /health`

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Args, ServerConfig};
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::AppState;
