//! # fhirgate-mcp
//!
//! Model Context Protocol server for the fhirgate services. Speaks
//! newline-delimited JSON-RPC 2.0 over stdio and offers tools to parse,
//! convert and validate FHIR resources.

pub mod error;
pub mod protocol;
pub mod server;
pub mod tools;

pub use error::{McpError, Result};
pub use server::McpServer;
pub use tools::FhirTools;
