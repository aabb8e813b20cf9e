//! MCP stdio server exposing skill search and listing tools.

pub mod error;
pub mod format;
pub mod server;

pub use error::McpServerError;
pub use server::{ResponseOptions, SearchRequest, SkillServer, serve_stdio};
