//! Tools and resources served over the MCP protocol
//!
//! Provides the registries the dispatcher resolves names against, and the built-in handlers.

pub mod news;
pub mod resources;
pub mod tools;
pub mod utils;
