//! Model Context Protocol (MCP) server handling and JSON-RPC implementations
//!
//! Provides envelope decoding and encoding, and the method dispatcher.

pub mod rpc;
pub mod server;
