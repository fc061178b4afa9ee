//! HTTP/WebSocket edge for the Monopoly simulation kernel, split out as a
//! library so integration tests can build a router without spawning the
//! binary's `main`.

pub mod api;
pub mod config;
