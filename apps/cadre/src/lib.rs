//! # cadre (library)
//!
//! Library surface of the Cadre binary: the HTTP API, the CLI, and the
//! app configuration. Exposed so integration tests can drive the router
//! without a running process.

pub mod api;
pub mod cli;
pub mod config;
