//! HTTP API: configuration, request authentication, routing, and the
//! application services that coordinate the identity and post stores.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
