//! warden authorization server.
//!
//! This crate exposes the authorization pipeline over HTTP so that an
//! orchestration server can ask, per inbound API call, whether the caller's
//! bearer token permits it.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
