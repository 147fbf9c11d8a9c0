//! # API Layer
//!
//! HTTP surface of the service.
//!
//! - [`rest`]: Router, one-shot handlers, error rendering
//! - [`streaming`]: SSE and WebSocket push transports
//! - [`auth`]: JWT login and request authentication

pub mod auth;
pub mod rest;
pub mod streaming;
