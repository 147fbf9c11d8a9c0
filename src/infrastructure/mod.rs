//! # Infrastructure Layer
//!
//! Everything that talks to the outside world.
//!
//! - [`providers`]: Upstream flight adapters and the provider registry
//! - [`config`]: Layered configuration
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod logging;
pub mod providers;
