//! # Application Layer
//!
//! Use-case orchestration on top of the domain and the providers.
//!
//! - [`services`]: Aggregation engine, ranking, cache, streaming sessions
//! - [`error`]: Errors surfaced to API callers

pub mod error;
pub mod services;
