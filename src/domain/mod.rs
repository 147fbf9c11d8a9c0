//! # Domain Layer
//!
//! Provider-agnostic types for flight search.
//!
//! - [`value_objects`]: Airport codes, queries, prices, timestamps
//! - [`entities`]: The canonical [`entities::FlightOffer`]
//! - [`services`]: Pure domain computations (price history)
//! - [`errors`]: Validation failures

pub mod entities;
pub mod errors;
pub mod services;
pub mod value_objects;
