//! # Domain Entities
//!
//! - [`FlightOffer`]: one priced, timed flight option from a provider

pub mod offer;

pub use offer::FlightOffer;
