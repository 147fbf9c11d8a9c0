//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Query Types
//!
//! - [`AirportCode`]: Three-letter IATA code, uppercase
//! - [`DepartureDate`]: Free-form, non-empty date string
//! - [`SearchQuery`]: Route + date; also the cache key
//!
//! ## Offer Fields
//!
//! - [`Price`]: Non-negative decimal amount
//! - [`CurrencyCode`]: ISO 4217 code
//! - [`ProviderId`]: Source identifier
//! - [`Timestamp`]: UTC instant

pub mod airport;
pub mod ids;
pub mod price;
pub mod query;
pub mod timestamp;

pub use airport::AirportCode;
pub use ids::ProviderId;
pub use price::{CurrencyCode, Price};
pub use query::{DepartureDate, SearchQuery};
pub use timestamp::Timestamp;
