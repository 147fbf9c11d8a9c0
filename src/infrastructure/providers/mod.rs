//! # Flight Providers
//!
//! Adapters for upstream flight-inventory sources.
//!
//! # Modules
//!
//! - [`traits`]: The [`FlightProvider`] port and its [`SearchContext`]
//! - [`error`]: Provider error types
//! - [`http_client`]: Shared reqwest wrapper
//! - [`parsing`]: Duration/time/price helpers shared by adapters
//! - [`amadeus`], [`duffel`], [`rapid_booking`]: Upstream adapters
//! - [`mock`]: Scripted in-process provider
//! - [`registry`]: Builds the ordered provider list from configuration

pub mod amadeus;
pub mod duffel;
pub mod error;
pub mod http_client;
pub mod mock;
pub mod parsing;
pub mod rapid_booking;
pub mod registry;
pub mod traits;

pub use error::{ProviderError, ProviderResult};
pub use mock::MockProvider;
pub use registry::{SharedProvider, build_providers};
pub use traits::{FlightProvider, SearchContext};
