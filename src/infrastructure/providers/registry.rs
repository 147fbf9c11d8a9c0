//! # Provider Registry
//!
//! Builds the ordered provider list from configuration.
//!
//! Registration order is the order of `providers.enabled`. The engine
//! concatenates offer lists in this order, so it decides which of two
//! equally cheap (or equally fast) offers is reported.

use crate::domain::value_objects::{Price, Timestamp};
use crate::infrastructure::config::ProvidersSettings;
use crate::infrastructure::providers::amadeus::{self, AmadeusProvider};
use crate::infrastructure::providers::duffel::{self, DuffelProvider};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::HttpClient;
use crate::infrastructure::providers::mock::{DEFAULT_DEPARTURE_SECS, MockProvider};
use crate::infrastructure::providers::rapid_booking::{self, RapidBookingProvider};
use crate::infrastructure::providers::traits::FlightProvider;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Name of the in-process demo provider.
pub const MOCK: &str = "mock";

/// Shared provider handle.
pub type SharedProvider = Arc<dyn FlightProvider>;

/// Instantiates every enabled provider, in configuration order.
///
/// All HTTP adapters share one connection pool.
///
/// # Errors
///
/// Returns `ProviderError::InvalidRequest` for an unknown provider name and
/// `ProviderError::Internal` if the HTTP client cannot be built.
pub fn build_providers(settings: &ProvidersSettings) -> ProviderResult<Vec<SharedProvider>> {
    let http = HttpClient::new(settings.http_timeout())?;

    let providers = settings
        .enabled
        .iter()
        .map(|name| -> ProviderResult<SharedProvider> {
            match name.as_str() {
                amadeus::NAME => Ok(Arc::new(AmadeusProvider::new(http.clone(), &settings.amadeus))),
                duffel::NAME => Ok(Arc::new(DuffelProvider::new(http.clone(), &settings.duffel))),
                rapid_booking::NAME => Ok(Arc::new(RapidBookingProvider::new(
                    http.clone(),
                    &settings.rapid_booking,
                ))),
                MOCK => Ok(Arc::new(demo_provider())),
                other => Err(ProviderError::invalid_request(format!(
                    "unknown provider {other:?}"
                ))),
            }
        })
        .collect::<ProviderResult<Vec<_>>>()?;

    info!(
        providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Registered flight providers"
    );
    Ok(providers)
}

/// A mock with a small fixed schedule and a short simulated latency.
fn demo_provider() -> MockProvider {
    let base = Timestamp::from_secs(DEFAULT_DEPARTURE_SECS).unwrap_or_else(Timestamp::now);
    [(18_900, 155, 0), (12_450, 210, 180), (23_000, 125, 420)]
        .into_iter()
        .fold(
            MockProvider::new(MOCK).with_delay(Duration::from_millis(150)),
            |provider, (cents, minutes, offset)| match Price::new(Decimal::new(cents, 2)) {
                Ok(price) => provider.with_offer_at(price, minutes, base.add_minutes(offset)),
                Err(_) => provider,
            },
        )
}
