//! # RapidAPI Booking Adapter
//!
//! Flight offers from the Booking.com flights API published on RapidAPI.
//!
//! The upstream wraps every response in a `{status, message, data}`
//! envelope and reports failures with `status: false` on an HTTP 200, so
//! the envelope is checked before any offer is read.

use crate::domain::entities::FlightOffer;
use crate::domain::value_objects::{Price, ProviderId};
use crate::infrastructure::config::RapidBookingSettings;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::{HttpClient, headers};
use crate::infrastructure::providers::parsing::{OfferFields, keep_valid};
use crate::infrastructure::providers::traits::{FlightProvider, SearchContext};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::instrument;

/// Provider name.
pub const NAME: &str = "rapid-booking";

const SEARCH_PATH: &str = "/api/v1/flights/searchFlights";

/// RapidAPI Booking flights adapter.
#[derive(Debug)]
pub struct RapidBookingProvider {
    id: ProviderId,
    http: HttpClient,
    base_url: String,
    host: String,
    api_key: Option<String>,
}

impl RapidBookingProvider {
    /// Creates the adapter. A missing API key is reported on search.
    #[must_use]
    pub fn new(http: HttpClient, settings: &RapidBookingSettings) -> Self {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        let host = Url::parse(&base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        Self {
            id: ProviderId::new(NAME),
            http,
            base_url,
            host,
            api_key: settings
                .api_key
                .as_deref()
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
        }
    }

    fn to_offers(&self, data: SearchData) -> Vec<FlightOffer> {
        let candidates = data.flight_offers.iter().filter_map(|offer| {
            let segment = offer.segments.first()?;
            let total = &offer.price_breakdown.total;
            Some(
                OfferFields {
                    price: Price::from_units_and_nanos(total.units, total.nanos),
                    currency: total.currency_code.as_deref(),
                    duration_minutes: u32::try_from(segment.total_time / 60).ok(),
                    depart_at: &segment.departure_time,
                    arrive_at: &segment.arrival_time,
                }
                .into_offer(&self.id),
            )
        });
        keep_valid(&self.id, candidates.collect::<Vec<_>>())
    }
}

#[async_trait]
impl FlightProvider for RapidBookingProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME, query = %ctx.query()))]
    async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::missing_credentials("rapid booking API key is required"))?;

        let query = ctx.query();
        let from_id = format!("{}.AIRPORT", query.origin());
        let to_id = format!("{}.AIRPORT", query.destination());
        let params = [
            ("fromId", from_id.as_str()),
            ("toId", to_id.as_str()),
            ("departDate", query.date().as_str()),
            ("stops", "none"),
            ("pageNo", "1"),
            ("adults", "1"),
            ("children", "0"),
            ("sort", "BEST"),
            ("cabinClass", "ECONOMY"),
            ("currency_code", "EUR"),
        ];
        let request_headers = headers([
            ("x-rapidapi-key", api_key),
            ("x-rapidapi-host", self.host.as_str()),
        ])?;

        let envelope: SearchEnvelope = self
            .http
            .get_json(
                &format!("{}{SEARCH_PATH}", self.base_url),
                &params,
                request_headers,
                ctx.remaining()?,
            )
            .await?;

        if !envelope.status {
            return Err(ProviderError::protocol(format!(
                "rapid booking reported failure: {}",
                envelope.message.unwrap_or_else(|| "no message".to_string())
            )));
        }

        Ok(self.to_offers(envelope.data))
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    status: bool,
    message: Option<String>,
    #[serde(default)]
    data: SearchData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    #[serde(default)]
    flight_offers: Vec<RapidOffer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RapidOffer {
    #[serde(default)]
    segments: Vec<RapidSegment>,
    price_breakdown: PriceBreakdown,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RapidSegment {
    departure_time: String,
    arrival_time: String,
    /// Seconds.
    #[serde(default)]
    total_time: i64,
}

#[derive(Debug, Deserialize)]
struct PriceBreakdown {
    total: Money,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Money {
    currency_code: Option<String>,
    #[serde(default)]
    units: i64,
    #[serde(default)]
    nanos: i64,
}
