//! # Amadeus Adapter
//!
//! Flight offers from the Amadeus Self-Service `flight-offers` API.
//!
//! Authentication is OAuth2 client credentials. The access token is cached
//! and reused until shortly before it expires; concurrent searches that find
//! it stale queue on an async mutex so only one of them refreshes it.

use crate::domain::entities::FlightOffer;
use crate::domain::value_objects::{Price, ProviderId};
use crate::infrastructure::config::AmadeusSettings;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::{HttpClient, bearer};
use crate::infrastructure::providers::parsing::{OfferFields, keep_valid, parse_iso_duration_minutes};
use crate::infrastructure::providers::traits::{FlightProvider, SearchContext};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Provider name.
pub const NAME: &str = "amadeus";

const TOKEN_PATH: &str = "/v1/security/oauth2/token";
const SEARCH_PATH: &str = "/v2/shopping/flight-offers";

/// A token is refreshed this long before it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Amadeus flight-offers adapter.
#[derive(Debug)]
pub struct AmadeusProvider {
    id: ProviderId,
    http: HttpClient,
    base_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    token: Mutex<Option<CachedToken>>,
}

impl AmadeusProvider {
    /// Creates the adapter. Missing credentials are reported on search.
    #[must_use]
    pub fn new(http: HttpClient, settings: &AmadeusSettings) -> Self {
        Self {
            id: ProviderId::new(NAME),
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: non_blank(settings.client_id.as_deref()),
            client_secret: non_blank(settings.client_secret.as_deref()),
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self, ctx: &SearchContext) -> ProviderResult<String> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(ProviderError::missing_credentials(
                "amadeus client id and secret are required",
            ));
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| Instant::now() < t.refresh_at) {
            return Ok(token.value.clone());
        }

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];
        let response: TokenResponse = self
            .http
            .post_form(&format!("{}{TOKEN_PATH}", self.base_url), &form, ctx.remaining()?)
            .await
            .map_err(|e| match e {
                ProviderError::InvalidRequest { message } => ProviderError::authentication(message),
                other => other,
            })?;

        if response.access_token.is_empty() {
            return Err(ProviderError::authentication("empty access token"));
        }

        let lifetime = Duration::from_secs(response.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        debug!(expires_in = response.expires_in, "Refreshed amadeus access token");
        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(response.access_token)
    }

    fn to_offers(&self, payload: SearchResponse) -> Vec<FlightOffer> {
        let candidates = payload.data.into_iter().filter_map(|offer| {
            let itinerary = offer.itineraries.into_iter().next()?;
            let first = itinerary.segments.first()?;
            let last = itinerary.segments.last()?;
            Some(
                OfferFields {
                    price: Price::parse(&offer.price.total),
                    currency: offer.price.currency.as_deref(),
                    duration_minutes: itinerary
                        .duration
                        .as_deref()
                        .and_then(parse_iso_duration_minutes),
                    depart_at: &first.departure.at,
                    arrive_at: &last.arrival.at,
                }
                .into_offer(&self.id),
            )
        });
        keep_valid(&self.id, candidates.collect::<Vec<_>>())
    }
}

#[async_trait]
impl FlightProvider for AmadeusProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME, query = %ctx.query()))]
    async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
        let token = self.access_token(ctx).await?;
        let query = ctx.query();
        let params = [
            ("originLocationCode", query.origin().as_str()),
            ("destinationLocationCode", query.destination().as_str()),
            ("departureDate", query.date().as_str()),
            ("adults", "1"),
            ("currencyCode", "EUR"),
            ("max", "5"),
        ];

        let payload: SearchResponse = self
            .http
            .get_json(
                &format!("{}{SEARCH_PATH}", self.base_url),
                &params,
                bearer(&token)?,
                ctx.remaining()?,
            )
            .await?;

        Ok(self.to_offers(payload))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<OfferData>,
}

#[derive(Debug, Deserialize)]
struct OfferData {
    price: PriceData,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    total: String,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    duration: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    departure: Endpoint,
    arrival: Endpoint,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    at: String,
}
