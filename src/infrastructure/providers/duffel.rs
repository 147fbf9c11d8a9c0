//! # Duffel Adapter
//!
//! Flight offers from the Duffel offer-requests API. A single offer request
//! with `return_offers=true` yields priced offers inline.

use crate::domain::entities::FlightOffer;
use crate::domain::value_objects::{Price, ProviderId};
use crate::infrastructure::config::DuffelSettings;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::http_client::{HttpClient, bearer};
use crate::infrastructure::providers::parsing::{OfferFields, keep_valid, parse_iso_duration_minutes};
use crate::infrastructure::providers::traits::{FlightProvider, SearchContext};
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Provider name.
pub const NAME: &str = "duffel";

const OFFER_REQUESTS_PATH: &str = "/air/offer_requests?return_offers=true";
const API_VERSION: &str = "v2";

/// Duffel offer-requests adapter.
#[derive(Debug)]
pub struct DuffelProvider {
    id: ProviderId,
    http: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl DuffelProvider {
    /// Creates the adapter. A missing token is reported on search.
    #[must_use]
    pub fn new(http: HttpClient, settings: &DuffelSettings) -> Self {
        Self {
            id: ProviderId::new(NAME),
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    fn to_offers(&self, payload: OfferRequestResponse) -> Vec<FlightOffer> {
        let candidates = payload.data.offers.into_iter().filter_map(|offer| {
            let slice = offer.slices.into_iter().next()?;
            let first = slice.segments.first()?;
            let last = slice.segments.last()?;
            let duration = slice
                .duration
                .as_deref()
                .or(first.duration.as_deref())
                .and_then(parse_iso_duration_minutes);
            Some(
                OfferFields {
                    price: Price::parse(&offer.total_amount),
                    currency: offer.total_currency.as_deref(),
                    duration_minutes: duration,
                    depart_at: &first.departing_at,
                    arrive_at: &last.arriving_at,
                }
                .into_offer(&self.id),
            )
        });
        keep_valid(&self.id, candidates.collect::<Vec<_>>())
    }
}

#[async_trait]
impl FlightProvider for DuffelProvider {
    fn name(&self) -> &str {
        NAME
    }

    #[instrument(skip_all, fields(provider = NAME, query = %ctx.query()))]
    async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| ProviderError::missing_credentials("duffel token is required"))?;

        let query = ctx.query();
        let body = OfferRequestEnvelope {
            data: OfferRequest {
                slices: [SliceRequest {
                    origin: query.origin().as_str(),
                    destination: query.destination().as_str(),
                    departure_date: query.date().as_str(),
                }],
                passengers: [Passenger { kind: "adult" }],
                cabin_class: "economy",
            },
        };

        let mut headers = bearer(token)?;
        headers.insert("duffel-version", HeaderValue::from_static(API_VERSION));

        let payload: OfferRequestResponse = self
            .http
            .post_json(
                &format!("{}{OFFER_REQUESTS_PATH}", self.base_url),
                &body,
                headers,
                ctx.remaining()?,
            )
            .await?;

        Ok(self.to_offers(payload))
    }
}

#[derive(Debug, Serialize)]
struct OfferRequestEnvelope<'a> {
    data: OfferRequest<'a>,
}

#[derive(Debug, Serialize)]
struct OfferRequest<'a> {
    slices: [SliceRequest<'a>; 1],
    passengers: [Passenger; 1],
    cabin_class: &'static str,
}

#[derive(Debug, Serialize)]
struct SliceRequest<'a> {
    origin: &'a str,
    destination: &'a str,
    departure_date: &'a str,
}

#[derive(Debug, Serialize)]
struct Passenger {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct OfferRequestResponse {
    data: OfferRequestData,
}

#[derive(Debug, Deserialize)]
struct OfferRequestData {
    #[serde(default)]
    offers: Vec<Offer>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    total_amount: String,
    total_currency: Option<String>,
    #[serde(default)]
    slices: Vec<Slice>,
}

#[derive(Debug, Deserialize)]
struct Slice {
    duration: Option<String>,
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
struct Segment {
    departing_at: String,
    arriving_at: String,
    duration: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SearchQuery;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str, token: Option<&str>) -> DuffelProvider {
        DuffelProvider::new(
            HttpClient::new(Duration::from_secs(5)).unwrap(),
            &DuffelSettings {
                base_url: base_url.to_string(),
                token: token.map(str::to_string),
            },
        )
    }

    fn ctx() -> SearchContext {
        SearchContext::with_timeout(
            SearchQuery::parse("LHR", "JFK", "2025-11-20").unwrap(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn posts_offer_request_and_maps_offers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/air/offer_requests"))
            .and(query_param("return_offers", "true"))
            .and(header("authorization", "Bearer duffel_test"))
            .and(header("duffel-version", "v2"))
            .and(body_partial_json(json!({
                "data": {
                    "slices": [{"origin": "LHR", "destination": "JFK", "departure_date": "2025-11-20"}],
                    "passengers": [{"type": "adult"}],
                    "cabin_class": "economy"
                }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"offers": [
                    {
                        "total_amount": "412.30",
                        "total_currency": "GBP",
                        "slices": [{
                            "duration": "PT8H5M",
                            "segments": [{
                                "departing_at": "2025-11-20T10:00:00",
                                "arriving_at": "2025-11-20T13:05:00",
                                "duration": "PT8H5M"
                            }]
                        }]
                    },
                    {"total_amount": "1.00", "total_currency": "GBP", "slices": []}
                ]}
            })))
            .mount(&server)
            .await;

        let offers = provider(&server.uri(), Some("duffel_test"))
            .search(&ctx())
            .await
            .unwrap();

        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].provider().as_str(), "duffel");
        assert_eq!(offers[0].currency().as_str(), "GBP");
        assert_eq!(offers[0].duration_minutes(), 485);
        assert_eq!(offers[0].price(), Price::parse("412.3").unwrap());
    }

    #[tokio::test]
    async fn falls_back_to_segment_duration() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"offers": [{
                    "total_amount": "80",
                    "total_currency": "EUR",
                    "slices": [{"segments": [{
                        "departing_at": "2025-11-20T10:00:00Z",
                        "arriving_at": "2025-11-20T11:30:00Z",
                        "duration": "PT1H30M"
                    }]}]
                }]}
            })))
            .mount(&server)
            .await;

        let offers = provider(&server.uri(), Some("t")).search(&ctx()).await.unwrap();
        assert_eq!(offers[0].duration_minutes(), 90);
    }

    #[tokio::test]
    async fn missing_token_is_reported() {
        let err = provider("http://127.0.0.1:9", None)
            .search(&ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredentials { .. }));
    }

    #[tokio::test]
    async fn undecodable_body_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"errors": []})))
            .mount(&server)
            .await;

        let err = provider(&server.uri(), Some("t")).search(&ctx()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Protocol { .. }));
    }
}
