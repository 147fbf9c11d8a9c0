//! # HTTP Client Utilities
//!
//! Shared HTTP client for provider adapters.
//!
//! This module provides a reqwest wrapper with:
//! - A process-wide request timeout, tightened per call to the search deadline
//! - JSON and form request helpers
//! - Mapping of transport failures and non-2xx statuses onto [`ProviderError`]
//!
//! # Examples
//!
//! ```ignore
//! use flight_aggregator::infrastructure::providers::http_client::HttpClient;
//!
//! let client = HttpClient::new(Duration::from_secs(15))?;
//! let response: MyResponse = client
//!     .get_json(url, &[("q", "x")], HeaderMap::new(), ctx.remaining()?)
//!     .await?;
//! ```

use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Maximum number of body characters quoted in error messages.
const ERROR_BODY_EXCERPT: usize = 256;

/// HTTP client wrapper for provider adapters.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client.
    client: Client,
    /// Upper bound for any single request.
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client with the specified request timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Internal` if the client cannot be created.
    pub fn new(timeout: Duration) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    /// Makes a GET request with query parameters and headers, and decodes
    /// the JSON response.
    ///
    /// `budget` is the time left on the caller's deadline; the request is
    /// bounded by the smaller of it and the client timeout.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Timeout`/`Connection` if the request fails,
    /// a status-specific error for non-2xx responses, and
    /// `ProviderError::Protocol` if the body cannot be decoded.
    pub async fn get_json<T, P>(
        &self,
        url: &str,
        params: &P,
        headers: HeaderMap,
        budget: Duration,
    ) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self.client.get(url).query(params).headers(headers);
        self.send(request, budget).await
    }

    /// Makes a POST request with a JSON body and headers, and decodes the
    /// JSON response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn post_json<T, B>(
        &self,
        url: &str,
        body: &B,
        headers: HeaderMap,
        budget: Duration,
    ) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.post(url).json(body).headers(headers);
        self.send(request, budget).await
    }

    /// Makes a POST request with a form-encoded body and decodes the JSON
    /// response.
    ///
    /// # Errors
    ///
    /// See [`get_json`](Self::get_json).
    pub async fn post_form<T, B>(&self, url: &str, form: &B, budget: Duration) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.post(url).form(form);
        self.send(request, budget).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        budget: Duration,
    ) -> ProviderResult<T> {
        let response = request
            .timeout(budget.min(self.timeout))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        handle_response(response).await
    }
}

/// Builds a header map from name/value pairs.
///
/// # Errors
///
/// Returns `ProviderError::InvalidRequest` if a value contains characters
/// not allowed in HTTP headers (for example a newline in a pasted API key).
pub fn headers<'a, I>(pairs: I) -> ProviderResult<HeaderMap>
where
    I: IntoIterator<Item = (&'static str, &'a str)>,
{
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProviderError::invalid_request(format!("header {name}: {e}")))?;
        map.insert(HeaderName::from_static(name), value);
    }
    Ok(map)
}

/// Builds an `Authorization: Bearer` header map.
///
/// # Errors
///
/// See [`headers`].
pub fn bearer(token: &str) -> ProviderResult<HeaderMap> {
    headers([("authorization", format!("Bearer {token}").as_str())])
}

/// Checks the status and decodes the JSON body.
async fn handle_response<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let status = response.status();

    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::protocol(format!("failed to parse response: {e}")))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }
}

/// Maps a reqwest error to a `ProviderError`.
fn map_reqwest_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::timeout(format!("request timed out: {error}"))
    } else if error.is_connect() {
        ProviderError::connection(format!("connection failed: {error}"))
    } else if error.is_decode() {
        ProviderError::protocol(format!("failed to read response: {error}"))
    } else {
        ProviderError::connection(format!("HTTP request failed: {error}"))
    }
}

/// Maps a non-success HTTP status to a `ProviderError`.
fn map_status_error(status: StatusCode, body: &str) -> ProviderError {
    let body = excerpt(body);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::invalid_request(format!("{status}: {body}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::authentication(format!("{status}: {body}"))
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(format!("{status}: {body}")),
        _ => ProviderError::upstream(status.as_u16(), body),
    }
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= ERROR_BODY_EXCERPT {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(ERROR_BODY_EXCERPT).collect();
        format!("{head}…")
    }
}
