//! # Flight Offer Entity
//!
//! Canonical, provider-agnostic representation of one flight option.
//!
//! Every adapter translates its upstream payload into [`FlightOffer`]s; from
//! that point on the aggregation engine never looks at provider-specific data.
//!
//! # Examples
//!
//! ```
//! use flight_aggregator::domain::entities::FlightOffer;
//! use flight_aggregator::domain::value_objects::{CurrencyCode, Price, ProviderId, Timestamp};
//!
//! let depart = Timestamp::parse("2025-10-01T08:00:00Z").unwrap();
//! let offer = FlightOffer::new(
//!     ProviderId::new("duffel"),
//!     Price::parse("150").unwrap(),
//!     CurrencyCode::eur(),
//!     90,
//!     depart,
//!     depart.add_minutes(90),
//! )
//! .unwrap();
//!
//! assert_eq!(offer.duration_minutes(), 90);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{CurrencyCode, Price, ProviderId, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A priced, timed flight option returned by a provider.
///
/// Immutable once constructed. Two offers with equal fields are equal; no
/// deduplication key is derived.
///
/// # Invariants
///
/// - `arrive_at` is not before `depart_at`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightOffer {
    /// Source of the offer.
    provider: ProviderId,
    /// Total price.
    price: Price,
    /// Currency of `price`.
    currency: CurrencyCode,
    /// Door-to-door duration in minutes.
    #[serde(rename = "duration_min")]
    duration_minutes: u32,
    /// Departure of the first segment.
    depart_at: Timestamp,
    /// Arrival of the last segment.
    arrive_at: Timestamp,
}

impl FlightOffer {
    /// Creates an offer.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOffer` if `arrive_at` is before
    /// `depart_at`.
    pub fn new(
        provider: ProviderId,
        price: Price,
        currency: CurrencyCode,
        duration_minutes: u32,
        depart_at: Timestamp,
        arrive_at: Timestamp,
    ) -> DomainResult<Self> {
        if depart_at.is_after(&arrive_at) {
            return Err(DomainError::invalid_offer(format!(
                "arrival {arrive_at} precedes departure {depart_at}"
            )));
        }
        Ok(Self {
            provider,
            price,
            currency,
            duration_minutes,
            depart_at,
            arrive_at,
        })
    }

    /// Creates an offer arriving `duration_minutes` after `depart_at`.
    ///
    /// Infallible because the arrival can never precede the departure.
    #[must_use]
    pub fn scheduled(
        provider: ProviderId,
        price: Price,
        currency: CurrencyCode,
        duration_minutes: u32,
        depart_at: Timestamp,
    ) -> Self {
        Self {
            provider,
            price,
            currency,
            duration_minutes,
            depart_at,
            arrive_at: depart_at.add_minutes(i64::from(duration_minutes)),
        }
    }

    /// Returns the provider that produced this offer.
    #[inline]
    #[must_use]
    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Returns the price.
    #[inline]
    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Returns the currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    /// Returns the duration in minutes.
    #[inline]
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Returns the departure time.
    #[inline]
    #[must_use]
    pub fn depart_at(&self) -> Timestamp {
        self.depart_at
    }

    /// Returns the arrival time.
    #[inline]
    #[must_use]
    pub fn arrive_at(&self) -> Timestamp {
        self.arrive_at
    }
}

impl fmt::Display for FlightOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FlightOffer({} {} {} {}min dep={})",
            self.provider, self.price, self.currency, self.duration_minutes, self.depart_at
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn depart() -> Timestamp {
        Timestamp::parse("2025-10-01T08:00:00Z").unwrap()
    }

    fn offer(minutes: u32) -> DomainResult<FlightOffer> {
        FlightOffer::new(
            ProviderId::new("p1"),
            Price::parse("200").unwrap(),
            CurrencyCode::eur(),
            minutes,
            depart(),
            depart().add_minutes(i64::from(minutes)),
        )
    }

    #[test]
    fn accessors() {
        let o = offer(120).unwrap();
        assert_eq!(o.provider().as_str(), "p1");
        assert_eq!(o.price(), Price::parse("200").unwrap());
        assert_eq!(o.currency().as_str(), "EUR");
        assert_eq!(o.duration_minutes(), 120);
        assert_eq!(o.depart_at().minutes_until(&o.arrive_at()), Some(120));
    }

    #[test]
    fn arrival_before_departure_is_rejected() {
        let result = FlightOffer::new(
            ProviderId::new("p1"),
            Price::parse("1").unwrap(),
            CurrencyCode::eur(),
            10,
            depart(),
            depart().add_minutes(-5),
        );
        assert!(matches!(result, Err(DomainError::InvalidOffer(_))));
    }

    #[test]
    fn same_instant_is_allowed() {
        let result = FlightOffer::new(
            ProviderId::new("p1"),
            Price::parse("1").unwrap(),
            CurrencyCode::eur(),
            0,
            depart(),
            depart(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn scheduled_matches_checked_constructor() {
        let scheduled = FlightOffer::scheduled(
            ProviderId::new("p1"),
            Price::parse("200").unwrap(),
            CurrencyCode::eur(),
            75,
            depart(),
        );
        assert_eq!(scheduled, offer(75).unwrap());
    }

    #[test]
    fn wire_format() {
        let json = serde_json::to_value(offer(90).unwrap()).unwrap();
        assert_eq!(json["provider"], "p1");
        assert_eq!(json["price"], 200.0);
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["duration_min"], 90);
        assert_eq!(json["depart_at"], "2025-10-01T08:00:00Z");
        assert_eq!(json["arrive_at"], "2025-10-01T09:30:00Z");
    }

    #[test]
    fn display_mentions_provider() {
        assert!(offer(60).unwrap().to_string().contains("p1"));
    }
}
