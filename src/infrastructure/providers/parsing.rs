//! # Upstream Payload Parsing
//!
//! Helpers shared by the adapters for turning loosely-typed upstream fields
//! into domain values.
//!
//! Upstreams disagree on encodings: durations arrive as ISO 8601 strings
//! (`PT2H10M`), times with or without an offset, prices as decimal strings
//! or split into units and nanos. Each adapter extracts the raw fields into
//! an [`OfferFields`] and calls [`OfferFields::into_offer`]; offers that fail
//! are dropped by [`keep_valid`] with a warning instead of failing the whole
//! response.

use crate::domain::entities::FlightOffer;
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::{CurrencyCode, Price, ProviderId, Timestamp};
use tracing::warn;

/// Parses an ISO 8601 duration into whole minutes.
///
/// Accepts the day and time components (`P1DT2H`, `PT2H10M`, `PT150M`,
/// `PT45M30S`); seconds are truncated. Year, month and week designators are
/// not meaningful for flight durations and are rejected.
///
/// # Examples
///
/// ```
/// use flight_aggregator::infrastructure::providers::parsing::parse_iso_duration_minutes;
///
/// assert_eq!(parse_iso_duration_minutes("PT2H10M"), Some(130));
/// assert_eq!(parse_iso_duration_minutes("P1DT2H"), Some(1560));
/// assert_eq!(parse_iso_duration_minutes("2h"), None);
/// ```
#[must_use]
pub fn parse_iso_duration_minutes(input: &str) -> Option<u32> {
    let rest = input.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut in_time = false;
    let mut digits = String::new();
    let mut seconds: u64 = 0;
    let mut seen_component = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            'T' if !in_time && digits.is_empty() => in_time = true,
            'D' | 'H' | 'M' | 'S' => {
                let value: u64 = digits.parse().ok()?;
                digits.clear();
                let unit = match (c, in_time) {
                    ('D', false) => 86_400,
                    ('H', true) => 3_600,
                    ('M', true) => 60,
                    ('S', true) => 1,
                    _ => return None,
                };
                seconds = seconds.checked_add(value.checked_mul(unit)?)?;
                seen_component = true;
            }
            _ => return None,
        }
    }

    if !digits.is_empty() || !seen_component {
        return None;
    }
    u32::try_from(seconds / 60).ok()
}

/// Parses an upstream timestamp (RFC 3339, or naive and read as UTC).
#[inline]
#[must_use]
pub fn parse_provider_time(input: &str) -> Option<Timestamp> {
    Timestamp::parse(input)
}

/// Raw fields of one upstream offer, prior to validation.
#[derive(Debug)]
pub struct OfferFields<'a> {
    /// Parsed price, or the reason it could not be parsed.
    pub price: DomainResult<Price>,
    /// Upstream currency; blank falls back to EUR.
    pub currency: Option<&'a str>,
    /// Duration if the upstream supplied a usable one.
    pub duration_minutes: Option<u32>,
    /// Departure time string.
    pub depart_at: &'a str,
    /// Arrival time string.
    pub arrive_at: &'a str,
}

impl OfferFields<'_> {
    /// Validates the fields and builds a [`FlightOffer`].
    ///
    /// A missing or zero duration is derived from the departure and arrival
    /// times.
    ///
    /// # Errors
    ///
    /// Returns a description of the first field that failed to parse.
    pub fn into_offer(self, provider: &ProviderId) -> Result<FlightOffer, String> {
        let price = self.price.map_err(|e| e.to_string())?;
        let currency = match self.currency.map(str::trim) {
            Some(code) if !code.is_empty() => CurrencyCode::new(code).map_err(|e| e.to_string())?,
            _ => CurrencyCode::eur(),
        };
        let depart = parse_provider_time(self.depart_at)
            .ok_or_else(|| format!("unparseable departure time {:?}", self.depart_at))?;
        let arrive = parse_provider_time(self.arrive_at)
            .ok_or_else(|| format!("unparseable arrival time {:?}", self.arrive_at))?;
        let duration = match self.duration_minutes {
            Some(minutes) if minutes > 0 => minutes,
            _ => depart
                .minutes_until(&arrive)
                .ok_or_else(|| "arrival precedes departure".to_string())?,
        };

        FlightOffer::new(provider.clone(), price, currency, duration, depart, arrive)
            .map_err(|e| e.to_string())
    }
}

/// Collects successfully parsed offers, logging and dropping the rest.
pub fn keep_valid<I>(provider: &ProviderId, candidates: I) -> Vec<FlightOffer>
where
    I: IntoIterator<Item = Result<FlightOffer, String>>,
{
    candidates
        .into_iter()
        .enumerate()
        .filter_map(|(index, candidate)| match candidate {
            Ok(offer) => Some(offer),
            Err(reason) => {
                warn!(provider = %provider, index, %reason, "Skipping unparseable offer");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod durations {
        use super::*;

        #[test]
        fn hours_and_minutes() {
            assert_eq!(parse_iso_duration_minutes("PT2H10M"), Some(130));
            assert_eq!(parse_iso_duration_minutes("PT2H"), Some(120));
        }

        #[test]
        fn minutes_only() {
            assert_eq!(parse_iso_duration_minutes("PT150M"), Some(150));
        }

        #[test]
        fn with_days() {
            assert_eq!(parse_iso_duration_minutes("P1DT2H"), Some(26 * 60));
            assert_eq!(parse_iso_duration_minutes("P1D"), Some(24 * 60));
        }

        #[test]
        fn seconds_are_truncated() {
            assert_eq!(parse_iso_duration_minutes("PT1M59S"), Some(1));
        }

        #[test]
        fn rejects_garbage() {
            for input in ["", "P", "PT", "2H10M", "PT2X", "PT10", "P1M", "PTT1H"] {
                assert_eq!(parse_iso_duration_minutes(input), None, "{input}");
            }
        }
    }

    mod offers {
        use super::*;

        fn provider() -> ProviderId {
            ProviderId::new("test")
        }

        fn fields<'a>(depart: &'a str, arrive: &'a str) -> OfferFields<'a> {
            OfferFields {
                price: Price::parse("99.90"),
                currency: Some("usd"),
                duration_minutes: Some(95),
                depart_at: depart,
                arrive_at: arrive,
            }
        }

        #[test]
        fn builds_offer() {
            let offer = fields("2025-10-01T08:00:00", "2025-10-01T09:35:00")
                .into_offer(&provider())
                .unwrap();
            assert_eq!(offer.duration_minutes(), 95);
            assert_eq!(offer.currency().as_str(), "USD");
            assert_eq!(offer.price(), Price::parse("99.9").unwrap());
        }

        #[test]
        fn derives_missing_duration() {
            let mut raw = fields("2025-10-01T08:00:00Z", "2025-10-01T10:30:00Z");
            raw.duration_minutes = Some(0);
            let offer = raw.into_offer(&provider()).unwrap();
            assert_eq!(offer.duration_minutes(), 150);
        }

        #[test]
        fn blank_currency_defaults_to_eur() {
            let mut raw = fields("2025-10-01T08:00:00", "2025-10-01T09:35:00");
            raw.currency = Some(" ");
            let offer = raw.into_offer(&provider()).unwrap();
            assert_eq!(offer.currency(), &CurrencyCode::eur());
        }

        #[test]
        fn bad_time_is_rejected() {
            let err = fields("soon", "2025-10-01T09:35:00")
                .into_offer(&provider())
                .unwrap_err();
            assert!(err.contains("departure"));
        }

        #[test]
        fn keep_valid_drops_failures() {
            let good = fields("2025-10-01T08:00:00", "2025-10-01T09:35:00").into_offer(&provider());
            let bad = fields("2025-10-01T08:00:00", "later").into_offer(&provider());
            let kept = keep_valid(&provider(), vec![good, bad]);
            assert_eq!(kept.len(), 1);
        }
    }
}
