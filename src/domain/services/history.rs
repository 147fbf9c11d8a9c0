//! # Price History Service
//!
//! Synthetic monthly average prices for a route.
//!
//! The series is a pure function of the route, the number of months and the
//! month it ends at: the same inputs always produce the same output and no
//! provider is contacted. Peak months (July, August, December) carry a 25%
//! seasonal premium, and each route gets a small fixed offset derived from its
//! airport codes.
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use flight_aggregator::domain::services::history::HistoryService;
//! use flight_aggregator::domain::value_objects::AirportCode;
//!
//! let service = HistoryService::new();
//! let as_of = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
//! let series = service
//!     .monthly_averages(
//!         &AirportCode::new("GRU").unwrap(),
//!         &AirportCode::new("JFK").unwrap(),
//!         3,
//!         as_of,
//!     )
//!     .unwrap();
//!
//! let months: Vec<_> = series.iter().map(|p| p.month.as_str()).collect();
//! assert_eq!(months, ["2025-01", "2025-02", "2025-03"]);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::{AirportCode, CurrencyCode, Price};
use chrono::{Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of months returned when the caller asks for zero.
pub const DEFAULT_MONTHS: u32 = 24;

/// Upper bound on the requested series length.
pub const MAX_MONTHS: u32 = 120;

/// One point of the monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// Month in `YYYY-MM` form.
    pub month: String,
    /// Average price for the month.
    pub avg_price: Price,
    /// Currency of `avg_price`.
    pub currency: CurrencyCode,
}

/// Generator for synthetic monthly price averages.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryService;

impl HistoryService {
    /// Creates a new history service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns `months` points ending at the month containing `as_of`,
    /// oldest first. Zero selects [`DEFAULT_MONTHS`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutOfRange` if `months` exceeds [`MAX_MONTHS`].
    pub fn monthly_averages(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        months: u32,
        as_of: NaiveDate,
    ) -> DomainResult<Vec<MonthPoint>> {
        let months = if months == 0 { DEFAULT_MONTHS } else { months };
        if months > MAX_MONTHS {
            return Err(DomainError::OutOfRange(format!(
                "months must be at most {MAX_MONTHS}, got {months}"
            )));
        }

        let anchor = as_of.with_day(1).unwrap_or(as_of);
        let salt = route_salt(origin, destination);
        let base = Decimal::from(120);

        let series = (0..months)
            .rev()
            .filter_map(|back| {
                let month = anchor.checked_sub_months(Months::new(back))?;
                let season = if matches!(month.month(), 7 | 8 | 12) {
                    Decimal::new(125, 2)
                } else {
                    Decimal::ONE
                };
                let wobble = Decimal::from((back % 5) * 6);
                let amount = (base * season + wobble + salt).round_dp(2);
                Some(MonthPoint {
                    month: month.format("%Y-%m").to_string(),
                    avg_price: Price::new(amount).ok()?,
                    currency: CurrencyCode::eur(),
                })
            })
            .collect();

        Ok(series)
    }

    /// Same as [`monthly_averages`](Self::monthly_averages) ending at the
    /// current UTC month.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OutOfRange` if `months` exceeds [`MAX_MONTHS`].
    pub fn monthly_averages_now(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
        months: u32,
    ) -> DomainResult<Vec<MonthPoint>> {
        self.monthly_averages(origin, destination, months, Utc::now().date_naive())
    }
}

/// Fixed per-route offset in `0..97`.
fn route_salt(origin: &AirportCode, destination: &AirportCode) -> Decimal {
    let sum = |code: &AirportCode| code.as_str().bytes().map(u32::from).sum::<u32>();
    Decimal::from((sum(origin) * 13 + sum(destination) * 7) % 97)
}
