//! # Offer Ranking
//!
//! Turns the merged offer list of one fan-out into an [`AggregationResult`].
//!
//! - `cheapest`: first offer with the minimum price, in merge order
//! - `fastest`: first offer with the minimum duration, in merge order
//! - `all`: stable sort by price, then duration, then departure
//!
//! The two picks are selected independently of each other and of the sort,
//! so the same offer may be both cheapest and fastest.

use crate::domain::entities::FlightOffer;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Ranked outcome of a successful aggregation.
///
/// # Invariants
///
/// - `all` is non-empty and contains `cheapest` and `fastest`
/// - `cheapest.price <= o.price` and `fastest.duration <= o.duration` for
///   every `o` in `all`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Lowest-priced offer.
    pub cheapest: FlightOffer,
    /// Shortest offer.
    pub fastest: FlightOffer,
    /// Every offer, ordered by [`compare_offers`].
    pub all: Vec<FlightOffer>,
}

impl AggregationResult {
    /// Ranks `offers`, given in merge order.
    ///
    /// Returns `None` when there is nothing to rank.
    #[must_use]
    pub fn rank(offers: Vec<FlightOffer>) -> Option<Self> {
        let cheapest = offers.iter().min_by_key(|o| o.price())?.clone();
        let fastest = offers.iter().min_by_key(|o| o.duration_minutes())?.clone();

        let mut all = offers;
        all.sort_by(compare_offers);

        Some(Self {
            cheapest,
            fastest,
            all,
        })
    }

    /// Number of offers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    /// Always false for a ranked result; present for API symmetry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

impl fmt::Display for AggregationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AggregationResult({} offers, cheapest={} {}, fastest={}min)",
            self.all.len(),
            self.cheapest.price(),
            self.cheapest.currency(),
            self.fastest.duration_minutes()
        )
    }
}

/// Total order used for `all`: price, then duration, then departure.
///
/// Offers equal on all three keep their relative merge order under a stable
/// sort.
#[must_use]
pub fn compare_offers(a: &FlightOffer, b: &FlightOffer) -> Ordering {
    a.price()
        .cmp(&b.price())
        .then_with(|| a.duration_minutes().cmp(&b.duration_minutes()))
        .then_with(|| a.depart_at().cmp(&b.depart_at()))
}
