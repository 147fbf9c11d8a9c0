//! # Domain Services
//!
//! Domain logic that doesn't belong to a single entity or value object.
//!
//! ## Services
//!
//! - [`history::HistoryService`]: Synthetic monthly price averages per route

pub mod history;

pub use history::{HistoryService, MonthPoint};
