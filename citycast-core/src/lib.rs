//! Core library for the `citycast` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the [`WeatherProvider`] seam
//! - Aggregation of 3-hour forecast samples into daily summaries
//! - Display unit conversion
//! - The session state machine driven by user events
//!
//! It is used by `citycast-cli`, but can also be reused by other front ends.

pub mod config;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod session;
pub mod units;

pub use config::Config;
pub use model::{Condition, CurrentSnapshot, DailySummary, RawSample, UnitMode};
pub use provider::{FetchError, WeatherProvider};
pub use session::{AppState, CycleError, Event, Phase, Session};
