//! Application state and the events that drive fetch cycles.
//!
//! A fetch cycle is split in three steps so that a front end can run several
//! of them at once: [`Session::begin_cycle`] hands out a [`FetchCycle`]
//! ticket, [`run_cycle`] performs the network requests without touching the
//! state, and [`Session::complete`] applies the outcome. Outcomes of cycles
//! older than the last applied one are discarded.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    forecast,
    model::{CurrentSnapshot, DailySummary, UnitMode},
    provider::{FetchError, WeatherProvider},
};

/// Terminal failure of a fetch cycle. The `Display` text is shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CycleError {
    #[error("Please Enter a City Name")]
    MissingQuery,

    #[error("Please Enter a Valid City Name!")]
    InvalidCity,

    #[error("An error occurred. Please try again.")]
    TransportFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub query: String,
    pub current: Option<CurrentSnapshot>,
    pub forecast: Vec<DailySummary>,
    pub error: Option<CycleError>,
    pub units: UnitMode,
    pub phase: Phase,
}

impl AppState {
    pub fn new(default_query: impl Into<String>, units: UnitMode) -> Self {
        Self {
            query: default_query.into(),
            current: None,
            forecast: Vec::new(),
            error: None,
            units,
            phase: Phase::Idle,
        }
    }

    /// User-facing error text, empty when the last cycle succeeded.
    pub fn error_message(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }
}

/// Inputs from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Session start; fetches the default query.
    Mount,
    /// Query text edited; never fetches on its own.
    QueryChanged(String),
    /// Search button or enter key.
    Submit,
    /// Flip the unit mode, refetching when there is a query.
    ToggleUnits,
}

/// Ticket for one fetch cycle, capturing its inputs at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCycle {
    seq: u64,
    query: String,
    units: UnitMode,
}

impl FetchCycle {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn units(&self) -> UnitMode {
        self.units
    }
}

pub type CycleOutcome = Result<(CurrentSnapshot, Vec<DailySummary>), CycleError>;

/// Runs the two requests of a cycle back to back.
///
/// A transport failure on either request ends the cycle at once, so the
/// forecast is skipped when the current request cannot be sent or read.
/// Otherwise both requests are issued and a not-found answer from either
/// endpoint wins over a malformed body from the other. The query is sent
/// as typed; trimming only decides whether it is empty.
pub async fn run_cycle(provider: &dyn WeatherProvider, cycle: &FetchCycle) -> CycleOutcome {
    if cycle.query.trim().is_empty() {
        return Err(CycleError::MissingQuery);
    }
    let query = cycle.query.as_str();

    let current = provider.fetch_current(query, cycle.units).await;
    if let Err(FetchError::Transport(reason)) = &current {
        warn!(seq = cycle.seq, %reason, "current conditions request failed");
        return Err(CycleError::TransportFailure);
    }

    let samples = provider.fetch_forecast(query, cycle.units).await;
    if let Err(FetchError::Transport(reason)) = &samples {
        warn!(seq = cycle.seq, %reason, "forecast request failed");
        return Err(CycleError::TransportFailure);
    }

    match (current, samples) {
        (Ok(current), Ok(samples)) => Ok((current, forecast::aggregate(&samples))),
        (Err(FetchError::NotFound), _) | (_, Err(FetchError::NotFound)) => {
            debug!(seq = cycle.seq, query, "city not found");
            Err(CycleError::InvalidCity)
        }
        (Err(err), _) | (_, Err(err)) => {
            warn!(seq = cycle.seq, error = %err, "unexpected weather response");
            Err(CycleError::TransportFailure)
        }
    }
}

/// Owns the [`AppState`] and the provider used to refresh it.
#[derive(Debug)]
pub struct Session {
    state: AppState,
    next_seq: u64,
    applied_seq: u64,
    provider: Box<dyn WeatherProvider>,
}

impl Session {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        default_query: impl Into<String>,
        units: UnitMode,
    ) -> Self {
        Self {
            state: AppState::new(default_query, units),
            next_seq: 0,
            applied_seq: 0,
            provider,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies an event, running the fetch cycle it triggers to completion.
    pub async fn dispatch(&mut self, event: Event) {
        if let Some(cycle) = self.on_event(event) {
            let outcome = run_cycle(self.provider.as_ref(), &cycle).await;
            self.complete(&cycle, outcome);
        }
    }

    /// State transition for an event; returns the cycle to run, if any.
    pub fn on_event(&mut self, event: Event) -> Option<FetchCycle> {
        match event {
            Event::Mount | Event::Submit => self.begin_cycle(),
            Event::QueryChanged(text) => {
                self.state.query = text;
                None
            }
            Event::ToggleUnits => {
                self.state.units = self.state.units.toggled();
                if self.state.query.trim().is_empty() {
                    None
                } else {
                    self.begin_cycle()
                }
            }
        }
    }

    /// Starts a cycle for the current query and units.
    ///
    /// An empty query fails the cycle on the spot and returns `None`.
    pub fn begin_cycle(&mut self) -> Option<FetchCycle> {
        self.next_seq += 1;
        let cycle = FetchCycle {
            seq: self.next_seq,
            query: self.state.query.clone(),
            units: self.state.units,
        };

        if cycle.query.trim().is_empty() {
            self.complete(&cycle, Err(CycleError::MissingQuery));
            return None;
        }

        debug!(
            seq = cycle.seq,
            query = %cycle.query,
            units = %cycle.units,
            "fetch cycle started"
        );
        self.state.phase = Phase::Fetching;
        Some(cycle)
    }

    /// Applies a cycle outcome. Returns `false` when the outcome was stale.
    pub fn complete(&mut self, cycle: &FetchCycle, outcome: CycleOutcome) -> bool {
        if cycle.seq < self.applied_seq {
            debug!(seq = cycle.seq, applied = self.applied_seq, "discarding stale fetch cycle");
            return false;
        }
        self.applied_seq = cycle.seq;

        match outcome {
            Ok((current, forecast)) => {
                self.state.current = Some(current);
                self.state.forecast = forecast;
                self.state.error = None;
                self.state.phase = Phase::Success;
            }
            Err(err) => {
                self.state.current = None;
                self.state.forecast.clear();
                self.state.error = Some(err);
                self.state.phase = Phase::Error;
            }
        }
        true
    }
}
