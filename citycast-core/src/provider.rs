use crate::{
    Config,
    model::{CurrentSnapshot, RawSample, UnitMode},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Failure of a single request against the weather service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The service does not know the queried city.
    #[error("city not found")]
    NotFound,

    /// Network failure, unreadable body or a body that is not JSON.
    #[error("transport failure: {0}")]
    Transport(String),

    /// JSON body that does not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        query: &str,
        units: UnitMode,
    ) -> Result<CurrentSnapshot, FetchError>;

    async fn fetch_forecast(
        &self,
        query: &str,
        units: UnitMode,
    ) -> Result<Vec<RawSample>, FetchError>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_with_api_key(config, config.api_key())
}

/// Construct the OpenWeather provider with an already resolved API key.
pub fn provider_with_api_key(
    config: &Config,
    api_key: Option<String>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = api_key.ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `citycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::new(api_key, config.base_url.clone())))
}
