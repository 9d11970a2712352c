use crate::core::production::temperature_stats;
use crate::domain::model::{Location, TimePeriodStats, TimeSeries, WeatherSample};
use crate::domain::ports::WeatherProvider;
use crate::utils::error::{Result, SoleilError};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Fetches forecasts for the site and keeps the latest one around.
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    location: Location,
    weather: RwLock<Option<TimeSeries<WeatherSample>>>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, location: Location) -> Self {
        Self {
            provider,
            location,
            weather: RwLock::new(None),
        }
    }

    pub async fn get_weather(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<WeatherSample>> {
        let weather = self
            .provider
            .fetch_weather(&self.location, start_date, end_date)
            .await?;
        tracing::debug!("Fetched {} weather samples", weather.len());

        *self.weather.write().await = Some(weather.clone());
        Ok(weather)
    }

    /// Air temperature of the last forecast, skipping instants without one.
    pub async fn temperature(&self) -> Result<TimeSeries<f64>> {
        let guard = self.weather.read().await;
        let weather = guard.as_ref().ok_or(SoleilError::NoWeatherData)?;
        let points = weather
            .iter()
            .filter_map(|(time, sample)| sample.temp_air.map(|t| (*time, t)))
            .collect();
        Ok(TimeSeries::new(points))
    }

    /// Quartiles and spread of the air temperature within `[start, end]`.
    /// `None` when the forecast has nothing in that range.
    pub async fn get_temperature_stats(
        &self,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<Option<TimePeriodStats>> {
        let temperature = self.temperature().await?;
        Ok(temperature_stats(&temperature.slice(start, end)))
    }
}
