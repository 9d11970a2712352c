//! Open-Meteo forecast client.
//!
//! Hourly air temperature and wind speed plus 15-minute irradiance are fetched
//! in site-local wall-clock time and resampled onto the model's 5-minute grid.

use crate::core::interpolate::Pchip;
use crate::core::model::STEP_MINUTES;
use crate::domain::model::{Location, TimeSeries, WeatherSample};
use crate::domain::ports::WeatherProvider;
use crate::utils::error::{Result, SoleilError};
use crate::utils::time::localize_unique;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;

pub const DEFAULT_ENDPOINT: &str = "https://api.open-meteo.com/v1/dwd-icon";

const HOURLY_VARIABLES: &str = "temperature_2m,windspeed_10m";
const MINUTELY_15_VARIABLES: &str = "shortwave_radiation,direct_normal_irradiance,diffuse_radiation";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub hourly: HourlyData,
    pub minutely_15: Minutely15Data,
}

#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(alias = "wind_speed_10m")]
    pub windspeed_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct Minutely15Data {
    pub time: Vec<String>,
    pub shortwave_radiation: Vec<Option<f64>>,
    pub direct_normal_irradiance: Vec<Option<f64>>,
    pub diffuse_radiation: Vec<Option<f64>>,
}

pub struct OpenMeteoClient {
    client: Client,
    endpoint: String,
}

impl OpenMeteoClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn get_forecast(
        &self,
        location: &Location,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<ForecastResponse> {
        tracing::debug!("Making Open-Meteo request to: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("minutely_15", MINUTELY_15_VARIABLES.to_string()),
                ("timezone", location.timezone.name().to_string()),
                ("start_date", start_date.format("%Y-%m-%d").to_string()),
                ("end_date", end_date.format("%Y-%m-%d").to_string()),
            ])
            .send()
            .await?;

        tracing::debug!("Open-Meteo response status: {}", response.status());
        let forecast = response.error_for_status()?.json::<ForecastResponse>().await?;
        Ok(forecast)
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_weather(
        &self,
        location: &Location,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<WeatherSample>> {
        let forecast = self.get_forecast(location, start_date, end_date).await?;
        to_weather(&forecast, &location.timezone)
    }
}

/// Interval means over the preceding 15 minutes become instantaneous values
/// by averaging with the following interval. Past the end counts as zero.
fn instantaneous(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let next = values.get(i + 1).copied().flatten().unwrap_or(0.0);
            value.map(|v| (v + next) / 2.0)
        })
        .collect()
}

/// Localises wall-clock times, dropping those that are ambiguous or skipped
/// around a DST switch, and those that do not parse.
fn localize_times(tz: &Tz, times: &[String]) -> Vec<Option<DateTime<Tz>>> {
    times
        .iter()
        .map(|time| {
            NaiveDateTime::parse_from_str(time, TIME_FORMAT)
                .ok()
                .and_then(|naive| localize_unique(tz, naive))
        })
        .collect()
}

/// Values of one variable on the 5-minute grid between the first and last
/// localised instant. `None` everywhere when the variable has no values.
fn resample(
    times: &[Option<DateTime<Tz>>],
    values: &[Option<f64>],
) -> BTreeMap<i64, Option<f64>> {
    let mut knots: Vec<(i64, f64)> = times
        .iter()
        .zip(values)
        .filter_map(|(time, value)| Some((time.as_ref()?.timestamp(), (*value)?)))
        .collect();
    knots.sort_by_key(|(t, _)| *t);
    knots.dedup_by_key(|(t, _)| *t);

    let instants: Vec<i64> = times.iter().flatten().map(|t| t.timestamp()).collect();
    let (Some(first), Some(last)) = (instants.iter().min(), instants.iter().max()) else {
        return BTreeMap::new();
    };

    let pchip = Pchip::new(
        knots.iter().map(|(t, _)| *t as f64).collect(),
        knots.iter().map(|(_, v)| *v).collect(),
    );

    let step = Duration::minutes(STEP_MINUTES).num_seconds();
    let mut grid = BTreeMap::new();
    let mut t = *first;
    while t <= *last {
        grid.insert(t, pchip.as_ref().map(|p| p.evaluate(t as f64)));
        t += step;
    }
    grid
}

/// Joins the resampled hourly and 15-minute variables on their common instants.
pub fn to_weather(forecast: &ForecastResponse, tz: &Tz) -> Result<TimeSeries<WeatherSample>> {
    let hourly = &forecast.hourly;
    let minutely = &forecast.minutely_15;

    let hourly_times = localize_times(tz, &hourly.time);
    let temp_air = resample(&hourly_times, &hourly.temperature_2m);
    let wind_speed = resample(&hourly_times, &hourly.windspeed_10m);

    let minutely_times = localize_times(tz, &minutely.time);
    let ghi = resample(&minutely_times, &instantaneous(&minutely.shortwave_radiation));
    let dni = resample(&minutely_times, &instantaneous(&minutely.direct_normal_irradiance));
    let dhi = resample(&minutely_times, &instantaneous(&minutely.diffuse_radiation));

    let mut points = Vec::new();
    for (t, ghi) in &ghi {
        let Some(temp) = temp_air.get(t) else {
            continue;
        };
        let (Some(ghi), Some(dni), Some(dhi)) = (
            *ghi,
            dni.get(t).copied().flatten(),
            dhi.get(t).copied().flatten(),
        ) else {
            continue;
        };
        let Some(time) = DateTime::from_timestamp(*t, 0) else {
            continue;
        };
        points.push((
            time.with_timezone(tz),
            WeatherSample {
                ghi,
                dni,
                dhi,
                temp_air: *temp,
                wind_speed: wind_speed.get(t).copied().flatten(),
            },
        ));
    }

    if points.is_empty() {
        return Err(SoleilError::processing(
            "Open-Meteo returned no overlapping irradiance and temperature data",
        ));
    }
    tracing::debug!("Resampled forecast to {} instants", points.len());
    Ok(TimeSeries::new(points))
}
