#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Europe::Brussels;
use chrono_tz::Tz;
use mme_soleil::core::model::{time_grid, ModelChain};
use mme_soleil::domain::model::{
    ArrayMount, Location, SolarInverter, SolarPanel, TimeSeries, WeatherSample,
};
use mme_soleil::domain::ports::WeatherProvider;
use mme_soleil::utils::time::day_start;
use mme_soleil::{Result, SolarService, WeatherService};
use std::sync::Arc;

pub fn location() -> Location {
    Location {
        latitude: 50.85,
        longitude: 4.35,
        altitude: 60.0,
        timezone: Brussels,
    }
}

pub fn model_chain() -> ModelChain {
    ModelChain::new(
        location(),
        vec![
            ArrayMount {
                tilt: 35.0,
                azimuth: 180.0,
                height: 6.0,
                modules_per_string: 6,
            },
            ArrayMount {
                tilt: 35.0,
                azimuth: 270.0,
                height: 6.0,
                modules_per_string: 5,
            },
        ],
        SolarPanel::default(),
        SolarInverter::default(),
    )
}

/// Clear sky dimmed to 80 % at a steady 18 °C.
pub struct HazyWeather;

#[async_trait]
impl WeatherProvider for HazyWeather {
    async fn fetch_weather(
        &self,
        location: &Location,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<WeatherSample>> {
        let grid = time_grid(
            day_start(&location.timezone, start_date),
            day_start(&location.timezone, end_date),
        );
        Ok(model_chain().clearsky(&grid).map(|sky| WeatherSample {
            ghi: sky.ghi * 0.8,
            dni: sky.dni * 0.8,
            dhi: sky.dhi * 0.8,
            temp_air: Some(18.0),
            wind_speed: Some(2.0),
        }))
    }
}

pub fn solar_service() -> Arc<SolarService> {
    let weather = Arc::new(WeatherService::new(Arc::new(HazyWeather), location()));
    Arc::new(SolarService::new(model_chain(), weather))
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
}

pub fn at(day: u32, h: u32, m: u32) -> DateTime<Tz> {
    Brussels.with_ymd_and_hms(2024, 6, day, h, m, 0).unwrap()
}
