use crate::domain::model::{Location, TimeSeries, WeatherSample};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Source of a weather forecast on the model's 5-minute grid.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch_weather(
        &self,
        location: &Location,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<TimeSeries<WeatherSample>>;
}
