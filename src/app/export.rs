//! One-off forecast export as CSV.

use crate::core::production::production_wh;
use crate::core::solar::SolarService;
use crate::domain::model::{ResultSet, TimeSeries};
use crate::utils::error::{Result, SoleilError};
use crate::utils::time::{day_start, to_iso};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ForecastRow {
    pub time: String,
    pub ac_w: f64,
    pub energy_wh: f64,
}

/// AC power and interval energy per instant.
pub fn forecast_rows(ac: &TimeSeries<f64>) -> Vec<ForecastRow> {
    let wh = production_wh(ac);
    ac.iter()
        .zip(wh.iter())
        .map(|((time, w), (_, e))| ForecastRow {
            time: to_iso(time),
            ac_w: *w,
            energy_wh: *e,
        })
        .collect()
}

pub fn to_csv(rows: &[ForecastRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| SoleilError::processing(format!("Failed to finish CSV output: {}", e)))
}

/// Runs the model over `days` days from `start_date` and renders the
/// weather-based forecast as CSV.
pub async fn export_forecast(
    solar: &SolarService,
    start_date: NaiveDate,
    days: u32,
) -> Result<Vec<u8>> {
    let end_date = start_date
        .checked_add_signed(Duration::days(i64::from(days)))
        .ok_or_else(|| SoleilError::InvalidConfigValue {
            field: "--days".to_string(),
            value: days.to_string(),
            reason: "forecast would end past the last supported date".to_string(),
        })?;
    solar.run_model(Some(start_date), Some(end_date)).await?;

    let tz = solar.timezone();
    let ac = solar
        .get_ac_power(
            &day_start(&tz, start_date),
            &day_start(&tz, end_date),
            ResultSet::Weather,
        )
        .await?;
    let rows = forecast_rows(&ac);
    tracing::info!("📊 Exporting {} forecast rows", rows.len());
    to_csv(&rows)
}
