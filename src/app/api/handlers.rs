//! API request handlers

use super::{params::QueryParams, responses::*, AppState};
use crate::domain::model::PeakOrder;
use crate::utils::time::{day_start, to_iso};
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Duration;
use std::collections::HashMap;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Start of the window of `peak_duration_h` hours with the best expected production.
pub async fn get_production_peak(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<PeakResponse> {
    let mut params = QueryParams::new(query, state.timezone());

    let start = params.datetime("start").unwrap_or_else(|| state.solar.now());
    let end = params.required_datetime("end");
    params.check_range(&start, end.as_ref());

    let min_kwh = params.number::<f64>("min_kwh");
    let min_temp = params.number::<f64>("min_temp");
    let precision = params.required_number::<i32>("precision");
    let peak_duration = params
        .number::<i64>("peak_duration_h")
        .and_then(Duration::try_hours);
    let peak_duration = params.require("peak_duration_h", peak_duration);

    let order = params.text("order").and_then(PeakOrder::parse);
    if order.is_none() {
        params.error(r#"Failed to parse value for parameter: order. Should be "first" or "last"."#);
    }
    params.finish()?;

    let (Some(end), Some(precision), Some(peak_duration), Some(order)) =
        (end, precision, peak_duration, order)
    else {
        return Err(ApiError::Internal("Incomplete request parameters".to_string()));
    };

    let result = state
        .solar
        .get_production_peak(
            &end,
            peak_duration,
            order,
            precision,
            Some(start),
            min_kwh,
            min_temp,
        )
        .await?;

    Ok(Json(PeakResponse {
        status: STATUS_OK,
        result: to_iso(&result),
    }))
}

pub async fn get_production_bounds(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<BoundsResponse> {
    let params = QueryParams::new(query, state.timezone());

    let date = params.date("date").unwrap_or_else(|| state.solar.today());
    let min_kw = params.number::<f64>("min_kW").unwrap_or(0.0);
    params.finish()?;

    let (start, end) = state.solar.get_production_bounds(date, min_kw).await?;
    Ok(Json(BoundsResponse {
        status: STATUS_OK,
        start: start.as_ref().map(to_iso),
        end: end.as_ref().map(to_iso),
    }))
}

/// Forecast production compared with clear-sky production.
pub async fn get_production_weather(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<ProductionWeatherResponse> {
    let mut params = QueryParams::new(query, state.timezone());

    let start = params.datetime("start").unwrap_or_else(|| state.solar.now());
    let end = params.required_datetime("end");
    params.check_range(&start, end.as_ref());
    params.finish()?;
    let end = end.ok_or_else(|| ApiError::Internal("Incomplete request parameters".to_string()))?;

    let data = state.solar.get_production_weather(&start, &end).await?;
    Ok(Json(ProductionWeatherResponse {
        status: STATUS_OK,
        weather_data: data.weather_data,
        clearsky: data.clearsky,
        ratio: data.ratio,
    }))
}

/// Production so far on the day, from midnight until now by default.
pub async fn get_daily_production(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<DailyProductionResponse> {
    let mut params = QueryParams::new(query, state.timezone());

    let start = params
        .datetime("start")
        .unwrap_or_else(|| day_start(&state.timezone(), state.solar.today()));
    let end = params.datetime("end").unwrap_or_else(|| state.solar.now());
    params.check_range(&start, Some(&end));
    params.finish()?;

    let cumulative = state.solar.get_daily_cumulative_kwh(&start, &end).await?;
    let production = cumulative
        .iter()
        .map(|(_, kwh)| *kwh)
        .fold(None, |max: Option<f64>, kwh| Some(max.map_or(kwh, |m| m.max(kwh))));

    Ok(Json(DailyProductionResponse {
        status: STATUS_OK,
        production,
        unit: "kWh",
    }))
}

pub async fn get_temperature_stats(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<TemperatureStatsResponse> {
    let mut params = QueryParams::new(query, state.timezone());

    let start = params.datetime("start").unwrap_or_else(|| state.solar.now());
    let end = params.required_datetime("end");
    params.check_range(&start, end.as_ref());
    params.finish()?;
    let end = end.ok_or_else(|| ApiError::Internal("Incomplete request parameters".to_string()))?;

    let stats = state
        .solar
        .weather()
        .get_temperature_stats(&start, &end)
        .await?
        .ok_or_else(|| ApiError::BadRequest(vec![NO_DATA.to_string()]))?;

    Ok(Json(TemperatureStatsResponse {
        start: to_iso(&stats.start),
        end: to_iso(&stats.end),
        unit: stats.unit,
        q25: stats.q25,
        q50: stats.q50,
        q75: stats.q75,
        stddev: stats.stddev,
    }))
}

pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}
