//! Grafana SimpleJSON datasource.

use super::{responses::*, AppState};
use crate::domain::model::{ResultSet, TimeSeries};
use crate::utils::error::Result;
use crate::utils::time::{day_end, day_start};
use axum::{extract::State, response::Json};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const TARGET_AC_W: &str = "AC_W";
pub const TARGET_DAILY_KWH_CUM: &str = "daily_kwh_cum";
pub const TARGET_HOURLY_KWH: &str = "hourly_kwh";
pub const TARGET_FUTURE_DAILY_KWH: &str = "future_daily_kwh";

/// Extra time fetched around the dashboard range for the 5-minute series.
const RANGE_MARGIN_MINUTES: i64 = 10;

/// Days after today covered by the future production target.
const FUTURE_DAYS: i64 = 2;

#[derive(Debug, Serialize)]
pub struct MetricOption {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct QueryRange {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryTarget {
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub range: QueryRange,
    pub targets: Vec<QueryTarget>,
}

/// One series: `[value, epoch milliseconds]` pairs.
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub target: String,
    pub datapoints: Vec<(f64, i64)>,
}

impl QueryResponse {
    fn new(target: &str, series: &TimeSeries<f64>) -> Self {
        Self {
            target: target.to_string(),
            datapoints: series
                .iter()
                .map(|(time, value)| (*value, time.timestamp_millis()))
                .collect(),
        }
    }
}

/// Dashboard range bounds are UTC; a value without offset is read as UTC too.
fn parse_range_bound(tz: &Tz, value: &str) -> Option<DateTime<Tz>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(tz));
    }
    let naive = NaiveDateTime::parse_from_str(value.get(..19)?, "%Y-%m-%dT%H:%M:%S").ok()?;
    Some(naive.and_utc().with_timezone(tz))
}

pub async fn test_connection() -> Json<StatusResponse> {
    Json(StatusResponse::ok())
}

pub async fn metrics() -> Json<Vec<MetricOption>> {
    Json(vec![
        MetricOption {
            label: "AC power (W)",
            value: TARGET_AC_W,
        },
        MetricOption {
            label: "Daily cumulative production (kWh)",
            value: TARGET_DAILY_KWH_CUM,
        },
        MetricOption {
            label: "Hourly production (kWh)",
            value: TARGET_HOURLY_KWH,
        },
        MetricOption {
            label: "Future daily production (kWh)",
            value: TARGET_FUTURE_DAILY_KWH,
        },
    ])
}

pub async fn metric_payload_options() -> Json<Vec<serde_json::Value>> {
    Json(Vec::new())
}

pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> std::result::Result<Json<Vec<QueryResponse>>, ApiError> {
    let tz = state.timezone();
    let (Some(from), Some(to)) = (
        parse_range_bound(&tz, &request.range.from),
        parse_range_bound(&tz, &request.range.to),
    ) else {
        return Err(ApiError::BadRequest(vec![
            "Failed to parse value for parameter: range.".to_string(),
        ]));
    };

    let mut result = Vec::new();
    for target in &request.targets {
        if let Some(series) = query_target(&state, &target.target, &from, &to).await? {
            result.push(QueryResponse::new(&target.target, &series));
        }
    }
    Ok(Json(result))
}

async fn query_target(
    state: &AppState,
    target: &str,
    from: &DateTime<Tz>,
    to: &DateTime<Tz>,
) -> Result<Option<TimeSeries<f64>>> {
    let tz = state.timezone();
    let margin = Duration::minutes(RANGE_MARGIN_MINUTES);
    let solar = &state.solar;

    let series = match target {
        TARGET_AC_W => {
            solar
                .get_ac_power(&(*from - margin), &(*to + margin), ResultSet::Weather)
                .await?
        }
        TARGET_DAILY_KWH_CUM => {
            solar
                .get_daily_cumulative_kwh(&(*from - margin), &(*to + margin))
                .await?
        }
        TARGET_HOURLY_KWH => {
            let start = day_start(&tz, from.date_naive());
            let end = day_end(&tz, to.date_naive());
            solar.get_hourly_production_kwh(&start, &end).await?
        }
        TARGET_FUTURE_DAILY_KWH => {
            let today = Utc::now().with_timezone(&tz).date_naive();
            let start = day_start(&tz, today);
            let end = day_end(&tz, today + Duration::days(FUTURE_DAYS));
            solar.get_daily_production_kwh(&start, &end).await?
        }
        other => {
            tracing::debug!("Ignoring unknown Grafana target {}", other);
            return Ok(None);
        }
    };
    Ok(Some(series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Brussels;

    #[test]
    fn test_range_bounds_are_utc() {
        let from = parse_range_bound(&Brussels, "2024-06-01T10:00:00.000Z").unwrap();
        assert_eq!(from.to_rfc3339(), "2024-06-01T12:00:00+02:00");

        let naive = parse_range_bound(&Brussels, "2024-06-01T10:00:00").unwrap();
        assert_eq!(naive, from);

        assert!(parse_range_bound(&Brussels, "now-6h").is_none());
    }
}
