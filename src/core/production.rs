//! Energy aggregations and window selection over modelled AC power.

use crate::domain::model::{PeakOrder, TimePeriodStats, TimeSeries};
use crate::utils::time::{day_start, localize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// Samples per hour on the 5-minute grid.
const SAMPLES_PER_HOUR: f64 = 12.0;

pub const TEMPERATURE_UNIT: &str = "° C";

/// Clamps AC power into `[0, limit]`; the inverter draws a little at night.
pub fn clamp_power(ac: &TimeSeries<f64>, limit: f64) -> TimeSeries<f64> {
    ac.map(|w| w.max(0.0).min(limit))
}

/// Energy per interval in Wh, from the mean of each instant and the next one.
/// The last instant of the series pairs with zero.
pub fn production_wh(ac: &TimeSeries<f64>) -> TimeSeries<f64> {
    let points = ac.points();
    let wh = points
        .iter()
        .enumerate()
        .map(|(i, (time, w))| {
            let next = points.get(i + 1).map(|(_, w)| *w).unwrap_or(0.0);
            (*time, (w + next) / 2.0 / SAMPLES_PER_HOUR)
        })
        .collect();
    TimeSeries::new(wh)
}

/// Running total of energy in kWh, restarting at every local midnight.
pub fn daily_cumulative_kwh(wh: &TimeSeries<f64>) -> TimeSeries<f64> {
    let mut current_day: Option<NaiveDate> = None;
    let mut total = 0.0;
    let points = wh
        .iter()
        .map(|(time, value)| {
            let day = time.date_naive();
            if current_day != Some(day) {
                current_day = Some(day);
                total = 0.0;
            }
            total += value;
            (*time, total / 1000.0)
        })
        .collect();
    TimeSeries::new(points)
}

fn sum_by<K: Ord + Copy>(
    wh: &TimeSeries<f64>,
    key: impl Fn(&DateTime<Tz>) -> K,
    stamp: impl Fn(K) -> Option<DateTime<Tz>>,
) -> TimeSeries<f64> {
    let mut buckets: BTreeMap<K, f64> = BTreeMap::new();
    for (time, value) in wh.iter() {
        *buckets.entry(key(time)).or_insert(0.0) += value;
    }
    let points = buckets
        .into_iter()
        .filter_map(|(k, total)| stamp(k).map(|time| (time, total / 1000.0)))
        .collect();
    TimeSeries::new(points)
}

/// Wall-clock hour of `time`; both passes through a DST fold share one hour.
fn clock_hour(time: &DateTime<Tz>) -> Option<NaiveDateTime> {
    let local = time.naive_local();
    NaiveTime::from_hms_opt(local.hour(), 0, 0).map(|hour| local.date().and_time(hour))
}

/// Energy per clock hour in kWh, stamped at the start of the hour.
pub fn hourly_kwh(wh: &TimeSeries<f64>) -> TimeSeries<f64> {
    let tz = match wh.points().first() {
        Some((time, _)) => time.timezone(),
        None => return TimeSeries::default(),
    };
    sum_by(wh, clock_hour, |hour| hour.map(|naive| localize(&tz, naive)))
}

/// Energy per calendar day in kWh, stamped at local midnight.
pub fn daily_kwh(wh: &TimeSeries<f64>) -> TimeSeries<f64> {
    let tz = match wh.points().first() {
        Some((time, _)) => time.timezone(),
        None => return TimeSeries::default(),
    };
    sum_by(wh, |time| time.date_naive(), |date| Some(day_start(&tz, date)))
}

/// First and last instant where AC power exceeds `min_kw`.
pub fn production_bounds(
    ac: &TimeSeries<f64>,
    min_kw: f64,
) -> (Option<DateTime<Tz>>, Option<DateTime<Tz>>) {
    let threshold = min_kw * 1000.0;
    let mut producing = ac.iter().filter(|(_, w)| *w > threshold).map(|(t, _)| *t);
    let first = producing.next();
    let last = producing.last().or(first);
    (first, last)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakQuery {
    /// Window length in samples.
    pub window: usize,
    pub order: PeakOrder,
    /// Decimals used when comparing windows.
    pub precision: i32,
    pub min_kwh: Option<f64>,
    pub min_temp: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct WindowRow {
    time: DateTime<Tz>,
    temp_air: f64,
    kwh: f64,
    temp_mean: f64,
    kwh_rounded: f64,
    temp_rounded: f64,
}

/// Decimals beyond what an f64 carries leave values unchanged.
const MAX_PRECISION: i32 = 15;

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision.clamp(-MAX_PRECISION, MAX_PRECISION));
    (value * factor).round() / factor
}

fn pick<'a>(rows: &[&'a WindowRow], order: PeakOrder) -> Option<&'a WindowRow> {
    match order {
        PeakOrder::First => rows.first().copied(),
        PeakOrder::Last => rows.last().copied(),
    }
}

fn with_max_by<'a>(rows: &[&'a WindowRow], field: impl Fn(&WindowRow) -> f64) -> Vec<&'a WindowRow> {
    let max = rows
        .iter()
        .map(|row| field(row))
        .fold(f64::NEG_INFINITY, f64::max);
    rows.iter().copied().filter(|row| field(row) == max).collect()
}

/// Start of the forward-looking window of `query.window` samples that best
/// matches the production and temperature wishes.
///
/// `wh` and `temp_air` are joined on their instants; windows running past the
/// end of the joined data are not candidates. `None` when no complete window
/// exists.
pub fn select_peak(
    wh: &TimeSeries<f64>,
    temp_air: &TimeSeries<f64>,
    query: &PeakQuery,
) -> Option<DateTime<Tz>> {
    if query.window == 0 {
        return None;
    }

    let temps: BTreeMap<i64, f64> = temp_air.iter().map(|(t, v)| (t.timestamp(), *v)).collect();
    let joined: Vec<(DateTime<Tz>, f64, f64)> = wh
        .iter()
        .filter_map(|(t, e)| temps.get(&t.timestamp()).map(|temp| (*t, *e, *temp)))
        .collect();
    if joined.len() < query.window {
        return None;
    }

    let rows: Vec<WindowRow> = joined
        .windows(query.window)
        .map(|window| {
            let kwh = window.iter().map(|(_, e, _)| e).sum::<f64>() / 1000.0;
            let temp_mean =
                window.iter().map(|(_, _, t)| t).sum::<f64>() / query.window as f64;
            let (time, _, temp_air) = window[0];
            WindowRow {
                time,
                temp_air,
                kwh,
                temp_mean,
                kwh_rounded: round_to(kwh, query.precision),
                temp_rounded: round_to(temp_mean, query.precision),
            }
        })
        .collect();
    let all: Vec<&WindowRow> = rows.iter().collect();

    if let Some(min_kwh) = query.min_kwh {
        let enough: Vec<&WindowRow> = all.iter().copied().filter(|row| row.kwh >= min_kwh).collect();
        if let Some(candidate) = pick(&enough, query.order) {
            match query.min_temp {
                None => return Some(candidate.time),
                Some(min_temp) => {
                    let mut candidate = candidate;
                    if candidate.temp_air < min_temp {
                        let warm: Vec<&WindowRow> = enough
                            .iter()
                            .copied()
                            .filter(|row| row.temp_air >= min_temp)
                            .collect();
                        if let Some(warmer) = pick(&warm, query.order) {
                            candidate = warmer;
                        }
                    }
                    if candidate.temp_air >= min_temp {
                        return Some(candidate.time);
                    }
                }
            }
        }
    }

    let best_solar = with_max_by(&all, |row| row.kwh_rounded);
    let best_temp = with_max_by(&all, |row| row.temp_rounded);
    let candidate_solar = pick(&best_solar, query.order)?;
    let candidate_temp = pick(&best_temp, query.order)?;

    let warmest_of_solar = || {
        let warmest = with_max_by(&best_solar, |row| row.temp_rounded);
        pick(&warmest, query.order).map(|row| row.time)
    };

    match query.min_kwh {
        Some(min_kwh) if candidate_solar.kwh < 0.25 * min_kwh => {
            // not sunny: go for the warmest window instead
            if query.min_temp.is_some() {
                Some(candidate_temp.time)
            } else {
                Some(candidate_solar.time)
            }
        }
        Some(min_kwh) if candidate_solar.kwh < 0.75 * min_kwh => {
            // partially sunny: the warmest of the sunniest windows
            if query.min_temp.is_some() {
                warmest_of_solar()
            } else {
                Some(candidate_solar.time)
            }
        }
        _ => match query.min_temp {
            Some(min_temp) if candidate_solar.temp_mean < min_temp => {
                warmest_of_solar().or(Some(candidate_solar.time))
            }
            _ => Some(candidate_solar.time),
        },
    }
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub fn temperature_stats(temp_air: &TimeSeries<f64>) -> Option<TimePeriodStats> {
    let points = temp_air.points();
    let start = points.first()?.0;
    let end = points.last()?.0;

    let mut values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
    values.sort_by(f64::total_cmp);

    let n = values.len() as f64;
    let stddev = if values.len() > 1 {
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    } else {
        None
    };

    Some(TimePeriodStats {
        start,
        end,
        unit: TEMPERATURE_UNIT,
        q25: quantile(&values, 0.25),
        q50: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        stddev,
    })
}
