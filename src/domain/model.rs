use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub timezone: Tz,
}

/// A fixed, close-mounted array with a single string of modules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayMount {
    pub tilt: f64,
    pub azimuth: f64,
    pub height: f64,
    pub modules_per_string: u32,
}

impl ArrayMount {
    pub const STRINGS: u32 = 1;
}

/// CEC single-diode module parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarPanel {
    pub name: String,
    pub technology: String,
    pub stc: f64,
    pub ptc: f64,
    pub a_c: f64,
    pub n_s: f64,
    pub i_sc_ref: f64,
    pub v_oc_ref: f64,
    pub i_mp_ref: f64,
    pub v_mp_ref: f64,
    pub alpha_sc: f64,
    pub beta_oc: f64,
    pub t_noct: f64,
    pub a_ref: f64,
    pub i_l_ref: f64,
    pub i_o_ref: f64,
    pub r_s: f64,
    pub r_sh_ref: f64,
    pub adjust: f64,
    pub gamma_r: f64,
    pub bipv: String,
}

impl Default for SolarPanel {
    fn default() -> Self {
        Self {
            name: "Hyundai HiE-S400VG".to_string(),
            technology: "Mono-c-Si".to_string(),
            stc: 400.0,
            ptc: 364.0,
            a_c: 2.02,
            n_s: 340.0,
            i_sc_ref: 10.97,
            v_oc_ref: 46.4,
            i_mp_ref: 10.36,
            v_mp_ref: 38.6,
            alpha_sc: 0.004215,
            beta_oc: -0.164485,
            t_noct: 45.4,
            a_ref: 2.059511,
            i_l_ref: 10.385126,
            i_o_ref: 4.5757e-10,
            r_s: 0.218704,
            r_sh_ref: 976.143086,
            adjust: 9.872948,
            gamma_r: -0.34,
            bipv: "N".to_string(),
        }
    }
}

/// Sandia grid-tied inverter parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolarInverter {
    pub name: String,
    pub vac: f64,
    pub pso: f64,
    pub paco: f64,
    pub pdco: f64,
    pub vdco: f64,
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    pub c3: f64,
    pub pnt: f64,
    pub vdcmax: f64,
    pub idcmax: f64,
    pub mppt_low: f64,
    pub mppt_high: f64,
}

impl Default for SolarInverter {
    fn default() -> Self {
        Self {
            name: "Huawei SUN2000-4.6KTL-L1".to_string(),
            vac: 240.0,
            pso: 1.0,
            paco: 5000.0,
            pdco: 5059.411133,
            vdco: 360.0,
            c0: -0.000002,
            c1: 0.000021,
            c2: 0.000814,
            c3: -0.000727,
            pnt: 1.5,
            vdcmax: 600.0,
            idcmax: 12.5,
            mppt_low: 90.0,
            mppt_high: 560.0,
        }
    }
}

/// Weather at one instant. Irradiance in W/m², temperature in °C, wind in m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSample {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
    pub temp_air: Option<f64>,
    pub wind_speed: Option<f64>,
}

/// Ordered points keyed by site-local instants.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<T> {
    points: Vec<(DateTime<Tz>, T)>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<T> TimeSeries<T> {
    pub fn new(mut points: Vec<(DateTime<Tz>, T)>) -> Self {
        points.sort_by(|a, b| a.0.cmp(&b.0));
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(DateTime<Tz>, T)] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &(DateTime<Tz>, T)> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<(DateTime<Tz>, T)> {
        self.points
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> TimeSeries<U> {
        TimeSeries {
            points: self.points.iter().map(|(t, v)| (*t, f(v))).collect(),
        }
    }

    pub fn map_with_time<U>(&self, mut f: impl FnMut(&DateTime<Tz>, &T) -> U) -> TimeSeries<U> {
        TimeSeries {
            points: self.points.iter().map(|(t, v)| (*t, f(t, v))).collect(),
        }
    }
}

impl<T: Clone> TimeSeries<T> {
    /// Points with `start <= t <= end`.
    pub fn slice(&self, start: &DateTime<Tz>, end: &DateTime<Tz>) -> Self {
        let from = self.points.partition_point(|(t, _)| t < start);
        let to = self.points.partition_point(|(t, _)| t <= end);
        let points = if from < to {
            self.points[from..to].to_vec()
        } else {
            Vec::new()
        };
        Self { points }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelResults {
    Undefined,
    /// Inverter AC output in W at each modelled instant.
    Computed(TimeSeries<f64>),
}

/// Which model run a query reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSet {
    Weather,
    ClearSky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakOrder {
    First,
    Last,
}

impl PeakOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "first" => Some(PeakOrder::First),
            "last" => Some(PeakOrder::Last),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimePeriodStats {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub unit: &'static str,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    /// Sample standard deviation; undefined for a single point.
    pub stddev: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProductionWeather {
    pub weather_data: f64,
    pub clearsky: f64,
    pub ratio: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Brussels;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        Brussels.with_ymd_and_hms(2024, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_slice_is_inclusive() {
        let series = TimeSeries::new(vec![(at(10, 10), 3.0), (at(10, 0), 1.0), (at(10, 5), 2.0)]);
        assert_eq!(series.points()[0].1, 1.0);

        let sliced = series.slice(&at(10, 0), &at(10, 5));
        assert_eq!(sliced.len(), 2);
        assert_eq!(sliced.points()[1].1, 2.0);

        assert!(series.slice(&at(11, 0), &at(12, 0)).is_empty());
        assert!(series.slice(&at(10, 10), &at(10, 0)).is_empty());
    }

    #[test]
    fn test_peak_order_parse() {
        assert_eq!(PeakOrder::parse("first"), Some(PeakOrder::First));
        assert_eq!(PeakOrder::parse("last"), Some(PeakOrder::Last));
        assert_eq!(PeakOrder::parse("middle"), None);
    }
}
