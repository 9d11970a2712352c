//! Sun position from the NOAA solar calculator equations.
//!
//! Accuracy is well within what the irradiance models need (a fraction of a
//! degree between 1800 and 2100).

use chrono::{DateTime, TimeZone, Timelike};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPosition {
    /// True zenith angle, degrees.
    pub zenith: f64,
    /// Zenith corrected for atmospheric refraction, degrees.
    pub apparent_zenith: f64,
    /// Degrees clockwise from north.
    pub azimuth: f64,
}

impl SolarPosition {
    pub fn elevation(&self) -> f64 {
        90.0 - self.zenith
    }

    pub fn apparent_elevation(&self) -> f64 {
        90.0 - self.apparent_zenith
    }
}

fn julian_century<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    let seconds = time.timestamp() as f64 + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
    let julian_day = seconds / 86_400.0 + 2_440_587.5;
    (julian_day - 2_451_545.0) / 36_525.0
}

pub fn solar_position<Tz: TimeZone>(time: &DateTime<Tz>, latitude: f64, longitude: f64) -> SolarPosition {
    let jc = julian_century(time);

    let mean_long = (280.46646 + jc * (36_000.76983 + jc * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + jc * (35_999.05029 - 0.0001537 * jc);
    let eccent = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);

    let m = mean_anom.to_radians();
    let center = m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * m).sin() * 0.000289;
    let true_long = mean_long + center;
    let omega = (125.04 - 1934.136 * jc).to_radians();
    let app_long = true_long - 0.00569 - 0.00478 * omega.sin();

    let mean_obliq = 23.0
        + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let obliq = (mean_obliq + 0.00256 * omega.cos()).to_radians();

    let declination = (obliq.sin() * app_long.to_radians().sin()).asin();

    let y = (obliq / 2.0).tan().powi(2);
    let l0 = mean_long.to_radians();
    let eq_of_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * eccent * m.sin()
            + 4.0 * eccent * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccent * eccent * (2.0 * m).sin())
        .to_degrees();

    let utc = time.naive_utc();
    let minutes = f64::from(utc.hour()) * 60.0
        + f64::from(utc.minute())
        + f64::from(utc.second()) / 60.0;
    let true_solar_time = (minutes + eq_of_time + 4.0 * longitude).rem_euclid(1440.0);
    let hour_angle = true_solar_time / 4.0 - 180.0;

    let lat = latitude.to_radians();
    let cos_zenith = (lat.sin() * declination.sin()
        + lat.cos() * declination.cos() * hour_angle.to_radians().cos())
    .clamp(-1.0, 1.0);
    let zenith = cos_zenith.acos();

    let denom = lat.cos() * zenith.sin();
    let azimuth = if denom.abs() < 1e-12 {
        180.0
    } else {
        let az = ((lat.sin() * cos_zenith - declination.sin()) / denom)
            .clamp(-1.0, 1.0)
            .acos()
            .to_degrees();
        if hour_angle > 0.0 {
            (az + 180.0).rem_euclid(360.0)
        } else {
            (540.0 - az).rem_euclid(360.0)
        }
    };

    let zenith = zenith.to_degrees();
    let apparent_zenith = zenith - refraction(90.0 - zenith);

    SolarPosition {
        zenith,
        apparent_zenith,
        azimuth,
    }
}

/// Atmospheric refraction correction in degrees for a true elevation.
fn refraction(elevation: f64) -> f64 {
    let te = elevation.to_radians().tan();
    let arc_seconds = if elevation > 85.0 {
        0.0
    } else if elevation > 5.0 {
        58.1 / te - 0.07 / te.powi(3) + 0.000086 / te.powi(5)
    } else if elevation > -0.575 {
        1735.0 + elevation * (-518.2 + elevation * (103.4 + elevation * (-12.79 + elevation * 0.711)))
    } else {
        -20.772 / te
    };
    arc_seconds / 3600.0
}

/// Extraterrestrial normal irradiance (Spencer), W/m².
pub fn extra_radiation<Tz: TimeZone>(time: &DateTime<Tz>) -> f64 {
    use chrono::Datelike;

    let day_of_year = f64::from(time.naive_utc().ordinal());
    let b = 2.0 * std::f64::consts::PI * (day_of_year - 1.0) / 365.0;
    let r_fact = 1.00011
        + 0.034221 * b.cos()
        + 0.00128 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();
    1366.1 * r_fact
}
