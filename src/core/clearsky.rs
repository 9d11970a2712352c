//! Simplified Solis clear-sky model (Ineichen 2008).

/// Aerosol optical depth at 700 nm.
pub const DEFAULT_AOD700: f64 = 0.1;
/// Precipitable water, cm.
pub const DEFAULT_PRECIPITABLE_WATER: f64 = 1.0;

const P0: f64 = 101_325.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearSkyIrradiance {
    pub ghi: f64,
    pub dni: f64,
    pub dhi: f64,
}

/// Standard-atmosphere pressure in Pa at an altitude in metres.
pub fn altitude_to_pressure(altitude: f64) -> f64 {
    100.0 * ((44_331.514 - altitude) / 11_880.516).powf(1.0 / 0.1902632)
}

pub fn simplified_solis(
    apparent_elevation: f64,
    dni_extra: f64,
    pressure: f64,
    aod700: f64,
    precipitable_water: f64,
) -> ClearSkyIrradiance {
    if apparent_elevation <= 0.0 {
        return ClearSkyIrradiance {
            ghi: 0.0,
            dni: 0.0,
            dhi: 0.0,
        };
    }

    let w = precipitable_water.max(0.2);
    let ln_w = w.ln();
    let ln_p = (pressure / P0).ln();

    let io0 = 1.08 * w.powf(0.0051);
    let i01 = 0.97 * w.powf(0.032);
    let i02 = 0.12 * w.powf(0.56);
    let i0p = dni_extra * (i02 * aod700 * aod700 + i01 * aod700 + io0 + 0.071 * ln_p);

    let tb1 = 1.82 + 0.056 * ln_w + 0.0071 * ln_w * ln_w;
    let tb0 = 0.33 + 0.045 * ln_w + 0.0096 * ln_w * ln_w;
    let tbp = 0.0089 * w + 0.13;
    let taub = tb1 * aod700 + tb0 + tbp * ln_p;

    let b1 = 0.00925 * aod700 * aod700 + 0.0148 * aod700 - 0.0172;
    let b0 = -0.7565 * aod700 * aod700 + 0.5057 * aod700 + 0.4557;
    let b = b1 * ln_w + b0;

    let tg1 = 1.24 + 0.047 * ln_w + 0.0061 * ln_w * ln_w;
    let tg0 = 0.27 + 0.043 * ln_w + 0.0090 * ln_w * ln_w;
    let tgp = 0.0079 * w + 0.1;
    let taug = tg1 * aod700 + tg0 + tgp * ln_p;

    let g = -0.0147 * ln_w - 0.3079 * aod700 * aod700 + 0.2846 * aod700 + 0.3798;

    let (td4, td3, td2, td1, td0, tdp) = if aod700 < 0.05 {
        (
            86.0 * w - 13_800.0,
            -3.11 * w + 79.4,
            -0.23 * w + 74.8,
            0.092 * w - 8.86,
            0.0042 * w + 3.12,
            -0.83 * (1.0 + aod700).powf(-17.2),
        )
    } else {
        (
            -0.21 * w + 11.6,
            0.27 * w - 20.7,
            -0.134 * w + 15.5,
            0.0554 * w - 5.71,
            0.0057 * w + 2.94,
            -0.71 * (1.0 + aod700).powf(-15.0),
        )
    };
    let taud = td4 * aod700.powi(4)
        + td3 * aod700.powi(3)
        + td2 * aod700.powi(2)
        + td1 * aod700
        + td0
        + tdp * ln_p;

    let dp = 1.0 / (18.0 + 152.0 * aod700);
    let d = -0.337 * aod700 * aod700 + 0.63 * aod700 + 0.116 + dp * ln_p;

    let sin_elev = apparent_elevation.to_radians().sin().max(1.0e-30);

    let dni = i0p * (-taub / sin_elev.powf(b)).exp();
    let ghi = i0p * (-taug / sin_elev.powf(g)).exp() * sin_elev;
    let dhi = i0p * (-taud / sin_elev.powf(d)).exp();

    ClearSkyIrradiance {
        ghi: ghi.max(0.0),
        dni: dni.max(0.0),
        dhi: dhi.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_level_pressure() {
        assert!((altitude_to_pressure(0.0) - 101_325.0).abs() < 50.0);
        assert!(altitude_to_pressure(1000.0) < 91_000.0);
    }

    #[test]
    fn test_high_sun_clear_sky() {
        let sky = simplified_solis(60.0, 1366.1, 101_325.0, DEFAULT_AOD700, DEFAULT_PRECIPITABLE_WATER);
        assert!(sky.ghi > 800.0 && sky.ghi < 1050.0, "ghi {}", sky.ghi);
        assert!(sky.dni > 800.0 && sky.dni < 1000.0, "dni {}", sky.dni);
        assert!(sky.dhi > 30.0 && sky.dhi < 150.0, "dhi {}", sky.dhi);
    }

    #[test]
    fn test_sun_below_horizon_is_dark() {
        let sky = simplified_solis(-5.0, 1366.1, 101_325.0, DEFAULT_AOD700, DEFAULT_PRECIPITABLE_WATER);
        assert_eq!(sky.ghi, 0.0);
        assert_eq!(sky.dni, 0.0);
        assert_eq!(sky.dhi, 0.0);
    }

    #[test]
    fn test_lower_sun_gives_less_irradiance() {
        let high = simplified_solis(60.0, 1366.1, 101_325.0, DEFAULT_AOD700, DEFAULT_PRECIPITABLE_WATER);
        let low = simplified_solis(10.0, 1366.1, 101_325.0, DEFAULT_AOD700, DEFAULT_PRECIPITABLE_WATER);
        assert!(low.ghi < high.ghi);
        assert!(low.dni < high.dni);
    }
}
