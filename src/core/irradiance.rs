//! Transposition of horizontal irradiance onto a tilted plane.

pub const DEFAULT_ALBEDO: f64 = 0.25;
/// ASHRAE incidence angle modifier coefficient.
pub const ASHRAE_B: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoaIrradiance {
    pub direct: f64,
    pub sky_diffuse: f64,
    pub ground_diffuse: f64,
}

impl PoaIrradiance {
    pub fn global(&self) -> f64 {
        self.direct + self.sky_diffuse + self.ground_diffuse
    }

    pub fn diffuse(&self) -> f64 {
        self.sky_diffuse + self.ground_diffuse
    }
}

/// Cosine of the angle of incidence, clamped to [-1, 1].
pub fn aoi_projection(surface_tilt: f64, surface_azimuth: f64, zenith: f64, azimuth: f64) -> f64 {
    let tilt = surface_tilt.to_radians();
    let zen = zenith.to_radians();
    (tilt.cos() * zen.cos() + tilt.sin() * zen.sin() * (azimuth - surface_azimuth).to_radians().cos())
        .clamp(-1.0, 1.0)
}

/// Angle of incidence in degrees.
pub fn aoi(surface_tilt: f64, surface_azimuth: f64, zenith: f64, azimuth: f64) -> f64 {
    aoi_projection(surface_tilt, surface_azimuth, zenith, azimuth)
        .acos()
        .to_degrees()
}

/// Hay & Davies (1980) sky diffuse irradiance on the plane.
pub fn haydavies(
    surface_tilt: f64,
    surface_azimuth: f64,
    dhi: f64,
    dni: f64,
    dni_extra: f64,
    zenith: f64,
    azimuth: f64,
) -> f64 {
    let cos_tt = aoi_projection(surface_tilt, surface_azimuth, zenith, azimuth).max(0.0);
    let cos_zenith = zenith.to_radians().cos();
    // 0.01745 = cos(89 degrees); keeps the beam ratio bounded near sunrise and sunset
    let rb = cos_tt / cos_zenith.max(0.01745);

    let ai = if dni_extra > 0.0 { dni / dni_extra } else { 0.0 };
    let term1 = 1.0 - ai;
    let term2 = 0.5 * (1.0 + surface_tilt.to_radians().cos());

    let isotropic = (dhi * term1 * term2).max(0.0);
    let circumsolar = (dhi * ai * rb).max(0.0);
    isotropic + circumsolar
}

pub fn ground_diffuse(surface_tilt: f64, ghi: f64, albedo: f64) -> f64 {
    ghi * albedo * (1.0 - surface_tilt.to_radians().cos()) * 0.5
}

#[allow(clippy::too_many_arguments)]
pub fn poa_components(
    surface_tilt: f64,
    surface_azimuth: f64,
    zenith: f64,
    azimuth: f64,
    ghi: f64,
    dni: f64,
    dhi: f64,
    dni_extra: f64,
) -> PoaIrradiance {
    let incidence = aoi(surface_tilt, surface_azimuth, zenith, azimuth);
    PoaIrradiance {
        direct: (dni * incidence.to_radians().cos()).max(0.0),
        sky_diffuse: haydavies(surface_tilt, surface_azimuth, dhi, dni, dni_extra, zenith, azimuth),
        ground_diffuse: ground_diffuse(surface_tilt, ghi, DEFAULT_ALBEDO),
    }
}

/// ASHRAE incidence angle modifier for the direct component.
pub fn iam_ashrae(aoi: f64, b: f64) -> f64 {
    if aoi.abs() >= 90.0 {
        return 0.0;
    }
    (1.0 - b * (1.0 / aoi.to_radians().cos() - 1.0)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aoi_facing_the_sun() {
        assert!(aoi(30.0, 180.0, 30.0, 180.0).abs() < 1e-6);
        assert!((aoi(0.0, 180.0, 40.0, 90.0) - 40.0).abs() < 1e-6);
        assert!(aoi(30.0, 180.0, 80.0, 0.0) > 90.0);
    }

    #[test]
    fn test_iam_ashrae() {
        assert!((iam_ashrae(0.0, ASHRAE_B) - 1.0).abs() < 1e-12);
        assert!((iam_ashrae(60.0, ASHRAE_B) - 0.95).abs() < 1e-9);
        assert_eq!(iam_ashrae(90.0, ASHRAE_B), 0.0);
        assert_eq!(iam_ashrae(89.9, ASHRAE_B), 0.0);
    }

    #[test]
    fn test_horizontal_surface_sees_ghi() {
        let zenith: f64 = 30.0;
        let dni = 800.0;
        let dhi = 100.0;
        let ghi = dni * zenith.to_radians().cos() + dhi;
        let poa = poa_components(0.0, 180.0, zenith, 180.0, ghi, dni, dhi, 1366.1);

        assert_eq!(poa.ground_diffuse, 0.0);
        assert!((poa.global() - ghi).abs() < 1.0, "poa {} ghi {}", poa.global(), ghi);
    }

    #[test]
    fn test_no_direct_when_sun_behind_plane() {
        let poa = poa_components(30.0, 180.0, 80.0, 0.0, 100.0, 300.0, 60.0, 1366.1);
        assert_eq!(poa.direct, 0.0);
        assert!(poa.sky_diffuse > 0.0);
        assert!(poa.ground_diffuse > 0.0);
    }
}
