//! Module, cell temperature and inverter models.

use crate::domain::model::{SolarInverter, SolarPanel};

/// SAPM temperature coefficients for a glass/glass module mounted close to the roof.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SapmTemperature {
    pub a: f64,
    pub b: f64,
    pub delta_t: f64,
}

pub const CLOSE_MOUNT_GLASS_GLASS: SapmTemperature = SapmTemperature {
    a: -2.98,
    b: -0.0471,
    delta_t: 1.0,
};

impl SapmTemperature {
    /// Cell temperature in °C.
    pub fn cell_temperature(&self, poa_global: f64, temp_air: f64, wind_speed: f64) -> f64 {
        let module = poa_global * (self.a + self.b * wind_speed).exp() + temp_air;
        module + poa_global / 1000.0 * self.delta_t
    }
}

const BOLTZMANN_EV: f64 = 8.617_332_478e-5;
const EG_REF: f64 = 1.121;
const D_EGDT: f64 = -0.0002677;
const IRRAD_REF: f64 = 1000.0;
const TEMP_REF: f64 = 25.0;

/// Single-diode equation parameters at operating conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiodeParameters {
    pub photocurrent: f64,
    pub saturation_current: f64,
    pub resistance_series: f64,
    pub resistance_shunt: f64,
    pub n_ns_vth: f64,
}

/// CEC model: De Soto parameters with the temperature coefficient scaled by `adjust`.
pub fn calcparams_cec(panel: &SolarPanel, effective_irradiance: f64, temp_cell: f64) -> DiodeParameters {
    let alpha_sc = panel.alpha_sc * (1.0 - panel.adjust / 100.0);

    let tref_k = TEMP_REF + 273.15;
    let tcell_k = temp_cell + 273.15;

    let eg = EG_REF * (1.0 + D_EGDT * (tcell_k - tref_k));
    let n_ns_vth = panel.a_ref * (tcell_k / tref_k);

    let photocurrent =
        effective_irradiance / IRRAD_REF * (panel.i_l_ref + alpha_sc * (tcell_k - tref_k));
    let saturation_current = panel.i_o_ref
        * (tcell_k / tref_k).powi(3)
        * (EG_REF / (BOLTZMANN_EV * tref_k) - eg / (BOLTZMANN_EV * tcell_k)).exp();
    let resistance_shunt = if effective_irradiance > 0.0 {
        panel.r_sh_ref * (IRRAD_REF / effective_irradiance)
    } else {
        f64::INFINITY
    };

    DiodeParameters {
        photocurrent,
        saturation_current,
        resistance_series: panel.r_s,
        resistance_shunt,
        n_ns_vth,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxPowerPoint {
    pub v_mp: f64,
    pub i_mp: f64,
    pub p_mp: f64,
}

impl MaxPowerPoint {
    const ZERO: MaxPowerPoint = MaxPowerPoint {
        v_mp: 0.0,
        i_mp: 0.0,
        p_mp: 0.0,
    };
}

impl DiodeParameters {
    /// Terminal current and voltage for a given voltage across the diode.
    fn operating_point(&self, diode_voltage: f64) -> (f64, f64) {
        let current = self.photocurrent
            - self.saturation_current * ((diode_voltage / self.n_ns_vth).exp() - 1.0)
            - diode_voltage / self.resistance_shunt;
        let voltage = diode_voltage - current * self.resistance_series;
        (current, voltage)
    }

    /// Maximum power point, searched along the diode voltage.
    pub fn max_power_point(&self) -> MaxPowerPoint {
        if self.photocurrent <= 0.0 || !self.photocurrent.is_finite() {
            return MaxPowerPoint::ZERO;
        }

        // open circuit: current through the terminals is zero
        let mut low = 0.0;
        let mut high = self.n_ns_vth * (self.photocurrent / self.saturation_current + 1.0).ln();
        for _ in 0..80 {
            let mid = 0.5 * (low + high);
            if self.operating_point(mid).0 > 0.0 {
                low = mid;
            } else {
                high = mid;
            }
        }
        let voc_diode = low;

        let power = |vd: f64| {
            let (i, v) = self.operating_point(vd);
            i * v
        };

        let ratio = 0.5 * (5.0_f64.sqrt() - 1.0);
        let (mut a, mut b) = (0.0, voc_diode);
        let mut c = b - ratio * (b - a);
        let mut d = a + ratio * (b - a);
        for _ in 0..100 {
            if power(c) > power(d) {
                b = d;
            } else {
                a = c;
            }
            c = b - ratio * (b - a);
            d = a + ratio * (b - a);
        }

        let (i_mp, v_mp) = self.operating_point(0.5 * (a + b));
        let p_mp = i_mp * v_mp;
        if p_mp <= 0.0 {
            return MaxPowerPoint::ZERO;
        }
        MaxPowerPoint { v_mp, i_mp, p_mp }
    }
}

/// DC input of one MPPT tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcInput {
    pub v_dc: f64,
    pub p_dc: f64,
}

fn sandia_power(inverter: &SolarInverter, v_dc: f64, p_dc: f64) -> f64 {
    let a = inverter.pdco * (1.0 + inverter.c1 * (v_dc - inverter.vdco));
    let b = inverter.pso * (1.0 + inverter.c2 * (v_dc - inverter.vdco));
    let c = inverter.c0 * (1.0 + inverter.c3 * (v_dc - inverter.vdco));
    (inverter.paco / (a - b) - c * (a - b)) * (p_dc - b) + c * (p_dc - b).powi(2)
}

/// Sandia inverter model with several DC inputs.
pub fn sandia_multi(inverter: &SolarInverter, inputs: &[DcInput]) -> f64 {
    let total: f64 = inputs.iter().map(|input| input.p_dc).sum();
    if total < inverter.pso {
        return -inverter.pnt.abs();
    }

    let power: f64 = inputs
        .iter()
        .map(|input| input.p_dc / total * sandia_power(inverter, input.v_dc, total))
        .sum();
    power.min(inverter.paco)
}
