//! The PV model chain: weather in, inverter AC power out.

use crate::core::clearsky::{
    altitude_to_pressure, simplified_solis, DEFAULT_AOD700, DEFAULT_PRECIPITABLE_WATER,
};
use crate::core::irradiance::{aoi, iam_ashrae, poa_components, ASHRAE_B};
use crate::core::pvsystem::{calcparams_cec, sandia_multi, DcInput, SapmTemperature, CLOSE_MOUNT_GLASS_GLASS};
use crate::core::solar_position::{extra_radiation, solar_position};
use crate::domain::model::{ArrayMount, Location, SolarInverter, SolarPanel, TimeSeries, WeatherSample};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

const DEFAULT_TEMP_AIR: f64 = 20.0;
const DEFAULT_WIND_SPEED: f64 = 0.0;

/// Resolution of every modelled series.
pub const STEP_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct ModelChain {
    location: Location,
    arrays: Vec<ArrayMount>,
    panel: SolarPanel,
    inverter: SolarInverter,
    temperature_model: SapmTemperature,
    pressure: f64,
}

impl ModelChain {
    pub fn new(
        location: Location,
        arrays: Vec<ArrayMount>,
        panel: SolarPanel,
        inverter: SolarInverter,
    ) -> Self {
        let pressure = altitude_to_pressure(location.altitude);
        Self {
            location,
            arrays,
            panel,
            inverter,
            temperature_model: CLOSE_MOUNT_GLASS_GLASS,
            pressure,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn inverter(&self) -> &SolarInverter {
        &self.inverter
    }

    /// Clear-sky irradiance at each instant, without temperature or wind.
    pub fn clearsky(&self, times: &[DateTime<Tz>]) -> TimeSeries<WeatherSample> {
        let points = times
            .iter()
            .map(|time| {
                let position =
                    solar_position(time, self.location.latitude, self.location.longitude);
                let sky = simplified_solis(
                    position.apparent_elevation(),
                    extra_radiation(time),
                    self.pressure,
                    DEFAULT_AOD700,
                    DEFAULT_PRECIPITABLE_WATER,
                );
                (
                    *time,
                    WeatherSample {
                        ghi: sky.ghi,
                        dni: sky.dni,
                        dhi: sky.dhi,
                        temp_air: None,
                        wind_speed: None,
                    },
                )
            })
            .collect();
        TimeSeries::new(points)
    }

    /// AC power in W for one weather sample.
    pub fn ac_power(&self, time: &DateTime<Tz>, weather: &WeatherSample) -> f64 {
        let position = solar_position(time, self.location.latitude, self.location.longitude);
        let dni_extra = extra_radiation(time);
        let temp_air = weather.temp_air.unwrap_or(DEFAULT_TEMP_AIR);
        let wind_speed = weather.wind_speed.unwrap_or(DEFAULT_WIND_SPEED);

        let inputs: Vec<DcInput> = self
            .arrays
            .iter()
            .map(|array| {
                let poa = poa_components(
                    array.tilt,
                    array.azimuth,
                    position.zenith,
                    position.azimuth,
                    weather.ghi,
                    weather.dni,
                    weather.dhi,
                    dni_extra,
                );
                let incidence = aoi(array.tilt, array.azimuth, position.zenith, position.azimuth);
                // no spectral correction
                let effective = poa.direct * iam_ashrae(incidence, ASHRAE_B) + poa.diffuse();
                let temp_cell =
                    self.temperature_model
                        .cell_temperature(poa.global(), temp_air, wind_speed);

                let mpp = calcparams_cec(&self.panel, effective, temp_cell).max_power_point();
                let modules = f64::from(array.modules_per_string);
                let strings = f64::from(ArrayMount::STRINGS);
                DcInput {
                    v_dc: mpp.v_mp * modules,
                    p_dc: mpp.p_mp * modules * strings,
                }
            })
            .collect();

        sandia_multi(&self.inverter, &inputs)
    }

    pub fn run(&self, weather: &TimeSeries<WeatherSample>) -> TimeSeries<f64> {
        weather.map_with_time(|time, sample| self.ac_power(time, sample))
    }
}

/// Instants every five minutes from `start` to `end`, both included.
pub fn time_grid(start: DateTime<Tz>, end: DateTime<Tz>) -> Vec<DateTime<Tz>> {
    let step = Duration::minutes(STEP_MINUTES);
    let mut times = Vec::new();
    let mut current = start;
    while current <= end {
        times.push(current);
        current += step;
    }
    times
}
