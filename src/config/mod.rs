#[cfg(feature = "cli")]
pub mod cli;
pub mod env_file;
pub mod system_config;

use crate::adapters::openmeteo::DEFAULT_ENDPOINT;
use crate::core::model::ModelChain;
use crate::domain::model::{ArrayMount, Location, SolarInverter, SolarPanel};
use crate::utils::error::{Result, SoleilError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use chrono_tz::Tz;
use std::str::FromStr;
use system_config::HardwareConfig;

pub const ADMIN_USERNAME: &str = "admin";

/// Service configuration, read from the process environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_admin_pass: String,
    pub location: Location,
    pub arrays: Vec<ArrayMount>,
    pub openmeteo_endpoint: String,
    pub system_config: Option<String>,
    pub log_format: String,
    pub panel: SolarPanel,
    pub inverter: SolarInverter,
}

struct EnvReader<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> EnvReader<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key).ok_or_else(|| SoleilError::MissingConfig {
            field: key.to_string(),
        })
    }

    fn parse<T: FromStr>(&self, key: &str, expected: &str) -> Result<T> {
        let value = self.required(key)?;
        value.parse().map_err(|_| SoleilError::InvalidConfigValue {
            field: key.to_string(),
            value,
            reason: format!("expected {}", expected),
        })
    }

    fn array(&self, index: u8) -> Result<ArrayMount> {
        let key = |name: &str| format!("SOLAR_ARRAY{}_{}", index, name);
        Ok(ArrayMount {
            tilt: f64::from(self.parse::<i32>(&key("TILT"), "an integer")?),
            azimuth: f64::from(self.parse::<i32>(&key("AZIMUTH"), "an integer")?),
            height: f64::from(self.parse::<i32>(&key("HEIGHT"), "an integer")?),
            modules_per_string: self.parse(&key("MODULECOUNT"), "a module count")?,
        })
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from any key lookup; `SYSTEM_CONFIG` is read from disk.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = EnvReader { lookup };

        let timezone_name = env.required("LOCATION_TIMEZONE")?;
        let timezone =
            Tz::from_str(&timezone_name).map_err(|_| SoleilError::InvalidConfigValue {
                field: "LOCATION_TIMEZONE".to_string(),
                value: timezone_name.clone(),
                reason: "unknown IANA timezone".to_string(),
            })?;

        let location = Location {
            latitude: env.parse("LOCATION_LAT", "a number")?,
            longitude: env.parse("LOCATION_LON", "a number")?,
            altitude: env.parse("LOCATION_ALTITUDE", "a number")?,
            timezone,
        };

        let system_config = env.optional("SYSTEM_CONFIG");
        let hardware = match &system_config {
            Some(path) => HardwareConfig::from_file(path)?,
            None => HardwareConfig::default(),
        };

        Ok(Self {
            api_admin_pass: env.required("API_ADMIN_PASS")?,
            location,
            arrays: vec![env.array(1)?, env.array(2)?],
            openmeteo_endpoint: env
                .optional("OPENMETEO_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            system_config,
            log_format: env.optional("LOG_FORMAT").unwrap_or_else(|| "pretty".to_string()),
            panel: hardware.panel,
            inverter: hardware.inverter,
        })
    }

    pub fn model_chain(&self) -> ModelChain {
        ModelChain::new(
            self.location.clone(),
            self.arrays.clone(),
            self.panel.clone(),
            self.inverter.clone(),
        )
    }

    pub fn total_modules(&self) -> u32 {
        self.arrays.iter().map(|array| array.modules_per_string).sum()
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("API_ADMIN_PASS", &self.api_admin_pass)?;
        validate_range("LOCATION_LAT", self.location.latitude, -90.0, 90.0)?;
        validate_range("LOCATION_LON", self.location.longitude, -180.0, 180.0)?;
        validate_range("LOCATION_ALTITUDE", self.location.altitude, -500.0, 9000.0)?;
        validate_url("OPENMETEO_ENDPOINT", &self.openmeteo_endpoint)?;
        if let Some(path) = &self.system_config {
            validate_path("SYSTEM_CONFIG", path)?;
        }

        for (i, array) in self.arrays.iter().enumerate() {
            let field = |name: &str| format!("SOLAR_ARRAY{}_{}", i + 1, name);
            validate_range(&field("TILT"), array.tilt, 0.0, 90.0)?;
            validate_range(&field("AZIMUTH"), array.azimuth, 0.0, 360.0)?;
            validate_positive_number(
                &field("MODULECOUNT"),
                array.modules_per_string as usize,
                1,
            )?;
        }

        match self.log_format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            _ => Err(SoleilError::InvalidConfigValue {
                field: "LOG_FORMAT".to_string(),
                value: self.log_format.clone(),
                reason: "expected 'pretty' or 'json'".to_string(),
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_env {
    use std::collections::HashMap;

    pub fn site_env() -> HashMap<String, String> {
        [
            ("API_ADMIN_PASS", "secret"),
            ("LOCATION_LAT", "50.85"),
            ("LOCATION_LON", "4.35"),
            ("LOCATION_ALTITUDE", "60"),
            ("LOCATION_TIMEZONE", "Europe/Brussels"),
            ("SOLAR_ARRAY1_TILT", "35"),
            ("SOLAR_ARRAY1_AZIMUTH", "180"),
            ("SOLAR_ARRAY1_HEIGHT", "6"),
            ("SOLAR_ARRAY1_MODULECOUNT", "6"),
            ("SOLAR_ARRAY2_TILT", "35"),
            ("SOLAR_ARRAY2_AZIMUTH", "270"),
            ("SOLAR_ARRAY2_HEIGHT", "6"),
            ("SOLAR_ARRAY2_MODULECOUNT", "5"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }
}
