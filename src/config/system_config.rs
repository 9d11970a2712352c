use crate::domain::model::{SolarInverter, SolarPanel};
use crate::utils::error::{Result, SoleilError};
use crate::utils::validation::{validate_range, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Datasheet overrides read from the `SYSTEM_CONFIG` TOML file.
///
/// ```toml
/// [panel]
/// name = "Hyundai HiE-S400VG"
/// stc = 400.0
///
/// [inverter]
/// paco = "${INVERTER_PACO}"
/// ```
///
/// Fields left out keep the values of the installed hardware.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default)]
    pub panel: SolarPanel,
    #[serde(default)]
    pub inverter: SolarInverter,
}

impl HardwareConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content, |name| std::env::var(name).ok())
    }

    pub fn from_toml_str(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let substituted = substitute_env_vars(content, lookup)?;
        let config: HardwareConfig = toml::from_str(&substituted)?;
        config.validate()?;
        Ok(config)
    }
}

/// Replaces `${VAR}` with the variable's value. Unknown variables are left as written.
fn substitute_env_vars(content: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| SoleilError::processing(format!("Invalid substitution pattern: {}", e)))?;

    let result = re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}

impl Validate for HardwareConfig {
    fn validate(&self) -> Result<()> {
        validate_range("panel.n_s", self.panel.n_s, 1.0, f64::MAX)?;
        validate_range("panel.a_ref", self.panel.a_ref, f64::MIN_POSITIVE, f64::MAX)?;
        validate_range("panel.i_o_ref", self.panel.i_o_ref, f64::MIN_POSITIVE, f64::MAX)?;
        validate_range("panel.r_sh_ref", self.panel.r_sh_ref, f64::MIN_POSITIVE, f64::MAX)?;
        validate_range("panel.r_s", self.panel.r_s, 0.0, f64::MAX)?;
        validate_range("inverter.paco", self.inverter.paco, f64::MIN_POSITIVE, f64::MAX)?;
        validate_range("inverter.pdco", self.inverter.pdco, f64::MIN_POSITIVE, f64::MAX)?;
        validate_range("inverter.pso", self.inverter.pso, 0.0, self.inverter.pdco)?;
        Ok(())
    }
}
