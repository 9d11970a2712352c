use crate::utils::error::{Result, SoleilError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SoleilError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // written so that NaN fails the check
    if !(value >= min && value <= max) {
        return Err(SoleilError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("OPENMETEO_ENDPOINT", "https://api.open-meteo.com/v1/dwd-icon").is_ok());
        assert!(validate_url("OPENMETEO_ENDPOINT", "http://localhost:8080").is_ok());
        assert!(validate_url("OPENMETEO_ENDPOINT", "").is_err());
        assert!(validate_url("OPENMETEO_ENDPOINT", "invalid-url").is_err());
        assert!(validate_url("OPENMETEO_ENDPOINT", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("SOLAR_ARRAY1_MODULECOUNT", 5, 1).is_ok());
        assert!(validate_positive_number("SOLAR_ARRAY1_MODULECOUNT", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("LOCATION_LAT", 50.85, -90.0, 90.0).is_ok());
        assert!(validate_range("LOCATION_LAT", 91.0, -90.0, 90.0).is_err());
        assert!(validate_range("LOCATION_LAT", f64::NAN, -90.0, 90.0).is_err());
        assert!(validate_range("SOLAR_ARRAY1_TILT", 35, 0, 90).is_ok());
    }

    #[test]
    fn test_validate_strings_and_paths() {
        assert!(validate_non_empty_string("API_ADMIN_PASS", "secret").is_ok());
        assert!(validate_non_empty_string("API_ADMIN_PASS", "   ").is_err());
        assert!(validate_path("SYSTEM_CONFIG", "/etc/mme_soleil/system.toml").is_ok());
        assert!(validate_path("SYSTEM_CONFIG", "").is_err());
    }
}
