use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoleilError {
    #[error("Weather API request failed: {0}")]
    WeatherApi(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Environment file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Missing configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Model results are not available yet")]
    ModelUnavailable,

    #[error("No weather data has been fetched yet")]
    NoWeatherData,

    #[error("No data was found for the requested period")]
    NoData,

    #[error("Data processing error: {message}")]
    Processing { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code used when an error of this severity ends the program.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SoleilError {
    pub fn validation(message: impl Into<String>) -> Self {
        SoleilError::Validation {
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        SoleilError::Processing {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SoleilError::MissingConfig { .. }
            | SoleilError::InvalidConfigValue { .. }
            | SoleilError::Toml(_)
            | SoleilError::EnvFile(_) => ErrorCategory::Configuration,
            SoleilError::WeatherApi(_) => ErrorCategory::Network,
            SoleilError::Csv(_)
            | SoleilError::Serialization(_)
            | SoleilError::Validation { .. }
            | SoleilError::ModelUnavailable
            | SoleilError::NoWeatherData
            | SoleilError::NoData
            | SoleilError::Processing { .. } => ErrorCategory::Data,
            SoleilError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SoleilError::MissingConfig { .. }
            | SoleilError::InvalidConfigValue { .. }
            | SoleilError::Toml(_)
            | SoleilError::EnvFile(_)
            | SoleilError::Io(_) => ErrorSeverity::Critical,
            SoleilError::WeatherApi(_) => ErrorSeverity::Medium,
            SoleilError::ModelUnavailable | SoleilError::NoWeatherData | SoleilError::NoData => {
                ErrorSeverity::Low
            }
            SoleilError::Csv(_)
            | SoleilError::Serialization(_)
            | SoleilError::Validation { .. }
            | SoleilError::Processing { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SoleilError::MissingConfig { .. } => {
                "Add the missing variable to the environment file"
            }
            SoleilError::InvalidConfigValue { .. } => {
                "Fix the value in the environment file or the system config"
            }
            SoleilError::Toml(_) => "Check the syntax of the SYSTEM_CONFIG file",
            SoleilError::EnvFile(_) => {
                "Make sure the environment file exists and contains KEY=value lines"
            }
            SoleilError::WeatherApi(_) => {
                "Check network connectivity; the next scheduled run will retry"
            }
            SoleilError::Io(_) => "Check file permissions and that the address is free",
            SoleilError::ModelUnavailable | SoleilError::NoWeatherData => {
                "Wait for the first model run to complete"
            }
            SoleilError::NoData => "Request a period covered by the forecast",
            SoleilError::Csv(_) | SoleilError::Serialization(_) => {
                "Check the output destination"
            }
            SoleilError::Validation { .. } | SoleilError::Processing { .. } => {
                "Check the request parameters"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SoleilError::MissingConfig { field } => {
                format!("Configuration value {} is not set", field)
            }
            SoleilError::InvalidConfigValue { field, reason, .. } => {
                format!("Configuration value {} is invalid: {}", field, reason)
            }
            SoleilError::EnvFile(e) => format!("Could not load the environment file: {}", e),
            SoleilError::WeatherApi(_) => "The weather forecast could not be fetched".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SoleilError>;
