//! Query string parsing with accumulated errors.
//!
//! A value that is missing or does not parse falls back to its default; only
//! required parameters produce an error.

use super::responses::ApiError;
use crate::utils::time::{parse_date, parse_datetime};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use std::collections::HashMap;
use std::str::FromStr;

pub struct QueryParams {
    values: HashMap<String, String>,
    timezone: Tz,
    errors: Vec<String>,
}

impl QueryParams {
    pub fn new(values: HashMap<String, String>, timezone: Tz) -> Self {
        Self {
            values,
            timezone,
            errors: Vec::new(),
        }
    }

    fn parsed<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        self.values.get(name).and_then(|value| parse(value.trim()))
    }

    /// Records a parse error for `name` when `value` is missing.
    pub fn require<T>(&mut self, name: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.errors
                .push(format!("Failed to parse value for parameter: {}.", name));
        }
        value
    }

    pub fn datetime(&self, name: &str) -> Option<DateTime<Tz>> {
        let tz = self.timezone;
        self.parsed(name, |value| parse_datetime(&tz, value))
    }

    pub fn required_datetime(&mut self, name: &str) -> Option<DateTime<Tz>> {
        let value = self.datetime(name);
        self.require(name, value)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.parsed(name, parse_date)
    }

    pub fn number<T: FromStr>(&self, name: &str) -> Option<T> {
        self.parsed(name, |value| value.parse().ok())
    }

    pub fn required_number<T: FromStr>(&mut self, name: &str) -> Option<T> {
        let value = self.number(name);
        self.require(name, value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Records a range error unless `end` lies after `start`.
    pub fn check_range(&mut self, start: &DateTime<Tz>, end: Option<&DateTime<Tz>>) {
        if let Some(end) = end {
            if end <= start {
                self.error("Validation error: end should be greater than start.");
            }
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::BadRequest(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Brussels;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            Brussels,
        )
    }

    #[test]
    fn test_invalid_optional_values_fall_back() {
        let params = params(&[("min_kwh", "lots"), ("min_temp", "18.5")]);
        assert_eq!(params.number::<f64>("min_kwh"), None);
        assert_eq!(params.number::<f64>("min_temp"), Some(18.5));
        assert_eq!(params.number::<f64>("missing"), None);
        assert!(params.finish().is_ok());
    }

    #[test]
    fn test_errors_accumulate_in_order() {
        let mut params = params(&[("end", "2024-06-01T08:00"), ("precision", "x")]);
        let start = Brussels.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let end = params.required_datetime("end");
        params.check_range(&start, end.as_ref());
        params.required_number::<i32>("precision");

        match params.finish() {
            Err(ApiError::BadRequest(errors)) => assert_eq!(
                errors,
                vec![
                    "Validation error: end should be greater than start.".to_string(),
                    "Failed to parse value for parameter: precision.".to_string(),
                ]
            ),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
