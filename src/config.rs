use serde::Serialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Shape of the daily booking grid.
///
/// Must satisfy [`SchedulerConfig::validate`] before it is handed to the slot
/// generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchedulerConfig {
    pub start_hour: u32,
    /// Exclusive.
    pub end_hour: u32,
    pub interval_minutes: u32,
    pub excluded_hours: Vec<u32>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_hour: 8,
            end_hour: 17,
            interval_minutes: 20,
            excluded_hours: vec![12],
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end_hour > 24 || self.start_hour >= self.end_hour {
            return Err(ConfigError::InvalidSchedule(format!(
                "hours {}..{} do not form a day window",
                self.start_hour, self.end_hour
            )));
        }
        if self.interval_minutes == 0 || 60 % self.interval_minutes != 0 {
            return Err(ConfigError::InvalidSchedule(format!(
                "interval of {} minutes does not divide an hour",
                self.interval_minutes
            )));
        }
        if let Some(hour) = self
            .excluded_hours
            .iter()
            .find(|&&hour| hour <= self.start_hour || hour >= self.end_hour)
        {
            return Err(ConfigError::InvalidSchedule(format!(
                "excluded hour {} must fall strictly inside {}..{}",
                hour, self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }

    pub fn slots_per_hour(&self) -> usize {
        (60 / self.interval_minutes.max(1)) as usize
    }
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub record_service_url: String,
    pub record_service_token: Option<String>,
    pub bind_addr: String,
    pub is_production: bool,
    pub request_timeout: Duration,
    pub scheduler: SchedulerConfig,
}

impl ServiceConfig {
    /// Load from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SchedulerConfig::default();

        let excluded_hours = match lookup("SCHEDULE_EXCLUDED_HOURS") {
            Some(raw) => parse_hour_list(&raw)?,
            None => defaults.excluded_hours,
        };

        let scheduler = SchedulerConfig {
            start_hour: parse_var(&lookup, "SCHEDULE_START_HOUR", defaults.start_hour)?,
            end_hour: parse_var(&lookup, "SCHEDULE_END_HOUR", defaults.end_hour)?,
            interval_minutes: parse_var(
                &lookup,
                "SCHEDULE_INTERVAL_MINUTES",
                defaults.interval_minutes,
            )?,
            excluded_hours,
        };
        scheduler.validate()?;

        let timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 10)?;

        Ok(Self {
            record_service_url: lookup("RECORD_SERVICE_URL")
                .unwrap_or_else(|| "http://localhost:8080/api".to_string()),
            record_service_token: lookup("RECORD_SERVICE_TOKEN").filter(|t| !t.is_empty()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            is_production: lookup("ENVIRONMENT")
                .map(|val| val.to_lowercase() == "production")
                .unwrap_or(false),
            request_timeout: Duration::from_secs(timeout_secs),
            scheduler,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
            name,
            expected: "a non-negative integer",
            value: raw,
        }),
        None => Ok(default),
    }
}

fn parse_hour_list(raw: &str) -> Result<Vec<u32>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| ConfigError::InvalidVar {
                name: "SCHEDULE_EXCLUDED_HOURS",
                expected: "a comma-separated list of hours",
                value: raw.to_string(),
            })
        })
        .collect()
}
