//! Runtime configuration.
//!
//! Everything a deployment may tune: history capacity, the data directory,
//! and the three service endpoints. Values load from `LEAFWISE_*`
//! environment variables with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::diagnose::ServiceEndpoints;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Configuration for the diagnosis pipeline and history store.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum history entries kept (default: 15).
    pub history_capacity: usize,
    /// Directory the persisted history lives in (default: current directory).
    pub data_dir: PathBuf,
    /// Classifier service endpoint.
    pub classify_url: String,
    /// Summary service endpoint.
    pub summarize_url: String,
    /// Treatment service endpoint.
    pub treatment_url: String,
    /// Request timeout for service calls in seconds (default: 30).
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let endpoints = ServiceEndpoints::default();
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            data_dir: PathBuf::from("."),
            classify_url: endpoints.classify_url,
            summarize_url: endpoints.summarize_url,
            treatment_url: endpoints.treatment_url,
            request_timeout_secs: endpoints.timeout.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let history_capacity = std::env::var("LEAFWISE_HISTORY_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.history_capacity);

        let data_dir = std::env::var("LEAFWISE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let classify_url =
            std::env::var("LEAFWISE_CLASSIFY_URL").unwrap_or(defaults.classify_url);

        let summarize_url =
            std::env::var("LEAFWISE_SUMMARIZE_URL").unwrap_or(defaults.summarize_url);

        let treatment_url =
            std::env::var("LEAFWISE_TREATMENT_URL").unwrap_or(defaults.treatment_url);

        let request_timeout_secs = std::env::var("LEAFWISE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        Self {
            history_capacity,
            data_dir,
            classify_url,
            summarize_url,
            treatment_url,
            request_timeout_secs,
        }
    }

    /// Endpoint set for [`HttpDiagnosisServices`](crate::HttpDiagnosisServices).
    pub fn service_endpoints(&self) -> ServiceEndpoints {
        ServiceEndpoints {
            classify_url: self.classify_url.clone(),
            summarize_url: self.summarize_url.clone(),
            treatment_url: self.treatment_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_history_capacity_constant() {
        let config = Config::default();
        assert_eq!(config.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(config.history_capacity, 15);
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn service_endpoints_carry_the_configured_timeout() {
        let config = Config {
            request_timeout_secs: 5,
            ..Config::default()
        };
        let endpoints = config.service_endpoints();
        assert_eq!(endpoints.timeout, Duration::from_secs(5));
        assert_eq!(endpoints.classify_url, config.classify_url);
    }
}
