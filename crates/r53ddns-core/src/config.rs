//! Configuration types for the DDNS system
//!
//! Configuration is read once at startup, from environment variables, and is
//! immutable afterwards. AWS credentials and region are not part of it; they
//! come from the standard AWS environment chain.

use crate::error::{Error, Result};
use crate::hostname::Hostname;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hostname to keep updated (required)
pub const HOSTNAME_ENV: &str = "CONFIG_R53DDNS_HOSTNAME";
/// IP echo service URL (required)
pub const IP_URL_ENV: &str = "CONFIG_R53DDNS_IPURL";
/// Seconds between reconciliation cycles
pub const INTERVAL_ENV: &str = "CONFIG_R53DDNS_INTERVAL_SECS";
/// Per-request timeout in seconds
pub const TIMEOUT_ENV: &str = "CONFIG_R53DDNS_TIMEOUT_SECS";
/// `live` or `dry-run`
pub const MODE_ENV: &str = "CONFIG_R53DDNS_MODE";

/// Main DDNS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Fully-qualified hostname to keep updated (e.g. "home.example.com")
    pub hostname: String,

    /// URL of a service that echoes the caller's address as plain text
    pub ip_url: String,

    /// Seconds between reconciliation cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Timeout applied to every outbound request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether record changes are submitted or only logged
    #[serde(default)]
    pub mode: Mode,
}

/// Update mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Submit changes to the provider
    #[default]
    Live,
    /// Perform reads, log the change that would be made, submit nothing
    DryRun,
}

impl Mode {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "dry-run" => Ok(Mode::DryRun),
            other => Err(Error::config(format!(
                "{} '{}' is not valid. Valid modes: live, dry-run",
                MODE_ENV, other
            ))),
        }
    }
}

impl DdnsConfig {
    /// Create a configuration with default interval, timeout and mode
    pub fn new(hostname: impl Into<String>, ip_url: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ip_url: ip_url.into(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            mode: Mode::default(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let hostname = get(HOSTNAME_ENV).ok_or_else(|| Error::config_missing(HOSTNAME_ENV))?;
        let ip_url = get(IP_URL_ENV).ok_or_else(|| Error::config_missing(IP_URL_ENV))?;

        let mut config = Self::new(hostname, ip_url);

        if let Some(value) = get(INTERVAL_ENV) {
            config.interval_secs = parse_secs(INTERVAL_ENV, &value)?;
        }
        if let Some(value) = get(TIMEOUT_ENV) {
            config.timeout_secs = parse_secs(TIMEOUT_ENV, &value)?;
        }
        if let Some(value) = get(MODE_ENV) {
            config.mode = Mode::parse(&value)?;
        }

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Hostname::parse(&self.hostname)
            .map_err(|_| {
                Error::config(format!(
                    "{} must be a fully-qualified name such as home.example.com. Got: {}",
                    HOSTNAME_ENV, self.hostname
                ))
            })?
            .validate_labels()?;

        if !self.ip_url.starts_with("https://") && !self.ip_url.starts_with("http://") {
            return Err(Error::config(format!(
                "{} must use HTTP or HTTPS scheme. Got: {}",
                IP_URL_ENV, self.ip_url
            )));
        }

        if !(10..=86_400).contains(&self.interval_secs) {
            return Err(Error::config(format!(
                "{} must be between 10 and 86400 seconds. Got: {}",
                INTERVAL_ENV, self.interval_secs
            )));
        }

        if !(1..=300).contains(&self.timeout_secs) {
            return Err(Error::config(format!(
                "{} must be between 1 and 300 seconds. Got: {}",
                TIMEOUT_ENV, self.timeout_secs
            )));
        }

        // Four sequential calls per cycle must fit comfortably in one interval
        if self.timeout_secs >= self.interval_secs {
            return Err(Error::config(format!(
                "{} ({}) must be shorter than {} ({})",
                TIMEOUT_ENV, self.timeout_secs, INTERVAL_ENV, self.interval_secs
            )));
        }

        Ok(())
    }

    /// Interval between cycles
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Timeout for each outbound request
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == Mode::DryRun
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|_| {
        Error::config(format!(
            "{} must be a whole number of seconds. Got: {}",
            key, value
        ))
    })
}

fn default_interval_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    10
}
