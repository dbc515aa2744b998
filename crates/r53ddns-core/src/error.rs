//! Error types for the Route 53 DDNS system
//!
//! Every failure a reconciliation cycle can hit has its own variant. Only
//! [`Error::ConfigMissing`] and [`Error::Config`] are fatal, and only at
//! startup; everything else is logged by the engine and the next cycle retries.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which part of a reconciliation cycle failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fetching the public address from the echo service
    ResolveAddress,
    /// Zone lookup, record listing or the upsert itself
    UpdateRecord,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::ResolveAddress => f.write_str("unable to determine ip address"),
            Phase::UpdateRecord => f.write_str("could not update record"),
        }
    }
}

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// A required environment variable is not set
    #[error("{0} environmental variable is not set")]
    ConfigMissing(String),

    /// A configuration value is present but unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or unreadable response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The echo service returned something that is not an IP address
    #[error("not a valid IP address: {0:?}")]
    InvalidAddress(String),

    /// The hostname cannot be split into a label and a parent domain
    #[error("malformed hostname: {0:?}")]
    MalformedHostname(String),

    /// The provider's zone listing call itself failed
    #[error("zone lookup failed for {domain}: {message}")]
    ZoneLookup {
        /// Parent domain being looked up
        domain: String,
        /// Underlying provider message
        message: String,
    },

    /// No single hosted zone was returned for the parent domain
    #[error("could not find domain ({0})")]
    ZoneNotFound(String),

    /// The provider returned a zone, but not the one that was asked for
    #[error("hosted zone mismatch: expected {expected}, found {found}")]
    ZoneMismatch {
        /// Zone name that was requested (with trailing dot)
        expected: String,
        /// Zone name the provider returned
        found: String,
    },

    /// Listing the existing address records failed
    #[error("error listing records ({domain}): {message}")]
    ListRecords {
        /// Parent domain of the record
        domain: String,
        /// Underlying provider message
        message: String,
    },

    /// The provider refused the upsert change batch
    #[error("failed to update record set: {0}")]
    UpdateRejected(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A cycle-scoped failure, tagged with the phase it happened in
    #[error("{phase}: {source}")]
    Cycle {
        /// Failing phase
        phase: Phase,
        /// Underlying error
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a missing configuration error
    pub fn config_missing(var: impl Into<String>) -> Self {
        Self::ConfigMissing(var.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(text: impl Into<String>) -> Self {
        Self::InvalidAddress(text.into())
    }

    /// Create a malformed hostname error
    pub fn malformed_hostname(name: impl Into<String>) -> Self {
        Self::MalformedHostname(name.into())
    }

    /// Create a zone lookup error
    pub fn zone_lookup(domain: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::ZoneLookup {
            domain: domain.into(),
            message: message.to_string(),
        }
    }

    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound(domain.into())
    }

    /// Create a zone mismatch error
    pub fn zone_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::ZoneMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a record listing error
    pub fn list_records(domain: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::ListRecords {
            domain: domain.into(),
            message: message.to_string(),
        }
    }

    /// Create an update rejected error
    pub fn update_rejected(message: impl fmt::Display) -> Self {
        Self::UpdateRejected(message.to_string())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap an error with the cycle phase it occurred in
    pub fn cycle(phase: Phase, source: Error) -> Self {
        Self::Cycle {
            phase,
            source: Box::new(source),
        }
    }

    /// Whether this error must stop the process
    ///
    /// Only configuration problems are fatal. Everything else waits for the
    /// next scheduled cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigMissing(_) | Self::Config(_))
    }

    /// The innermost error, looking through [`Error::Cycle`] wrappers
    pub fn root(&self) -> &Error {
        match self {
            Self::Cycle { source, .. } => source.root(),
            other => other,
        }
    }
}
