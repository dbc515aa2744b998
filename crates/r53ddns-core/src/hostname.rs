//! Hostname parsing
//!
//! A managed hostname is split at its first dot into the leaf label and the
//! parent domain. The parent domain is what the hosted zone is looked up by.

use crate::error::{Error, Result};
use std::fmt;

/// Label separator
pub const SEPARATOR: char = '.';

/// Split a fully-qualified name at the first separator
///
/// `"home.example.com"` becomes `("home", "example.com")`.
///
/// # Errors
///
/// [`Error::MalformedHostname`] if there is no separator, or if either side
/// of it is empty.
pub fn split(fqdn: &str) -> Result<(&str, &str)> {
    match fqdn.split_once(SEPARATOR) {
        Some((label, parent)) if !label.is_empty() && !parent.is_empty() => Ok((label, parent)),
        _ => Err(Error::malformed_hostname(fqdn)),
    }
}

/// A fully-qualified hostname with a non-empty label and parent domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hostname {
    fqdn: String,
    label_len: usize,
}

impl Hostname {
    /// Parse a hostname
    ///
    /// An absolute name (`home.example.com.`) is accepted and stored without
    /// its trailing dot. Names are case-insensitive and stored lowercase, the
    /// form hosted-zone APIs report them in.
    pub fn parse(name: &str) -> Result<Self> {
        let fqdn = name.strip_suffix(SEPARATOR).unwrap_or(name);
        let (label, _) = split(fqdn)?;

        Ok(Self {
            fqdn: fqdn.to_ascii_lowercase(),
            label_len: label.len(),
        })
    }

    /// The hostname without trailing dot
    pub fn as_str(&self) -> &str {
        &self.fqdn
    }

    /// The leaf label (`home` in `home.example.com`)
    pub fn label(&self) -> &str {
        &self.fqdn[..self.label_len]
    }

    /// The parent domain (`example.com` in `home.example.com`)
    pub fn parent(&self) -> &str {
        &self.fqdn[self.label_len + 1..]
    }

    /// The hostname with the trailing dot providers use for record names
    pub fn absolute(&self) -> String {
        format!("{}{}", self.fqdn, SEPARATOR)
    }

    /// Check every label against RFC 1035 rules
    ///
    /// Not needed to split the name, but catches typos in configuration
    /// before the first cycle runs.
    pub fn validate_labels(&self) -> Result<()> {
        let domain = self.as_str();

        if domain.len() > 253 {
            return Err(Error::config(format!(
                "Domain name too long: {} chars (max 253). Got: {}",
                domain.len(),
                domain
            )));
        }

        for label in domain.split(SEPARATOR) {
            if label.is_empty() {
                return Err(Error::config(format!(
                    "Domain name has empty label: '{}'",
                    domain
                )));
            }

            if label.len() > 63 {
                return Err(Error::config(format!(
                    "Domain label too long: {} chars (max 63). Label: '{}'",
                    label.len(),
                    label
                )));
            }

            if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(Error::config(format!(
                    "Domain label contains invalid characters. Label: '{}'. \
                    Valid: alphanumeric and hyphen only.",
                    label
                )));
            }

            if label.starts_with('-') || label.ends_with('-') {
                return Err(Error::config(format!(
                    "Domain label cannot start or end with hyphen. Label: '{}'",
                    label
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fqdn)
    }
}
