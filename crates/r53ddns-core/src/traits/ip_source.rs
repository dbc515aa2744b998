// # IP Source Trait
//
// Defines the interface for discovering the caller's current public address.
//
// ## Implementations
//
// - HTTP echo service: `r53ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use r53ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> r53ddns_core::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let address = source.current().await?;
//     println!("public address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// A validated public IP address, as reported by the echo service
///
/// The original text is kept exactly as received (minus one trailing
/// newline) next to the parsed address. Comparisons against provider values
/// go through the parsed form, so `2001:DB8::1` and `2001:db8::1` are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedAddress {
    text: String,
    addr: IpAddr,
}

impl ObservedAddress {
    /// Parse a response body from an IP echo service
    ///
    /// Exactly one trailing `\n` is removed; any other surrounding content
    /// makes the body invalid.
    pub fn parse(body: &str) -> crate::Result<Self> {
        let text = body.strip_suffix('\n').unwrap_or(body);

        let addr: IpAddr = text
            .parse()
            .map_err(|_| crate::Error::invalid_address(text))?;

        Ok(Self {
            text: text.to_string(),
            addr,
        })
    }

    /// The address text as resolved
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The parsed address
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// Whether a provider-side record value holds this address
    pub fn matches(&self, value: &str) -> bool {
        value.parse::<IpAddr>().is_ok_and(|v| v == self.addr)
    }
}

impl From<IpAddr> for ObservedAddress {
    fn from(addr: IpAddr) -> Self {
        Self {
            text: addr.to_string(),
            addr,
        }
    }
}

impl fmt::Display for ObservedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Trait for IP source implementations
///
/// An IP source answers one question per call: what is the public address
/// right now. Results are never cached between calls; the engine asks again
/// on every cycle.
///
/// Implementations must bound every network call with a timeout so that a
/// stalled request cannot hold up the scheduler.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(ObservedAddress)`: The current address
    /// - `Err(Error::Transport)`: Network failure or unreadable body
    /// - `Err(Error::InvalidAddress)`: The body is not an IP address
    async fn current(&self) -> Result<ObservedAddress, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
