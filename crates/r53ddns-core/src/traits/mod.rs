//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Discover the current public address
//! - [`DnsProvider`]: Read and upsert records in a hosted zone

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, ObservedAddress};
pub use dns_provider::{
    Change, ChangeAction, ChangeBatch, ChangeSubmission, DnsProvider, HostedZone, RecordKind,
    ResourceRecord,
};
