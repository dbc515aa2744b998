// # DNS Provider Trait
//
// Defines the narrow interface the reconciler needs from a hosted-zone DNS
// provider: find a zone by name, list records by name and kind, submit a
// change batch. Nothing else.
//
// ## Implementations
//
// - AWS Route 53: `r53ddns-provider-route53` crate
// - Tests: in-memory fake in `tests/common`
//
// ## Usage
//
// ```rust,ignore
// use r53ddns_core::traits::{ChangeBatch, DnsProvider, RecordKind, ResourceRecord};
//
// async fn publish(provider: &dyn DnsProvider) -> r53ddns_core::Result<()> {
//     let zones = provider.list_zones_by_name("example.com.", 1).await?;
//     let records = provider
//         .list_records("Z123", "home.example.com", RecordKind::A, 1)
//         .await?;
//
//     let record = ResourceRecord::new("home.example.com.", RecordKind::A, ["203.0.113.9"], 300);
//     provider.submit_changes("Z123", &ChangeBatch::upsert(record)).await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// DNS record kind
///
/// Only address records are managed. Kept as an enum so another kind can be
/// added without threading strings through the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// A record (IPv4 address)
    A,
}

impl RecordKind {
    /// Wire name of the record kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hosted zone as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    /// Composite identifier, e.g. `/hostedzone/Z123`
    pub id: String,
    /// Zone name with trailing dot, e.g. `example.com.`
    pub name: String,
}

impl HostedZone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Provider-side record set for one name and kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Record name with trailing dot
    pub name: String,
    /// Record kind
    pub kind: RecordKind,
    /// Address values
    pub values: Vec<String>,
    /// Time-to-live in seconds (absent for alias records)
    pub ttl: Option<i64>,
}

impl ResourceRecord {
    pub fn new<I, S>(name: impl Into<String>, kind: RecordKind, values: I, ttl: i64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind,
            values: values.into_iter().map(Into::into).collect(),
            ttl: Some(ttl),
        }
    }
}

/// Action applied by a [`Change`]
///
/// Records are only ever created or overwritten, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    /// Create the record if absent, overwrite it if present
    Upsert,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

/// A single record change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub action: ChangeAction,
    pub record: ResourceRecord,
}

/// A batch of changes submitted atomically to one zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch {
    pub changes: Vec<Change>,
}

impl ChangeBatch {
    /// A batch holding one upsert of `record`
    pub fn upsert(record: ResourceRecord) -> Self {
        Self {
            changes: vec![Change {
                action: ChangeAction::Upsert,
                record,
            }],
        }
    }
}

/// Provider acknowledgement of a submitted change batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSubmission {
    /// Provider-assigned change id
    pub id: String,
    /// Propagation status at submission time (e.g. `PENDING`)
    pub status: String,
}

impl ChangeSubmission {
    /// Id reported for a batch that was logged instead of submitted
    pub const DRY_RUN_ID: &'static str = "dry-run";

    /// Status reported for a batch that was logged instead of submitted
    pub const SKIPPED: &'static str = "SKIPPED";

    /// Acknowledgement for a batch a dry-run provider did not send
    pub fn skipped() -> Self {
        Self {
            id: Self::DRY_RUN_ID.to_string(),
            status: Self::SKIPPED.to_string(),
        }
    }

    /// Whether the batch never reached the provider
    pub fn is_skipped(&self) -> bool {
        self.status == Self::SKIPPED
    }
}

/// Trait for DNS provider implementations
///
/// Providers are thin API adapters. They perform exactly one API call per
/// method invocation and never decide whether an update is needed; that
/// decision belongs to the reconciler.
///
/// # Forbidden
///
/// - Retrying or backing off (the next scheduled cycle is the retry)
/// - Caching zones or records between calls
/// - Spawning tasks
///
/// Every call must be bounded by a timeout.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List hosted zones in name order, starting at `dns_name`
    ///
    /// The provider may return the lexicographically nearest zone rather
    /// than an exact match; callers must check the returned names.
    ///
    /// # Parameters
    ///
    /// - `dns_name`: Zone name with trailing dot (e.g. "example.com.")
    /// - `max_items`: Maximum number of zones to return
    async fn list_zones_by_name(
        &self,
        dns_name: &str,
        max_items: i32,
    ) -> Result<Vec<HostedZone>, crate::Error>;

    /// List record sets in a zone, starting at `start_name` / `kind`
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Bare zone identifier (e.g. "Z123")
    /// - `start_name`: Record name to start listing from
    /// - `kind`: Record kind to start listing from
    /// - `max_items`: Maximum number of record sets to return
    async fn list_records(
        &self,
        zone_id: &str,
        start_name: &str,
        kind: RecordKind,
        max_items: i32,
    ) -> Result<Vec<ResourceRecord>, crate::Error>;

    /// Submit a change batch to a zone
    ///
    /// # Returns
    ///
    /// - `Ok(ChangeSubmission)`: The provider accepted the batch
    /// - `Err(Error)`: The provider rejected it (permissions, validation,
    ///   throttling) or the call failed
    async fn submit_changes(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeSubmission, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
