//! Record reconciliation
//!
//! One call to [`reconcile`] compares the provider's address record for a
//! hostname with the observed address and, only if they differ, submits a
//! single upsert.
//!
//! ```text
//! hostname ── split ──► parent domain ── locate_zone ──► zone id
//!                                                           │
//!                      list_records(fqdn, A, max 1) ◄───────┘
//!                                   │
//!              ┌────────────────────┼────────────────────┐
//!              ▼                    ▼                    ▼
//!           Missing               Stale             Consistent
//!              └─────── upsert ─────┘                 (no write)
//! ```

use super::zone::{Zone, locate_zone};
use crate::error::{Error, Result};
use crate::hostname::Hostname;
use crate::traits::{
    ChangeBatch, ChangeSubmission, DnsProvider, ObservedAddress, RecordKind, ResourceRecord,
};
use tracing::{debug, info};

/// Record kind written by the reconciler
pub const RECORD_KIND: RecordKind = RecordKind::A;

/// Time-to-live of the upserted record, in seconds
pub const RECORD_TTL: i64 = 300;

/// Outcome of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationResult {
    /// The record already holds the observed address; nothing was written
    AlreadyConsistent {
        /// Hostname that was checked
        hostname: String,
        /// Zone the record lives in
        zone_id: String,
    },

    /// An upsert was submitted
    Updated {
        /// Hostname that was updated
        hostname: String,
        /// Zone the change was submitted to
        zone_id: String,
        /// Values the record held before (empty if it did not exist)
        previous_values: Vec<String>,
        /// Provider acknowledgement
        change: ChangeSubmission,
    },
}

impl ReconciliationResult {
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// How the provider's record compares to the observed address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchState {
    /// No record with this exact name
    Missing,
    /// Record exists, none of its values is the observed address
    Stale(Vec<String>),
    /// Record exists and holds the observed address
    Consistent,
}

/// Compare a record listing against the observed address
///
/// Only the first listed record is considered, and only if its name is
/// exactly `absolute_name`.
pub fn match_state(
    records: &[ResourceRecord],
    absolute_name: &str,
    address: &ObservedAddress,
) -> MatchState {
    match records.first() {
        Some(record) if record.name == absolute_name && record.kind == RECORD_KIND => {
            if record.values.iter().any(|v| address.matches(v)) {
                MatchState::Consistent
            } else {
                MatchState::Stale(record.values.clone())
            }
        }
        _ => MatchState::Missing,
    }
}

/// Bring the provider's address record for `fqdn` in line with `address`
///
/// # Errors
///
/// - [`Error::MalformedHostname`] if `fqdn` has no parent domain
/// - zone lookup errors from [`locate_zone`]
/// - [`Error::ListRecords`] if the record listing fails
/// - [`Error::UpdateRejected`] if the provider refuses the upsert
///
/// Nothing is retried here; the next scheduled cycle is the retry.
pub async fn reconcile(
    provider: &dyn DnsProvider,
    address: &ObservedAddress,
    fqdn: &str,
) -> Result<ReconciliationResult> {
    let hostname = Hostname::parse(fqdn)?;
    let zone = locate_zone(provider, hostname.parent()).await?;
    let absolute_name = hostname.absolute();

    let records = provider
        .list_records(&zone.id, hostname.as_str(), RECORD_KIND, 1)
        .await
        .map_err(|e| Error::list_records(hostname.parent(), e))?;

    let previous_values = match match_state(&records, &absolute_name, address) {
        MatchState::Consistent => {
            info!("{} already registered in {} as {}", address, provider.provider_name(), hostname);
            return Ok(ReconciliationResult::AlreadyConsistent {
                hostname: hostname.to_string(),
                zone_id: zone.id,
            });
        }
        MatchState::Missing => {
            debug!("No {} record named {} in zone {}", RECORD_KIND, absolute_name, zone.name);
            Vec::new()
        }
        MatchState::Stale(values) => {
            debug!("Record {} holds {:?}, expected {}", absolute_name, values, address);
            values
        }
    };

    let change = upsert(provider, &zone, &absolute_name, address).await?;

    if change.is_skipped() {
        info!(
            "[DRY-RUN] change for zone ID {} to register {} as {} was not submitted",
            zone.id, address, hostname
        );
    } else {
        info!(
            "submitted change for zone ID {} to register {} as {}",
            zone.id, address, hostname
        );
    }

    Ok(ReconciliationResult::Updated {
        hostname: hostname.to_string(),
        zone_id: zone.id,
        previous_values,
        change,
    })
}

async fn upsert(
    provider: &dyn DnsProvider,
    zone: &Zone,
    absolute_name: &str,
    address: &ObservedAddress,
) -> Result<ChangeSubmission> {
    let record = ResourceRecord::new(absolute_name, RECORD_KIND, [address.as_str()], RECORD_TTL);

    provider
        .submit_changes(&zone.id, &ChangeBatch::upsert(record))
        .await
        .map_err(Error::update_rejected)
}
