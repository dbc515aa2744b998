// # Route 53 DNS Provider
//
// This crate provides the AWS Route 53 implementation of `DnsProvider`.
//
// ## Behavior
//
// - One API call per trait method, nothing cached between calls
// - Every call is bounded by the SDK operation timeout
// - SDK retries are disabled: the next scheduled cycle is the retry
// - Dry-run mode performs all reads and logs the change batch instead of
//   submitting it
//
// ## Credentials
//
// Loaded through the standard AWS chain (environment, shared profile,
// container or instance role). Route 53 is a global service; when no region
// is configured `us-east-1` is used.
//
// Minimum IAM permissions:
// - `route53:ListHostedZonesByName`
// - `route53:ListResourceRecordSets`
// - `route53:ChangeResourceRecordSets`
//
// ## API Reference
//
// - ListHostedZonesByName: GET `/2013-04-01/hostedzonesbyname?dnsname=...&maxitems=1`
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/{Id}/rrset?name=...&type=A&maxitems=1`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/{Id}/rrset`

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::{BuildError, DisplayErrorContext};
use aws_sdk_route53::types as r53;
use r53ddns_core::traits::{
    ChangeAction, ChangeBatch, ChangeSubmission, DnsProvider, HostedZone, RecordKind,
    ResourceRecord,
};
use r53ddns_core::{Error, Result};
use std::time::Duration;

/// Provider name used in logs and errors
const PROVIDER_NAME: &str = "route53";

/// Region used when the environment does not name one
const FALLBACK_REGION: &str = "us-east-1";

/// Route 53 DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all list requests (zone lookup, record lookup)
/// - Log the intended change batch
/// - **NOT** submit it
pub struct Route53Provider {
    /// Route 53 API client
    client: Client,

    /// Dry-run mode: if true, perform reads but skip change submission
    dry_run: bool,
}

// The client carries the credentials provider; keep it out of Debug output
impl std::fmt::Debug for Route53Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Provider")
            .field("client", &"<aws-sdk-route53>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Provider {
    /// Wrap an existing Route 53 client
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Build a provider from the standard AWS environment chain
    ///
    /// # Parameters
    ///
    /// - `timeout`: Upper bound for each API operation
    /// - `dry_run`: If true, reads happen but changes are only logged
    pub async fn from_env(timeout: Duration, dry_run: bool) -> Self {
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            )
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        if dry_run {
            tracing::warn!("Route 53 provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(Client::new(&sdk_config), dry_run)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn list_zones_by_name(&self, dns_name: &str, max_items: i32) -> Result<Vec<HostedZone>> {
        tracing::debug!("Looking up hosted zones starting at {}", dns_name);

        let output = self
            .client
            .list_hosted_zones_by_name()
            .dns_name(dns_name)
            .max_items(max_items)
            .send()
            .await
            .map_err(|e| api_error("ListHostedZonesByName", e))?;

        Ok(output
            .hosted_zones()
            .iter()
            .map(|zone| HostedZone::new(zone.id(), zone.name()))
            .collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        start_name: &str,
        kind: RecordKind,
        max_items: i32,
    ) -> Result<Vec<ResourceRecord>> {
        tracing::debug!(
            "Listing record sets in zone {} starting at {} (type: {})",
            zone_id,
            start_name,
            kind
        );

        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(zone_id)
            .start_record_name(start_name)
            .start_record_type(rr_type(kind))
            .max_items(max_items)
            .send()
            .await
            .map_err(|e| api_error("ListResourceRecordSets", e))?;

        Ok(output
            .resource_record_sets()
            .iter()
            .filter_map(record_from_sdk)
            .collect())
    }

    async fn submit_changes(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeSubmission> {
        let sdk_batch = change_batch_to_sdk(batch).map_err(|e| {
            Error::provider(PROVIDER_NAME, format!("Invalid change batch: {}", e))
        })?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would submit change batch to zone {}: {}",
                zone_id,
                batch_payload(batch)
            );
            return Ok(ChangeSubmission::skipped());
        }

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(zone_id)
            .change_batch(sdk_batch)
            .send()
            .await
            .map_err(|e| api_error("ChangeResourceRecordSets", e))?;

        let submission = submission_from_sdk(output.change_info().into());
        tracing::debug!("Change {} is {}", submission.id, submission.status);

        Ok(submission)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Render an SDK failure with its full cause chain
fn api_error<E: std::error::Error>(operation: &str, err: E) -> Error {
    Error::provider(
        PROVIDER_NAME,
        format!("{} failed: {}", operation, DisplayErrorContext(err)),
    )
}

fn rr_type(kind: RecordKind) -> r53::RrType {
    match kind {
        RecordKind::A => r53::RrType::A,
    }
}

fn change_action(action: ChangeAction) -> r53::ChangeAction {
    match action {
        ChangeAction::Upsert => r53::ChangeAction::Upsert,
    }
}

/// Convert a listed record set; kinds this system does not manage are skipped
fn record_from_sdk(set: &r53::ResourceRecordSet) -> Option<ResourceRecord> {
    let kind = match set.r#type() {
        r53::RrType::A => RecordKind::A,
        _ => return None,
    };

    Some(ResourceRecord {
        name: set.name().to_string(),
        kind,
        values: set
            .resource_records
            .iter()
            .flatten()
            .map(|r| r.value().to_string())
            .collect(),
        ttl: set.ttl,
    })
}

fn change_batch_to_sdk(batch: &ChangeBatch) -> std::result::Result<r53::ChangeBatch, BuildError> {
    let mut builder = r53::ChangeBatch::builder();

    for change in &batch.changes {
        let record = &change.record;

        let mut set = r53::ResourceRecordSet::builder()
            .name(record.name.as_str())
            .r#type(rr_type(record.kind));

        if let Some(ttl) = record.ttl {
            set = set.ttl(ttl);
        }

        for value in &record.values {
            set = set.resource_records(r53::ResourceRecord::builder().value(value.as_str()).build()?);
        }

        builder = builder.changes(
            r53::Change::builder()
                .action(change_action(change.action))
                .resource_record_set(set.build()?)
                .build()?,
        );
    }

    builder.build()
}

fn submission_from_sdk(info: Option<&r53::ChangeInfo>) -> ChangeSubmission {
    match info {
        Some(info) => ChangeSubmission {
            id: info.id().to_string(),
            status: info.status().as_str().to_string(),
        },
        None => ChangeSubmission {
            id: String::new(),
            status: "UNKNOWN".to_string(),
        },
    }
}

/// JSON rendering of a change batch, in the shape of the Route 53 API
fn batch_payload(batch: &ChangeBatch) -> serde_json::Value {
    serde_json::json!({
        "Changes": batch.changes.iter().map(|change| serde_json::json!({
            "Action": change.action.as_str(),
            "ResourceRecordSet": {
                "Name": change.record.name,
                "Type": change.record.kind.as_str(),
                "TTL": change.record.ttl,
                "ResourceRecords": change.record.values.iter()
                    .map(|v| serde_json::json!({ "Value": v }))
                    .collect::<Vec<_>>(),
            },
        })).collect::<Vec<_>>(),
    })
}
