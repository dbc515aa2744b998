//! Test doubles and common utilities for contract tests
//!
//! `FakeRoute53` keeps zones and records in memory and answers listings the
//! way a name-ordered hosted-zone API does: starting at the requested name,
//! not filtering by it.

#![allow(dead_code)]

use r53ddns_core::error::{Error, Result};
use r53ddns_core::traits::{
    ChangeAction, ChangeBatch, ChangeSubmission, DnsProvider, HostedZone, IpSource,
    ObservedAddress, RecordKind, ResourceRecord,
};
use r53ddns_core::DdnsConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory hosted-zone provider that counts calls
#[derive(Clone, Default)]
pub struct FakeRoute53 {
    zones: Arc<Mutex<Vec<HostedZone>>>,
    records: Arc<Mutex<HashMap<String, Vec<ResourceRecord>>>>,
    submitted: Arc<Mutex<Vec<(String, ChangeBatch)>>>,
    zone_queries: Arc<Mutex<Vec<(String, i32)>>>,
    record_queries: Arc<Mutex<Vec<(String, String, RecordKind, i32)>>>,
    zone_calls: Arc<AtomicUsize>,
    list_calls: Arc<AtomicUsize>,
    submit_calls: Arc<AtomicUsize>,
    fail_zone_lookup: bool,
    fail_listing: bool,
    reject_changes: bool,
    ignore_max_items: bool,
    dry_run: bool,
}

impl FakeRoute53 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hosted zone with its composite id, e.g. ("/hostedzone/Z123", "example.com.")
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        {
            let mut zones = self.zones.lock().unwrap();
            zones.push(HostedZone::new(id, name));
            zones.sort_by(|a, b| a.name.cmp(&b.name));
        }
        self
    }

    /// Add an A record to a zone (by bare zone id)
    pub fn with_record(self, zone_id: &str, name: &str, values: &[&str]) -> Self {
        self.store(
            zone_id,
            ResourceRecord::new(name, RecordKind::A, values.iter().copied(), 300),
        );
        self
    }

    pub fn failing_zone_lookup(mut self) -> Self {
        self.fail_zone_lookup = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn rejecting_changes(mut self) -> Self {
        self.reject_changes = true;
        self
    }

    /// Answer zone lookups with every zone at or after the name
    pub fn ignoring_max_items(mut self) -> Self {
        self.ignore_max_items = true;
        self
    }

    /// Acknowledge change batches without applying them
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn zone_calls(&self) -> usize {
        self.zone_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Every (zone id, batch) pair submitted so far
    pub fn submitted(&self) -> Vec<(String, ChangeBatch)> {
        self.submitted.lock().unwrap().clone()
    }

    /// Every (dns name, max items) zone query so far
    pub fn zone_queries(&self) -> Vec<(String, i32)> {
        self.zone_queries.lock().unwrap().clone()
    }

    /// Every (zone id, start name, kind, max items) record query so far
    pub fn record_queries(&self) -> Vec<(String, String, RecordKind, i32)> {
        self.record_queries.lock().unwrap().clone()
    }

    /// Current record with this exact name in a zone
    pub fn record(&self, zone_id: &str, name: &str) -> Option<ResourceRecord> {
        self.records
            .lock()
            .unwrap()
            .get(zone_id)
            .and_then(|records| records.iter().find(|r| r.name == name).cloned())
    }

    fn store(&self, zone_id: &str, record: ResourceRecord) {
        let mut records = self.records.lock().unwrap();
        let zone = records.entry(zone_id.to_string()).or_default();
        zone.retain(|r| !(r.name == record.name && r.kind == record.kind));
        zone.push(record);
        zone.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

#[async_trait::async_trait]
impl DnsProvider for FakeRoute53 {
    async fn list_zones_by_name(&self, dns_name: &str, max_items: i32) -> Result<Vec<HostedZone>> {
        self.zone_calls.fetch_add(1, Ordering::SeqCst);
        self.zone_queries
            .lock()
            .unwrap()
            .push((dns_name.to_string(), max_items));

        if self.fail_zone_lookup {
            return Err(Error::provider("fake", "ListHostedZonesByName: Throttling"));
        }

        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .filter(|z| z.name.as_str() >= dns_name)
            .take(if self.ignore_max_items {
                usize::MAX
            } else {
                max_items as usize
            })
            .cloned()
            .collect())
    }

    async fn list_records(
        &self,
        zone_id: &str,
        start_name: &str,
        kind: RecordKind,
        max_items: i32,
    ) -> Result<Vec<ResourceRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.record_queries.lock().unwrap().push((
            zone_id.to_string(),
            start_name.to_string(),
            kind,
            max_items,
        ));

        if self.fail_listing {
            return Err(Error::provider("fake", "ListResourceRecordSets: NoSuchHostedZone"));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .get(zone_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| r.name.as_str() >= start_name)
                    .take(max_items as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn submit_changes(&self, zone_id: &str, batch: &ChangeBatch) -> Result<ChangeSubmission> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.submitted
            .lock()
            .unwrap()
            .push((zone_id.to_string(), batch.clone()));

        if self.reject_changes {
            return Err(Error::provider("fake", "ChangeResourceRecordSets: AccessDenied"));
        }

        if self.dry_run {
            return Ok(ChangeSubmission::skipped());
        }

        for change in &batch.changes {
            match change.action {
                ChangeAction::Upsert => self.store(zone_id, change.record.clone()),
            }
        }

        Ok(ChangeSubmission {
            id: format!("/change/C{}", n),
            status: "PENDING".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake-route53"
    }
}

/// An IP source that hands out a scripted sequence of addresses
///
/// The last address repeats once the script is exhausted.
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<ObservedAddress>>>,
    last: Arc<Mutex<ObservedAddress>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(addresses: &[&str]) -> Self {
        let script: VecDeque<ObservedAddress> = addresses
            .iter()
            .map(|a| ObservedAddress::parse(a).unwrap())
            .collect();
        let last = script.front().cloned().expect("at least one address");

        Self {
            script: Arc::new(Mutex::new(script)),
            last: Arc::new(Mutex::new(last)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<ObservedAddress> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }

    fn source_name(&self) -> &'static str {
        "scripted"
    }
}

/// An IP source whose echo service is always unreachable
#[derive(Clone, Default)]
pub struct UnreachableIpSource {
    calls: Arc<AtomicUsize>,
}

impl UnreachableIpSource {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for UnreachableIpSource {
    async fn current(&self) -> Result<ObservedAddress> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::transport("connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "unreachable"
    }
}

/// Provider holding zone `example.com.` (id `/hostedzone/Z123`)
pub fn example_zone() -> FakeRoute53 {
    FakeRoute53::new().with_zone("/hostedzone/Z123", "example.com.")
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(hostname: &str) -> DdnsConfig {
    DdnsConfig::new(hostname, "https://ip.example.test")
}

pub fn address(text: &str) -> ObservedAddress {
    ObservedAddress::parse(text).unwrap()
}
