//! Hosted zone lookup
//!
//! Name-ordered zone listings return the nearest zone at or after the
//! requested name, not necessarily the zone itself, so the returned name is
//! always checked for an exact match.

use crate::error::{Error, Result};
use crate::hostname::SEPARATOR;
use crate::traits::DnsProvider;
use tracing::debug;

/// A located hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Zone name with trailing dot
    pub name: String,
    /// Bare zone identifier (e.g. "Z123")
    pub id: String,
}

/// Find the hosted zone for `parent_domain`
///
/// # Errors
///
/// - [`Error::ZoneLookup`] if the provider call fails
/// - [`Error::ZoneNotFound`] unless exactly one candidate comes back
/// - [`Error::ZoneMismatch`] if the candidate is not `parent_domain.`
pub async fn locate_zone(provider: &dyn DnsProvider, parent_domain: &str) -> Result<Zone> {
    let dns_name = format!("{}{}", parent_domain, SEPARATOR);

    let zones = provider
        .list_zones_by_name(&dns_name, 1)
        .await
        .map_err(|e| Error::zone_lookup(parent_domain, e))?;

    let [zone] = zones.as_slice() else {
        return Err(Error::zone_not_found(parent_domain));
    };

    if zone.name != dns_name {
        return Err(Error::zone_mismatch(dns_name, zone.name.clone()));
    }

    let id = zone_id_from_path(&zone.id);
    debug!("Found zone {} with ID {}", zone.name, id);

    Ok(Zone {
        name: zone.name.clone(),
        id: id.to_string(),
    })
}

/// Extract the bare identifier from a composite zone id
///
/// `"/hostedzone/Z123"` becomes `"Z123"`; an id without slashes is returned
/// as is.
pub fn zone_id_from_path(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}
