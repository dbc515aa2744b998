// # r53ddns-core
//
// Core library for the Route 53 dynamic DNS reconciler.
//
// ## Architecture Overview
//
// This library keeps one hostname's address record in step with the host's
// current public IP:
// - **IpSource**: Trait for discovering the current public address
// - **DnsProvider**: Narrow trait over a hosted-zone API (zone lookup, record
//   listing, change submission)
// - **hostname**: Splits a hostname into leaf label and parent domain
// - **engine::zone**: Finds the hosted zone for a parent domain
// - **engine::reconcile**: Decides whether an upsert is needed and submits it
// - **DdnsEngine**: Application context and fixed-interval scheduler
//
// ## Design Principles
//
// 1. **Stateless**: The provider is the single source of truth, re-read every cycle
// 2. **Minimal writes**: An upsert is only submitted when the record differs
// 3. **No hidden retries**: A failed cycle is logged; the next tick is the retry
// 4. **Library-First**: All core functionality can be used without the daemon

pub mod traits;
pub mod engine;
pub mod hostname;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, IpSource, ObservedAddress};
pub use engine::{DdnsEngine, EngineEvent, ReconciliationResult, Zone};
pub use hostname::Hostname;
pub use config::{DdnsConfig, Mode};
pub use error::{Error, Phase, Result};
