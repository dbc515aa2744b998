//! Contract Test: Scheduling and Failure Isolation
//!
//! Verifies how the engine drives reconciliation cycles:
//! - The first cycle fires immediately on start
//! - The address is resolved fresh on every cycle
//! - A failing cycle is logged and reported, and the engine keeps running
//! - Shutdown is clean and deterministic

mod common;

use common::*;
use r53ddns_core::{DdnsEngine, EngineEvent, Error, Phase, ReconciliationResult};
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_test::{assert_err, assert_ok};

fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn run_cycle_updates_then_settles() {
    let provider = example_zone().with_record("Z123", "home.example.com.", &["203.0.113.1"]);
    let ip_source = ScriptedIpSource::new(&["203.0.113.9"]);

    let (engine, mut event_rx) = DdnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let first = assert_ok!(engine.run_cycle().await);
    let second = assert_ok!(engine.run_cycle().await);

    assert!(first.is_updated());
    assert!(matches!(second, ReconciliationResult::AlreadyConsistent { .. }));
    assert_eq!(ip_source.calls(), 2, "address resolved every cycle");
    assert_eq!(provider.submit_calls(), 1);

    let events = drain(&mut event_rx);
    assert_eq!(
        events,
        vec![
            EngineEvent::Updated {
                hostname: "home.example.com".to_string(),
                address: IpAddr::from([203, 0, 113, 9]),
                zone_id: "Z123".to_string(),
            },
            EngineEvent::AlreadyConsistent {
                hostname: "home.example.com".to_string(),
                address: IpAddr::from([203, 0, 113, 9]),
            },
        ]
    );
}

#[tokio::test]
async fn run_cycle_tags_failures_with_phase() {
    let provider = example_zone();

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(UnreachableIpSource::default()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let err = assert_err!(engine.run_cycle().await);
    assert!(matches!(
        err,
        Error::Cycle {
            phase: Phase::ResolveAddress,
            ..
        }
    ));
    assert!(matches!(err.root(), Error::Transport(_)));
    assert_eq!(provider.zone_calls(), 0, "no provider call without an address");

    let rejecting = example_zone().rejecting_changes();
    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(ScriptedIpSource::new(&["203.0.113.9"])),
        Box::new(rejecting),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let err = assert_err!(engine.run_cycle().await);
    assert!(matches!(
        err,
        Error::Cycle {
            phase: Phase::UpdateRecord,
            ..
        }
    ));
    assert!(matches!(err.root(), Error::UpdateRejected(_)));
}

#[tokio::test]
async fn first_cycle_fires_immediately() {
    let provider = example_zone();

    let (engine, mut event_rx) = DdnsEngine::new(
        Box::new(ScriptedIpSource::new(&["203.0.113.9"])),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let engine_handle = tokio::spawn(async move {
        engine
            .run_until_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    // Default interval is five minutes: exactly one cycle ran
    assert_eq!(provider.submit_calls(), 1);

    let events = drain(&mut event_rx);
    assert!(matches!(events.first(), Some(EngineEvent::Started { interval, .. }) if *interval == Duration::from_secs(300)));
    assert!(events.contains(&EngineEvent::CycleStarted { cycle: 1 }));
    assert!(!events.contains(&EngineEvent::CycleStarted { cycle: 2 }));
    assert!(matches!(events.last(), Some(EngineEvent::Stopped { .. })));
}

#[tokio::test]
async fn failing_cycles_do_not_stop_the_engine() {
    let provider = example_zone();
    let ip_source = UnreachableIpSource::default();

    let (engine, mut event_rx) = DdnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");
    let engine = engine.with_interval(Duration::from_millis(20));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let engine_handle = tokio::spawn(async move {
        engine
            .run_until_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(150)).await;

    shutdown_tx.send(()).unwrap();
    let result = engine_handle.await.unwrap();
    assert!(result.is_ok(), "cycle failures must not escape the engine");

    assert!(
        ip_source.calls() >= 2,
        "expected the engine to keep cycling, got {} call(s)",
        ip_source.calls()
    );
    assert_eq!(provider.zone_calls(), 0);

    let failures: Vec<_> = drain(&mut event_rx)
        .into_iter()
        .filter_map(|e| match e {
            EngineEvent::CycleFailed { error, .. } => Some(error),
            _ => None,
        })
        .collect();

    assert!(failures.len() >= 2);
    assert!(failures
        .iter()
        .all(|e| e.starts_with("unable to determine ip address")));
}

#[tokio::test]
async fn address_change_between_cycles_is_published() {
    let provider = example_zone().with_record("Z123", "home.example.com.", &["203.0.113.9"]);
    let ip_source = ScriptedIpSource::new(&["203.0.113.9", "203.0.113.42"]);

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(provider.clone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");
    let engine = engine.with_interval(Duration::from_millis(20));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let engine_handle = tokio::spawn(async move {
        engine
            .run_until_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(150)).await;

    shutdown_tx.send(()).unwrap();
    engine_handle.await.unwrap().unwrap();

    assert!(ip_source.calls() >= 3);
    assert_eq!(provider.submit_calls(), 1, "only the changed address is written");

    let record = provider
        .record("Z123", "home.example.com.")
        .expect("record exists");
    assert_eq!(record.values, vec!["203.0.113.42".to_string()]);
}

#[tokio::test]
async fn invalid_configuration_is_rejected_up_front() {
    let result = DdnsEngine::new(
        Box::new(ScriptedIpSource::new(&["203.0.113.9"])),
        Box::new(example_zone()),
        minimal_config("localhost"),
    );

    match result {
        Err(err) => assert!(err.is_fatal()),
        Ok(_) => panic!("engine must refuse a hostname without a parent domain"),
    }
}

#[tokio::test]
async fn zero_interval_is_raised_to_minimum() {
    let ip_source = ScriptedIpSource::new(&["203.0.113.9"]);

    let (engine, _event_rx) = DdnsEngine::new(
        Box::new(ip_source.clone()),
        Box::new(example_zone()),
        minimal_config("home.example.com"),
    )
    .expect("engine construction succeeds");
    let engine = engine.with_interval(Duration::ZERO);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let engine_handle = tokio::spawn(async move {
        engine
            .run_until_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), engine_handle)
        .await
        .expect("Engine should terminate within 5 seconds");
    assert!(result.unwrap().is_ok());

    assert!(ip_source.calls() >= 2, "engine kept cycling on the minimum interval");
}
