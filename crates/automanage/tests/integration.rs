//! Integration tests for automanage
//!
//! These tests run full cycles: configuration, provider listing, the core
//! engine and dispatch to a mock executor.

use automanage_api::{Action, DecisionReason};
use automanage_config::parse_config;
use automanage_core::CoreEngine;
use automanage_host_api::{
    ComputeInstance, DatabaseInstance, ManagedResource, MockCall, MockFleet, ResourceProvider,
    dispatch,
};
use automanage_util::{ResourceId, parse_wall_clock};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const CONFIG: &str = r#"
config_version = 1

[automanage]
timezone = "America/New_York"
email_from = "cloud-support@example.edu"
"#;

fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn instance(
    id: &str,
    state: &str,
    launched: Option<DateTime<Utc>>,
    tag_pairs: &[(&str, &str)],
) -> Arc<dyn ManagedResource> {
    Arc::new(ComputeInstance {
        instance_id: ResourceId::new(id),
        state: state.into(),
        launch_time: launched,
        tags: tags(tag_pairs),
    })
}

fn database(id: &str, status: &str, tag_pairs: &[(&str, &str)]) -> Arc<dyn ManagedResource> {
    Arc::new(DatabaseInstance {
        identifier: ResourceId::new(id),
        db_name: None,
        status: status.into(),
        started_at: None,
        tags: tags(tag_pairs),
    })
}

fn engine() -> CoreEngine {
    CoreEngine::new(parse_config(CONFIG).unwrap())
}

/// Wednesday 2025-12-24 at `hh:00` New York time
fn wednesday(engine: &CoreEngine, hour: u32) -> DateTime<Utc> {
    parse_wall_clock(
        &format!("2025-12-24 {:02}:00:00", hour),
        &engine.settings().timezone,
    )
    .unwrap()
}

async fn run_cycle(engine: &CoreEngine, fleet: &MockFleet, at: DateTime<Utc>) -> Vec<MockCall> {
    let resources = fleet.list_resources().await.unwrap();
    let report = engine.evaluate_fleet(&resources, at);
    for request in &report.requests {
        dispatch(fleet, request).await.unwrap();
    }
    fleet.calls()
}

#[tokio::test]
async fn test_business_hours_cycle() {
    let engine = engine();

    let fleet = MockFleet::new(vec![instance(
        "i-web",
        "stopped",
        None,
        &[("lifecycle-policy", "cycle-daily:08/18")],
    )]);
    let calls = run_cycle(&engine, &fleet, wednesday(&engine, 10)).await;
    assert_eq!(calls, vec![MockCall::Start(ResourceId::new("i-web"))]);

    let fleet = MockFleet::new(vec![instance(
        "i-web",
        "running",
        Some(wednesday(&engine, 8)),
        &[("lifecycle-policy", "cycle-daily:08/18")],
    )]);
    let calls = run_cycle(&engine, &fleet, wednesday(&engine, 19)).await;
    assert_eq!(
        calls,
        vec![MockCall::Stop {
            resource_id: ResourceId::new("i-web"),
            snapshot_id: None,
        }]
    );
}

#[tokio::test]
async fn test_runtime_limits() {
    let engine = engine();
    let now = wednesday(&engine, 14);
    let five_hours_ago = Some(now - Duration::hours(5));
    let three_hours_ago = Some(now - Duration::hours(3));

    let fleet = MockFleet::new(vec![
        instance("i-stop", "running", five_hours_ago, &[("lifecycle-policy", "limit-stop:4")]),
        instance(
            "i-term",
            "running",
            three_hours_ago,
            &[("lifecycle-policy", "limit-terminate:4")],
        ),
        instance(
            "i-mail",
            "running",
            three_hours_ago,
            &[("lifecycle-policy", "limit-email:2/ops@example.com")],
        ),
    ]);

    let calls = run_cycle(&engine, &fleet, now).await;
    assert_eq!(
        calls,
        vec![
            MockCall::Stop {
                resource_id: ResourceId::new("i-stop"),
                snapshot_id: None,
            },
            MockCall::Notify {
                resource_id: ResourceId::new("i-mail"),
                to: "ops@example.com".into(),
            },
        ]
    );
}

#[tokio::test]
async fn test_email_request_is_composed_from_config() {
    let engine = engine();
    let now = wednesday(&engine, 14);
    let resources = vec![instance(
        "i-mail",
        "running",
        Some(now - Duration::hours(3)),
        &[
            ("Name", "gpu-trainer"),
            ("lifecycle-policy", "limit-email:2/ops@example.com"),
        ],
    )];

    let report = engine.evaluate_fleet(&resources, now);
    let email = report.requests[0].email.as_ref().unwrap();
    assert_eq!(email.from, "cloud-support@example.edu");
    assert_eq!(email.subject, "automanage notification - gpu-trainer");
    assert!(email.body.contains("resource id: i-mail"));
}

#[tokio::test]
async fn test_database_schedule_takes_snapshot() {
    let engine = engine();
    let fleet = MockFleet::new(vec![database(
        "reports-db",
        "available",
        &[("lifecycle-policy", "cycle-weekday:08/18")],
    )]);

    let calls = run_cycle(&engine, &fleet, wednesday(&engine, 21)).await;
    assert_eq!(
        calls,
        vec![MockCall::Stop {
            resource_id: ResourceId::new("reports-db"),
            snapshot_id: Some("reports-db-lifecycle-2025-12-24-21-00".into()),
        }]
    );
}

#[tokio::test]
async fn test_bad_policies_do_not_block_the_fleet() {
    let engine = engine();
    let now = wednesday(&engine, 10);
    let fleet = MockFleet::new(vec![
        database("reports-db", "available", &[("lifecycle-policy", "limit-stop:4")]),
        instance("i-typo", "stopped", None, &[("lifecycle-policy", "cycle-daly:08/18")]),
        instance("i-half", "stopped", None, &[("lifecycle-policy", "cycle-daily:08")]),
        instance("i-good", "stopped", None, &[("lifecycle-policy", "always-on")]),
        instance("i-untagged", "stopped", None, &[]),
    ]);

    let resources = fleet.list_resources().await.unwrap();
    let report = engine.evaluate_fleet(&resources, now);
    assert_eq!(report.requests.len(), 4);
    assert_eq!(report.untagged, 1);

    let errors: Vec<_> = report
        .requests
        .iter()
        .filter(|r| r.action == Action::Error)
        .map(|r| r.resource_id.as_str())
        .collect();
    assert_eq!(errors, vec!["reports-db", "i-typo", "i-half"]);

    for request in &report.requests {
        dispatch(&fleet, request).await.unwrap();
    }
    assert_eq!(fleet.calls(), vec![MockCall::Start(ResourceId::new("i-good"))]);
}

#[tokio::test]
async fn test_orchestrated_resources_are_gated() {
    let engine = engine();
    let fleet = MockFleet::new(vec![
        instance(
            "i-orphan",
            "running",
            None,
            &[("lifecycle-policy", "always-off"), ("fleet-group", "web")],
        ),
        instance(
            "i-member",
            "running",
            None,
            &[
                ("lifecycle-policy", "always-off"),
                ("fleet-group", "web"),
                ("fleet-member-id", "web-2"),
            ],
        ),
    ]);

    let resources = fleet.list_resources().await.unwrap();
    let report = engine.evaluate_fleet(&resources, wednesday(&engine, 10));
    assert!(matches!(
        report.requests[0].reason,
        DecisionReason::Gated {
            proposed: Action::Stop,
            ..
        }
    ));

    for request in &report.requests {
        dispatch(&fleet, request).await.unwrap();
    }
    assert_eq!(
        fleet.calls(),
        vec![MockCall::Stop {
            resource_id: ResourceId::new("i-member"),
            snapshot_id: None,
        }]
    );
}

#[tokio::test]
async fn test_overnight_weekday_window_across_the_weekend() {
    let engine = engine();
    let policy = [("lifecycle-policy", "cycle-weekday:22/04")];

    // Friday 23:00, Saturday 02:00 (tail of Friday night), Sunday 23:00
    let friday_night = parse_wall_clock("2025-12-26 23:00:00", &engine.settings().timezone).unwrap();
    let saturday_early = parse_wall_clock("2025-12-27 02:00:00", &engine.settings().timezone).unwrap();
    let sunday_night = parse_wall_clock("2025-12-28 23:00:00", &engine.settings().timezone).unwrap();

    for (at, expected) in [
        (friday_night, Action::Start),
        (saturday_early, Action::Start),
        (sunday_night, Action::None),
    ] {
        let resources = vec![instance("i-batch", "stopped", None, &policy)];
        let report = engine.evaluate_fleet(&resources, at);
        assert_eq!(report.requests[0].action, expected, "at {}", at);
    }
}
