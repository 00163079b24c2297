//! Setup phase against a live stand-in service

use anyhow::Result;
use shortload_config::{SetupPolicy, TargetConfig, WorkloadConfig};
use shortload_core::{provision, CheckRecorder, Provisioner, WorkloadError, STATUS_IS_201};
use shortload_http::{HttpClient, HttpManager};
use shortload_integration_tests::{init_test_tracing, Mode, RedirectService, TARGET_URL};
use std::sync::Arc;

fn client() -> Result<Arc<dyn HttpClient>> {
    Ok(Arc::new(HttpManager::new()?))
}

fn target(service: &RedirectService) -> TargetConfig {
    service.config().target
}

fn workload(pool_size: usize, setup_policy: SetupPolicy) -> WorkloadConfig {
    WorkloadConfig {
        pool_size,
        setup_policy,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_provision_fills_pool_in_order() -> Result<()> {
    init_test_tracing();
    let service = RedirectService::start(Mode::Healthy).await?;

    let pool = provision(client()?, 5, TARGET_URL, &service.admin_endpoint()).await?;

    assert_eq!(pool.len(), 5);
    let tokens: Vec<&str> = pool.iter().map(|t| t.as_str()).collect();
    assert_eq!(tokens, ["t000001", "t000002", "t000003", "t000004", "t000005"]);
    assert_eq!(service.creation_requests(), 5);
    assert_eq!(service.targets(), vec![TARGET_URL.to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_skip_invalid_drops_rejected_slots() -> Result<()> {
    init_test_tracing();
    let service = RedirectService::start(Mode::RejectEvery(2)).await?;
    let checks = CheckRecorder::new();

    let report = Provisioner::from_config(
        client()?,
        &target(&service),
        &workload(10, SetupPolicy::SkipInvalid),
        &checks,
    )
    .provision()
    .await?;

    assert_eq!(report.requested, 10);
    assert_eq!(report.pool.len(), 5);
    assert_eq!(report.status_failures, 5);
    assert_eq!(report.skipped(), 5);
    assert_eq!(service.issued(), 5);

    let snapshot = checks.snapshot();
    let creation = snapshot.iter().find(|c| c.name == STATUS_IS_201).unwrap();
    assert_eq!((creation.passes, creation.fails), (5, 5));
    Ok(())
}

#[tokio::test]
async fn test_fail_fast_stops_at_first_rejection() -> Result<()> {
    init_test_tracing();
    let service = RedirectService::start(Mode::RejectEvery(3)).await?;
    let checks = CheckRecorder::new();

    let err = Provisioner::from_config(
        client()?,
        &target(&service),
        &workload(10, SetupPolicy::FailFast),
        &checks,
    )
    .provision()
    .await
    .unwrap_err();

    assert!(matches!(err, WorkloadError::Provisioning { index: 2, .. }));
    assert_eq!(service.creation_requests(), 3);
    Ok(())
}

#[tokio::test]
async fn test_lenient_never_stores_missing_tokens() -> Result<()> {
    init_test_tracing();
    let service = RedirectService::start(Mode::OmitToken).await?;
    let checks = CheckRecorder::new();

    let report = Provisioner::from_config(
        client()?,
        &target(&service),
        &workload(4, SetupPolicy::Lenient),
        &checks,
    )
    .provision()
    .await?;

    assert!(report.pool.is_empty());
    assert_eq!(report.extraction_failures, 4);
    // Status was 201 every time, so the check itself passed
    assert_eq!(checks.total_failures(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_admin_endpoint() -> Result<()> {
    init_test_tracing();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let checks = CheckRecorder::new();
    let target = TargetConfig {
        admin_endpoint: format!("http://{}/admin/tokens", addr),
        ..Default::default()
    };

    let report = Provisioner::from_config(
        client()?,
        &target,
        &workload(3, SetupPolicy::SkipInvalid),
        &checks,
    )
    .provision()
    .await?;

    assert!(report.pool.is_empty());
    assert_eq!(report.transport_failures, 3);
    assert_eq!(checks.total_failures(), 3);
    Ok(())
}
