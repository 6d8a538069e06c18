mod common;

use common::{license, FakePlatform};
use sas4_license::{LicenseError, LicenseSwapper, SwapSide};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const OLD: &str = "AAAAA-AAAAA-AAAAA-AAAAA";
const NEW: &str = "BBBBB-BBBBB-BBBBB-BBBBB";

fn platform() -> FakePlatform {
    FakePlatform::with_licenses(vec![license(10, OLD, "old@b.com"), license(20, NEW, "new@b.com")])
}

#[tokio::test]
async fn swap_resolves_both_sides_and_calls_remote() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform.clone());

    let outcome = swapper.swap(OLD, NEW).await.unwrap();

    assert_eq!(outcome.old_ehwid, OLD);
    assert_eq!(outcome.new_ehwid, NEW);
    assert_eq!(outcome.old_license_id, 10);
    assert_eq!(outcome.new_license_id, 20);
    assert_eq!(outcome.old_details.email.as_deref(), Some("old@b.com"));
    assert_eq!(outcome.new_details.expiration.as_deref(), Some("2027-01-01 00:00:00"));
    assert_eq!(outcome.remote_response["message"], "License swapped successfully");
    assert_eq!(*platform.swaps.lock().unwrap(), vec![(10, 20)]);
}

#[tokio::test]
async fn malformed_new_ehwid_fails_before_remote() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform.clone());

    let err = swapper.swap(OLD, "ABCDE-FG").await.unwrap_err();

    assert!(matches!(err, LicenseError::Validation(_)));
    assert!(err.to_string().contains("new_ehwid"));
    assert_eq!(platform.remote_calls(), 0);
}

#[tokio::test]
async fn malformed_old_ehwid_named() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform.clone());

    let err = swapper.swap("nope", NEW).await.unwrap_err();

    assert!(err.to_string().contains("old_ehwid"));
    assert_eq!(platform.remote_calls(), 0);
}

#[tokio::test]
async fn missing_new_license_names_side() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform.clone());

    let err = swapper
        .swap(OLD, "ZZZZZ-ZZZZZ-ZZZZZ-ZZZZZ")
        .await
        .unwrap_err();

    match &err {
        LicenseError::Lookup { side, ehwid, source } => {
            assert_eq!(*side, SwapSide::New);
            assert_eq!(ehwid, "ZZZZZ-ZZZZZ-ZZZZZ-ZZZZZ");
            assert!(source.is_not_found());
        }
        other => panic!("expected lookup failure, got {other:?}"),
    }
    assert_eq!(
        err.to_string(),
        "Failed to resolve new license ZZZZZ-ZZZZZ-ZZZZZ-ZZZZZ: License not found for this EHWID (Hardware ID)"
    );
    assert_eq!(platform.swap_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_old_license_stops_before_new_lookup() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform.clone());

    let err = swapper
        .swap("ZZZZZ-ZZZZZ-ZZZZZ-ZZZZZ", NEW)
        .await
        .unwrap_err();

    assert!(matches!(err, LicenseError::Lookup { side: SwapSide::Old, .. }));
    assert_eq!(platform.lookup_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn same_license_is_self_swap() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform.clone());

    let err = swapper.swap(OLD, OLD).await.unwrap_err();

    assert!(matches!(err, LicenseError::SelfSwap { license_id: 10 }));
    assert!(!err.is_not_found());
    assert_eq!(platform.lookup_calls.load(Ordering::SeqCst), 2);
    assert_eq!(platform.swap_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn remote_swap_rejection_surfaces() {
    let platform = Arc::new(FakePlatform {
        swap_error: Some("Destination license is expired".to_string()),
        ..platform()
    });
    let swapper = LicenseSwapper::new(platform.clone());

    let err = swapper.swap(OLD, NEW).await.unwrap_err();

    assert!(matches!(err, LicenseError::RemoteRejection(ref m) if m == "Destination license is expired"));
}

#[tokio::test]
async fn outcome_serializes_for_callers() {
    let platform = Arc::new(platform());
    let swapper = LicenseSwapper::new(platform);

    let outcome = swapper.swap(OLD, NEW).await.unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["old_license_id"], 10);
    assert_eq!(value["new_details"]["email"], "new@b.com");
    assert_eq!(value["old_details"]["status"], json!(1));
}
