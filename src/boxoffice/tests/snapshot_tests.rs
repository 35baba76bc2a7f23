//! Snapshot and restore tests.

use super::test_helpers::{AutoApprove, add_category, cart_with, engine};
use crate::boxoffice::category::CategoryKind;
use crate::boxoffice::engine::BoxOffice;
use crate::boxoffice::error::TicketingError;
use crate::boxoffice::snapshot::{BOXOFFICE_SNAPSHOT_FORMAT_VERSION, BoxOfficeSnapshotPackage};
use crate::boxoffice::ticket::OwnerId;

#[test]
fn test_restore_preserves_sold_counts_and_tokens() {
    let engine = engine();
    let category = add_category(&engine, CategoryKind::GeneralAdmission, 5000, 10, 4);
    let owner = OwnerId::new();
    let sale = engine
        .checkout(&mut cart_with(&engine, &category, 2), owner, &AutoApprove)
        .unwrap();

    let snapshot = engine.snapshot();
    let restored = BoxOffice::restore(&snapshot, b"gate-secret").unwrap();

    assert_eq!(restored.festival_id(), engine.festival_id());
    assert_eq!(restored.sold(category.id), Some(2));
    assert_eq!(restored.available(category.id), Some(8));
    assert_eq!(restored.tickets_for_owner(owner).len(), 2);

    // Tokens issued before the snapshot still scan after the restore.
    let outcome = restored.scan(&sale.tickets[0].qr_token, None);
    assert!(outcome.admitted);
    // And only once.
    assert!(!restored.scan(&sale.tickets[0].qr_token, None).admitted);
}

#[test]
fn test_restore_preserves_per_user_headroom() {
    let engine = engine();
    let category = add_category(&engine, CategoryKind::GeneralAdmission, 5000, 100, 2);
    let owner = OwnerId::new();
    engine
        .checkout(&mut cart_with(&engine, &category, 2), owner, &AutoApprove)
        .unwrap();

    let restored = BoxOffice::restore(&engine.snapshot(), b"gate-secret").unwrap();

    // The purchaser is still at their cap after the restore.
    let err = restored
        .checkout(&mut cart_with(&restored, &category, 1), owner, &AutoApprove)
        .unwrap_err();
    assert!(matches!(err, TicketingError::PerUserLimitExceeded { .. }));
}

#[test]
fn test_package_round_trip_validates() {
    let engine = engine();
    add_category(&engine, CategoryKind::Vip, 12000, 5, 2);

    let package = BoxOfficeSnapshotPackage::new(engine.snapshot()).unwrap();
    assert_eq!(package.version, BOXOFFICE_SNAPSHOT_FORMAT_VERSION);

    let json = package.to_json().unwrap();
    let parsed = BoxOfficeSnapshotPackage::from_json(&json).unwrap();
    let snapshot = parsed.into_snapshot().unwrap();
    assert_eq!(snapshot.festival_id, engine.festival_id());
}

#[test]
fn test_tampered_package_is_rejected() {
    let engine = engine();
    add_category(&engine, CategoryKind::GeneralAdmission, 5000, 10, 4);

    let mut package = BoxOfficeSnapshotPackage::new(engine.snapshot()).unwrap();
    package.snapshot.sold[0].sold = 9;

    assert!(matches!(
        package.validate().unwrap_err(),
        TicketingError::ChecksumMismatch { .. }
    ));
}

#[test]
fn test_version_mismatch_is_rejected() {
    let engine = engine();
    let mut package = BoxOfficeSnapshotPackage::new(engine.snapshot()).unwrap();
    package.version = 99;

    assert!(matches!(
        package.validate().unwrap_err(),
        TicketingError::VersionMismatch {
            actual: 99,
            ..
        }
    ));
}

#[test]
fn test_inconsistent_snapshot_is_rejected() {
    let engine = engine();
    let category = add_category(&engine, CategoryKind::GeneralAdmission, 5000, 10, 4);

    let mut snapshot = engine.snapshot();
    // A sold count above the category's quota cannot come from the ledger.
    snapshot
        .sold
        .iter_mut()
        .find(|entry| entry.category_id == category.id)
        .unwrap()
        .sold = 11;

    assert!(matches!(
        BoxOffice::restore(&snapshot, b"gate-secret").unwrap_err(),
        TicketingError::DeserializationError { .. }
    ));
}
