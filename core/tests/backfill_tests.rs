// tests/backfill_tests.rs
mod common;

use common::*;
use ordermirror::{MirrorFault, MirrorStore, StoreFault, SyncError};

async fn seed_unmirrored_orders(h: &Harness) -> Vec<i64> {
  h.mirror.fail(MirrorFault::Publish, true);
  let mut ids = Vec::new();
  for lines in [&[(WIDGET, 2.0)][..], &[(GADGET, 1.0), (GIZMO, 2.0)][..]] {
    ids.push(h.writer.create(&request(ALICE, lines)).await.unwrap().order_id());
  }
  h.mirror.fail(MirrorFault::Publish, false);
  ids
}

#[tokio::test]
async fn empty_mirror_is_filled_from_the_store() {
  let h = harness();
  let ids = seed_unmirrored_orders(&h).await;

  let report = h.backfill.sync().await;
  assert!(report.attempted);
  assert!(report.is_ok());
  assert_eq!(report.written, 2);
  assert_eq!(report.count(), 2);

  for id in &ids {
    assert!(h.mirror.contains_record(*id));
    assert!(h.mirror.is_member(*id));
    // The bulk path restores records only.
    assert!(!h.mirror.has_items(*id));
  }
  let second = h.mirror.fetch(ids[1]).await.unwrap().unwrap();
  assert_eq!(second.total, Some(44.5));
  assert_eq!(second.user_id, Some(ALICE));
}

#[tokio::test]
async fn second_sync_writes_nothing_and_reports_the_existing_count() {
  let h = harness();
  seed_unmirrored_orders(&h).await;

  let first = h.backfill.sync().await;
  assert_eq!(first.written, 2);
  let writes_after_first = h.mirror.write_count();

  let second = h.backfill.sync().await;
  assert!(!second.attempted);
  assert!(second.is_ok());
  assert_eq!(second.written, 0);
  assert_eq!(second.existing, 2);
  assert_eq!(second.count(), 2);
  assert_eq!(h.mirror.write_count(), writes_after_first);
}

#[tokio::test]
async fn nothing_to_sync_and_failed_sync_are_distinguishable() {
  let nothing = harness();
  let report = nothing.backfill.sync().await;
  assert!(report.attempted);
  assert_eq!(report.written, 0);
  assert!(report.error.is_none());

  let failing = harness();
  seed_unmirrored_orders(&failing).await;
  failing.store.fail(StoreFault::Aggregate, true);
  let report = failing.backfill.sync().await;
  assert!(report.attempted);
  assert_eq!(report.written, 0);
  assert_eq!(report.count(), 0);
  assert!(matches!(report.error, Some(SyncError::Store(_))));
  assert_eq!(failing.mirror.write_count(), 0);
}

#[tokio::test]
async fn untotalled_orders_are_backfilled_with_the_item_sum() {
  let h = harness();
  let id = h.store.insert_untotalled_order(BOB, &[(WIDGET, 3.0, 2.0), (GADGET, 1.0, 0.5)]);

  let report = h.backfill.sync().await;
  assert_eq!(report.written, 1);
  let fields = h.mirror.raw_fields(id).unwrap();
  assert_eq!(fields["total"], "6.5");
  assert_eq!(fields["user_id"], "7");
}

#[tokio::test]
async fn partially_populated_mirror_is_not_repaired() {
  let h = harness();
  h.writer.create(&request(ALICE, &[(WIDGET, 1.0)])).await.unwrap();
  let missing = seed_unmirrored_orders(&h).await;

  let report = h.backfill.sync().await;
  assert!(!report.attempted);
  assert_eq!(report.existing, 1);
  for id in missing {
    assert!(!h.mirror.contains_record(id));
  }
}

#[tokio::test]
async fn mirror_failures_are_carried_in_the_report() {
  let h = harness();
  seed_unmirrored_orders(&h).await;

  h.mirror.fail(MirrorFault::Read, true);
  let report = h.backfill.sync().await;
  assert!(!report.attempted);
  assert!(matches!(report.error, Some(SyncError::Mirror(_))));
  h.mirror.fail(MirrorFault::Read, false);

  h.mirror.fail(MirrorFault::Publish, true);
  let report = h.backfill.sync().await;
  assert!(report.attempted);
  assert_eq!(report.written, 0);
  assert!(matches!(report.error, Some(SyncError::Mirror(_))));
}

#[tokio::test]
async fn uncountable_populated_mirror_is_reported_as_a_failure() {
  let h = harness();
  seed_unmirrored_orders(&h).await;
  h.backfill.sync().await;
  let writes = h.mirror.write_count();

  h.mirror.fail(MirrorFault::Count, true);
  let report = h.backfill.sync().await;
  assert!(!report.attempted);
  assert!(!report.is_ok());
  assert_eq!(report.count(), 0);
  assert!(matches!(report.error, Some(SyncError::Mirror(_))));
  assert_eq!(h.mirror.write_count(), writes);
}
