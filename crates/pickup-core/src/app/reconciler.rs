//! Reconciler - pending キューの再確認
//!
//! # フロー
//! 1. キューが存在しなければ何もしない（ファイル書き込みもしない）
//! 2. 各レコードを ID で再取得し、再分類
//!    - Paid → updated（最新スナップショット）
//!    - Pending → remaining（最新スナップショット）
//!    - Discarded → 破棄
//!    - NotFound（削除済み）→ 破棄
//!    - その他の取得失敗 → 元のレコードのまま remaining に残す
//! 3. `PendingQueue::replace(remaining)` でキューを書き換え
//!
//! `review()` は 1〜2 だけ行い、キューには触れない（dry run 用）。

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{Order, OrderClass, OrderId};
use crate::ports::OrderSource;
use crate::store::{PendingQueue, StoreError};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Orders that became paid, in queue order.
    pub updated: Vec<Order>,
    /// What the queue holds after the pass.
    pub remaining: Vec<Order>,
    /// Orders that reached a discard state or were deleted on the source,
    /// and left the queue. Deleted ones keep their queued snapshot.
    pub dropped: Vec<Order>,
    /// Records that could not be re-fetched (kept in `remaining`).
    pub failures: Vec<(OrderId, String)>,
}

pub struct Reconciler {
    source: Arc<dyn OrderSource>,
    queue: PendingQueue,
}

impl Reconciler {
    pub fn new(source: Arc<dyn OrderSource>, queue: PendingQueue) -> Self {
        Self { source, queue }
    }

    /// Re-checks the queue and rewrites it with what is still pending.
    pub async fn reconcile(&self) -> Result<Reconciliation, StoreError> {
        let pass = self.review().await?;
        if self.queue.exists() {
            self.queue.replace(&pass.remaining)?;
        }
        if !pass.updated.is_empty() {
            info!(count = pass.updated.len(), "Found pending order(s) now paid");
        }
        Ok(pass)
    }

    /// Same pass as [`reconcile`](Self::reconcile), but leaves the queue file
    /// untouched.
    pub async fn review(&self) -> Result<Reconciliation, StoreError> {
        info!("Started checking pending orders");
        if !self.queue.exists() {
            info!("No pending orders queued");
            return Ok(Reconciliation::default());
        }

        let records = self.queue.read_all()?;
        let mut pass = Reconciliation::default();

        for record in records {
            let current = match self.source.get_order(record.id).await {
                Ok(current) => current,
                Err(err) if err.is_gone() => {
                    warn!(order_id = %record.id, error = %err, "Pending order no longer exists, dropping it");
                    pass.dropped.push(record);
                    continue;
                }
                Err(err) => {
                    warn!(order_id = %record.id, error = %err, "Could not re-fetch pending order, keeping it");
                    pass.failures.push((record.id, err.to_string()));
                    pass.remaining.push(record);
                    continue;
                }
            };

            match OrderClass::of(&current.order_state) {
                OrderClass::Paid => pass.updated.push(current),
                OrderClass::Pending => pass.remaining.push(current),
                OrderClass::Discarded => {
                    info!(order_id = %current.id, state = %current.order_state, "Pending order left the queue");
                    pass.dropped.push(current);
                }
            }
        }

        Ok(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{InMemoryOrderSource, fixtures};
    use tempfile::TempDir;

    struct Harness {
        _dir: TempDir,
        queue: PendingQueue,
        source: Arc<InMemoryOrderSource>,
    }

    impl Harness {
        fn new(queued: &[Order]) -> Self {
            let dir = TempDir::new().unwrap();
            let queue = PendingQueue::new(dir.path().join("pending_orders.csv"));
            queue.append(queued).unwrap();
            let source = Arc::new(InMemoryOrderSource::with_orders(queued.iter().cloned()));
            Self {
                _dir: dir,
                queue,
                source,
            }
        }

        fn reconciler(&self) -> Reconciler {
            Reconciler::new(self.source.clone(), self.queue.clone())
        }
    }

    fn ids(orders: &[Order]) -> Vec<u64> {
        orders.iter().map(|o| o.id.get()).collect()
    }

    #[tokio::test]
    async fn absent_queue_is_a_no_op() {
        let harness = Harness::new(&[]);
        assert!(!harness.queue.exists());

        let pass = harness.reconciler().reconcile().await.unwrap();

        assert_eq!(pass, Reconciliation::default());
        assert!(!harness.queue.exists());
        assert!(harness.source.requested().is_empty());
    }

    #[tokio::test]
    async fn paid_orders_are_promoted_and_removed() {
        let harness = Harness::new(&[
            fixtures::order(7, "Awaiting bank wire payment", 2000),
            fixtures::order(9, "Awaiting bank wire payment", 2000),
        ]);
        harness.source.set_state(OrderId::new(9), "Payment accepted");

        let pass = harness.reconciler().reconcile().await.unwrap();

        assert_eq!(ids(&pass.updated), vec![9]);
        assert_eq!(pass.updated[0].order_state, "Payment accepted");
        assert_eq!(ids(&harness.queue.read_all().unwrap()), vec![7]);
    }

    #[tokio::test]
    async fn shipped_sole_entry_deletes_the_queue() {
        let harness = Harness::new(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]);
        harness.source.set_state(OrderId::new(9), "Shipped");

        let pass = harness.reconciler().reconcile().await.unwrap();

        assert!(pass.updated.is_empty());
        assert_eq!(ids(&pass.dropped), vec![9]);
        assert!(!harness.queue.exists());
    }

    #[tokio::test]
    async fn still_pending_keeps_the_fresh_snapshot() {
        let harness = Harness::new(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]);
        harness.source.set_state(OrderId::new(9), "Awaiting check payment");

        harness.reconciler().reconcile().await.unwrap();

        let queued = harness.queue.read_all().unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].order_state, "Awaiting check payment");
    }

    #[tokio::test]
    async fn failed_refetch_retains_the_record_unchanged() {
        let original = fixtures::order(9, "Awaiting bank wire payment", 2000);
        let harness = Harness::new(&[original.clone(), fixtures::order(10, "Awaiting bank wire payment", 2000)]);
        harness.source.set_state(OrderId::new(9), "Payment accepted");
        harness.source.set_state(OrderId::new(10), "Payment accepted");
        harness.source.fail_on(OrderId::new(9));

        let pass = harness.reconciler().reconcile().await.unwrap();

        assert_eq!(ids(&pass.updated), vec![10]);
        assert_eq!(pass.failures.len(), 1);
        assert_eq!(pass.failures[0].0, OrderId::new(9));
        assert_eq!(harness.queue.read_all().unwrap(), vec![original]);
    }

    #[tokio::test]
    async fn deleted_order_is_dropped_from_the_queue() {
        let harness = Harness::new(&[
            fixtures::order(7, "Awaiting bank wire payment", 2000),
            fixtures::order(9, "Awaiting bank wire payment", 2000),
        ]);
        harness.source.remove(OrderId::new(9));

        let pass = harness.reconciler().reconcile().await.unwrap();

        assert_eq!(ids(&pass.dropped), vec![9]);
        assert!(pass.failures.is_empty());
        assert_eq!(ids(&harness.queue.read_all().unwrap()), vec![7]);
    }

    #[tokio::test]
    async fn review_leaves_the_queue_file_alone() {
        let harness = Harness::new(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]);
        harness.source.set_state(OrderId::new(9), "Payment accepted");
        let before = std::fs::read_to_string(harness.queue.path()).unwrap();

        let pass = harness.reconciler().review().await.unwrap();

        assert_eq!(ids(&pass.updated), vec![9]);
        assert!(pass.remaining.is_empty());
        assert_eq!(std::fs::read_to_string(harness.queue.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn promotion_happens_exactly_once() {
        let harness = Harness::new(&[fixtures::order(9, "Awaiting bank wire payment", 2000)]);
        harness.source.set_state(OrderId::new(9), "Payment accepted");

        let first = harness.reconciler().reconcile().await.unwrap();
        let second = harness.reconciler().reconcile().await.unwrap();

        assert_eq!(ids(&first.updated), vec![9]);
        assert!(second.updated.is_empty());
    }
}
