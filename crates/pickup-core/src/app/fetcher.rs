//! OrderFetcher - カーソル以降の未取得注文をまとめて取る
//!
//! # フロー
//! 1. OrderSource::order_count() でリモートの最大 ID を取得
//! 2. (cursor, remote_count] を ID 昇順で 1 件ずつ取得
//! 3. 1 件でも接続失敗したらバッチ全体を破棄（カーソルは動かさない）
//!    - NotFound（削除済み注文）は欠番として飛ばし、`missing` に記録
//!
//! 金額フィルタ（`filter_bulk`）はカーソル更新の後に適用する。

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::domain::{Cursor, Order, OrderId};
use crate::ports::{OrderSource, OrderSourceError};

/// Orders fetched from one unseen range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub orders: Vec<Order>,
    /// Ids in the range that were deleted on the source.
    pub missing: Vec<OrderId>,
}

/// Result of one poll against the order source.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The remote count is not ahead of the cursor.
    UpToDate,
    /// Every order in `(cursor, remote_count]`, ascending, except the ids in
    /// `missing` that no longer exist on the source.
    Fetched {
        orders: Vec<Order>,
        missing: Vec<OrderId>,
        remote_count: u64,
    },
    /// A connectivity failure; nothing from this batch may be used.
    Aborted(OrderSourceError),
}

pub struct OrderFetcher {
    source: Arc<dyn OrderSource>,
}

impl OrderFetcher {
    pub fn new(source: Arc<dyn OrderSource>) -> Self {
        Self { source }
    }

    /// Asks for the remote count, then fetches everything past `cursor`.
    pub async fn poll(&self, cursor: Cursor) -> FetchOutcome {
        let remote_count = match self.source.order_count().await {
            Ok(count) => count,
            Err(err) => return FetchOutcome::Aborted(err),
        };

        if cursor.advance_to(remote_count).is_none() {
            info!(cursor = cursor.get(), remote_count, "No new orders found");
            return FetchOutcome::UpToDate;
        }

        match self.fetch_new(cursor, remote_count).await {
            Ok(Batch { orders, missing }) => FetchOutcome::Fetched {
                orders,
                missing,
                remote_count,
            },
            Err(err) => FetchOutcome::Aborted(err),
        }
    }

    /// Fetches every order in `(cursor, remote_count]`, one call per id.
    ///
    /// Deleted ids are skipped. Any other failure stops the loop and the
    /// partial batch is dropped.
    pub async fn fetch_new(
        &self,
        cursor: Cursor,
        remote_count: u64,
    ) -> Result<Batch, OrderSourceError> {
        let mut batch = Batch::default();
        for id in cursor.unseen_ids(remote_count) {
            match self.source.get_order(id).await {
                Ok(order) => {
                    debug!(order_id = %id, state = %order.order_state, "fetched order");
                    batch.orders.push(order);
                }
                Err(err) if err.is_gone() => {
                    warn!(order_id = %id, error = %err, "Order no longer exists, skipped");
                    batch.missing.push(id);
                }
                Err(err) => return Err(err),
            }
        }
        if !batch.orders.is_empty() {
            info!(count = batch.orders.len(), "Found new order(s)");
        }
        Ok(batch)
    }
}

/// True if the order paid strictly more than `threshold`.
pub fn qualifies_for_bulk(order: &Order, threshold: Decimal) -> bool {
    order.total_paid > threshold
}

/// Keeps the orders that qualify for 3-box handling, preserving order.
pub fn filter_bulk(orders: Vec<Order>, threshold: Decimal) -> Vec<Order> {
    let total = orders.len();
    let kept: Vec<Order> = orders
        .into_iter()
        .filter(|order| qualifies_for_bulk(order, threshold))
        .collect();
    if kept.len() < total {
        debug!(dropped = total - kept.len(), %threshold, "orders below bulk threshold");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderId;
    use crate::impls::{InMemoryOrderSource, fixtures};

    fn source_with(ids: &[u64]) -> Arc<InMemoryOrderSource> {
        Arc::new(InMemoryOrderSource::with_orders(
            ids.iter().map(|&id| fixtures::order(id, "Payment accepted", 2000)),
        ))
    }

    #[tokio::test]
    async fn fetches_the_unseen_range_in_ascending_order() {
        let source = source_with(&[9, 10, 11, 12]);
        let fetcher = OrderFetcher::new(source.clone());

        let outcome = fetcher.poll(Cursor::new(10)).await;

        let (orders, missing, remote_count) = match outcome {
            FetchOutcome::Fetched {
                orders,
                missing,
                remote_count,
            } => (orders, missing, remote_count),
            other => panic!("expected a fetched batch, got {other:?}"),
        };
        assert_eq!(remote_count, 12);
        assert!(missing.is_empty());
        let ids: Vec<u64> = orders.iter().map(|o| o.id.get()).collect();
        assert_eq!(ids, vec![11, 12]);
        assert_eq!(source.requested(), vec![OrderId::new(11), OrderId::new(12)]);
    }

    #[tokio::test]
    async fn up_to_date_when_remote_is_not_ahead() {
        let source = source_with(&[9, 10]);
        let fetcher = OrderFetcher::new(source.clone());

        assert!(matches!(fetcher.poll(Cursor::new(10)).await, FetchOutcome::UpToDate));
        assert!(matches!(fetcher.poll(Cursor::new(15)).await, FetchOutcome::UpToDate));
        assert!(source.requested().is_empty());
    }

    #[tokio::test]
    async fn failure_mid_batch_aborts_everything() {
        let source = source_with(&[11, 12, 13]);
        source.fail_on(OrderId::new(12));
        let fetcher = OrderFetcher::new(source.clone());

        let outcome = fetcher.poll(Cursor::new(10)).await;

        assert!(matches!(outcome, FetchOutcome::Aborted(OrderSourceError::Connection(_))));
        // stops at the failing id
        assert_eq!(source.requested(), vec![OrderId::new(11), OrderId::new(12)]);
    }

    #[tokio::test]
    async fn deleted_order_is_skipped_not_fatal() {
        let source = source_with(&[11, 13]);
        let fetcher = OrderFetcher::new(source.clone());

        let outcome = fetcher.poll(Cursor::new(10)).await;

        let (orders, missing, remote_count) = match outcome {
            FetchOutcome::Fetched {
                orders,
                missing,
                remote_count,
            } => (orders, missing, remote_count),
            other => panic!("expected a fetched batch, got {other:?}"),
        };
        assert_eq!(remote_count, 13);
        let ids: Vec<u64> = orders.iter().map(|o| o.id.get()).collect();
        assert_eq!(ids, vec![11, 13]);
        assert_eq!(missing, vec![OrderId::new(12)]);
        assert_eq!(
            source.requested(),
            vec![OrderId::new(11), OrderId::new(12), OrderId::new(13)]
        );
    }

    #[tokio::test]
    async fn failing_count_aborts_before_any_order_call() {
        let source = source_with(&[11]);
        source.fail_order_count(true);
        let fetcher = OrderFetcher::new(source.clone());

        assert!(matches!(fetcher.poll(Cursor::new(10)).await, FetchOutcome::Aborted(_)));
        assert!(source.requested().is_empty());
    }

    #[test]
    fn bulk_threshold_is_strict() {
        let threshold = Decimal::from(1500);
        assert!(qualifies_for_bulk(&fixtures::order(1, "Payment accepted", 1501), threshold));
        assert!(!qualifies_for_bulk(&fixtures::order(2, "Payment accepted", 1500), threshold));
        assert!(!qualifies_for_bulk(&fixtures::order(3, "Payment accepted", 20), threshold));
    }

    #[test]
    fn filter_bulk_preserves_order() {
        let orders = vec![
            fixtures::order(1, "Payment accepted", 2000),
            fixtures::order(2, "Payment accepted", 100),
            fixtures::order(3, "Shipped", 1600),
        ];
        let ids: Vec<u64> = filter_bulk(orders, Decimal::from(1500))
            .iter()
            .map(|o| o.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
