//! WeightGrouper: attaches box weight rows to every paid order.

use std::sync::Arc;

use tracing::{error, info};

use crate::domain::{GroupedOrders, Order, OrderId};
use crate::ports::WeightStore;

/// Grouped orders plus the orders whose weight query failed.
///
/// A failed order is still present in `grouped`, with no rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    pub grouped: GroupedOrders,
    pub failures: Vec<(OrderId, String)>,
}

pub struct WeightGrouper {
    store: Arc<dyn WeightStore>,
}

impl WeightGrouper {
    pub fn new(store: Arc<dyn WeightStore>) -> Self {
        Self { store }
    }

    pub async fn group(&self, paid: Vec<Order>) -> Grouping {
        info!(count = paid.len(), "Started grouping paid order(s)");
        let mut grouping = Grouping::default();

        for order in paid {
            let rows = match self.store.weights_for(&order.reference).await {
                Ok(rows) => rows,
                Err(err) => {
                    error!(order_id = %order.id, reference = %order.reference, error = %err, "Weight query failed");
                    grouping.failures.push((order.id, err.to_string()));
                    Vec::new()
                }
            };
            grouping.grouped.insert(order, rows);
        }
        grouping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeightRow;
    use crate::impls::{FixedWeightStore, fixtures};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn rows_are_attached_per_reference() {
        let row = WeightRow::new("REF00011", "Box L", Decimal::new(24_750, 3));
        let store = Arc::new(FixedWeightStore::new().with_rows("REF00011", vec![row.clone()]));
        let grouper = WeightGrouper::new(store.clone());

        let grouping = grouper
            .group(vec![
                fixtures::order(11, "Payment accepted", 2000),
                fixtures::order(12, "Payment accepted", 2000),
            ])
            .await;

        assert_eq!(grouping.grouped.get(OrderId::new(11)), Some(&[row][..]));
        // zero matching rows is an empty list, not an error
        assert_eq!(grouping.grouped.get(OrderId::new(12)), Some(&[][..]));
        assert!(grouping.failures.is_empty());
        assert_eq!(store.queried(), vec!["REF00011", "REF00012"]);
    }

    #[tokio::test]
    async fn failed_query_keeps_the_order_without_rows() {
        let store = Arc::new(FixedWeightStore::new().failing_for("REF00011"));
        let grouper = WeightGrouper::new(store);

        let grouping = grouper.group(vec![fixtures::order(11, "Payment accepted", 2000)]).await;

        assert_eq!(grouping.grouped.len(), 1);
        assert_eq!(grouping.grouped.get(OrderId::new(11)), Some(&[][..]));
        assert_eq!(grouping.failures.len(), 1);
    }

    #[tokio::test]
    async fn nothing_paid_groups_nothing() {
        let grouper = WeightGrouper::new(Arc::new(FixedWeightStore::new()));
        assert!(grouper.group(Vec::new()).await.grouped.is_empty());
    }
}
