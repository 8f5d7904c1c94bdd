//! Classifier: partitions a batch into paid / pending / discarded.

use tracing::info;

use crate::domain::{Order, OrderClass};
use crate::store::{PendingQueue, StoreError};

/// A total partition of one batch. Every input order lands in exactly one
/// bucket; relative order is preserved inside each bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub paid: Vec<Order>,
    pub pending: Vec<Order>,
    pub discarded: Vec<Order>,
}

impl Classified {
    pub fn len(&self) -> usize {
        self.paid.len() + self.pending.len() + self.discarded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn classify(orders: Vec<Order>) -> Classified {
    let mut classified = Classified::default();
    for order in orders {
        match OrderClass::of(&order.order_state) {
            OrderClass::Paid => classified.paid.push(order),
            OrderClass::Pending => classified.pending.push(order),
            OrderClass::Discarded => classified.discarded.push(order),
        }
    }
    classified
}

pub struct Classifier {
    queue: PendingQueue,
}

impl Classifier {
    pub fn new(queue: PendingQueue) -> Self {
        Self { queue }
    }

    /// Classifies `orders` and appends the pending ones to the queue.
    pub fn classify_and_enqueue(&self, orders: Vec<Order>) -> Result<Classified, StoreError> {
        let classified = classify(orders);
        if !classified.pending.is_empty() {
            self.queue.append(&classified.pending)?;
        }
        if !classified.is_empty() {
            info!(
                paid = classified.paid.len(),
                pending = classified.pending.len(),
                discarded = classified.discarded.len(),
                "Classified new order(s)"
            );
        }
        Ok(classified)
    }
}
