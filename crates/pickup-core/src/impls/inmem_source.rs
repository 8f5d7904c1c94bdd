//! InMemoryOrderSource - テスト用の注文サービス
//!
//! 注文の状態変更や接続失敗を外から差し込めるようにしてある。

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{Order, OrderId};
use crate::ports::{OrderSource, OrderSourceError};

/// Scriptable order source backed by a map.
///
/// `order_count` is the highest stored id unless overridden with
/// `set_order_count`.
#[derive(Default)]
pub struct InMemoryOrderSource {
    orders: Mutex<BTreeMap<OrderId, Order>>,
    count_override: Mutex<Option<u64>>,
    failing: Mutex<HashSet<OrderId>>,
    count_fails: AtomicBool,
    requested: Mutex<Vec<OrderId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let source = Self::new();
        for order in orders {
            source.insert(order);
        }
        source
    }

    pub fn insert(&self, order: Order) {
        lock(&self.orders).insert(order.id, order);
    }

    /// Deletes an order; later lookups answer `NotFound`.
    pub fn remove(&self, id: OrderId) {
        lock(&self.orders).remove(&id);
    }

    /// Changes the state label of a stored order.
    pub fn set_state(&self, id: OrderId, order_state: &str) {
        if let Some(order) = lock(&self.orders).get_mut(&id) {
            order.order_state = order_state.to_string();
        }
    }

    pub fn set_order_count(&self, count: u64) {
        *lock(&self.count_override) = Some(count);
    }

    /// Makes `get_order(id)` fail with a connection error.
    pub fn fail_on(&self, id: OrderId) {
        lock(&self.failing).insert(id);
    }

    pub fn fail_order_count(&self, fail: bool) {
        self.count_fails.store(fail, Ordering::Relaxed);
    }

    /// Ids passed to `get_order`, in call order.
    pub fn requested(&self) -> Vec<OrderId> {
        lock(&self.requested).clone()
    }
}

#[async_trait]
impl OrderSource for InMemoryOrderSource {
    async fn order_count(&self) -> Result<u64, OrderSourceError> {
        if self.count_fails.load(Ordering::Relaxed) {
            return Err(OrderSourceError::Connection("order count unavailable".into()));
        }
        if let Some(count) = *lock(&self.count_override) {
            return Ok(count);
        }
        Ok(lock(&self.orders).keys().next_back().map_or(0, |id| id.get()))
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, OrderSourceError> {
        lock(&self.requested).push(id);
        if lock(&self.failing).contains(&id) {
            return Err(OrderSourceError::Connection(format!("connection reset fetching order {id}")));
        }
        lock(&self.orders)
            .get(&id)
            .cloned()
            .ok_or_else(|| OrderSourceError::NotFound(format!("order {id}")))
    }
}
