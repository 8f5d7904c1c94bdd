//! OrderSource port - リモート注文サービス（PrestaShop webservice など）
//!
//! # 実装
//! - **PrestaShopClient**: `pickup-cli` 側の本番実装
//! - **InMemoryOrderSource**: テスト用

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Order, OrderId};

/// Failures talking to the order source.
///
/// `NotFound` is permanent: the order was deleted on the shop. Fetch skips the
/// id and reconciliation drops the record. Every other variant is a
/// connectivity failure; fetch aborts the batch and reconciliation keeps the
/// record unchanged.
#[derive(Debug, Clone, Error)]
pub enum OrderSourceError {
    #[error("connection to order source failed: {0}")]
    Connection(String),

    #[error("order source rejected the credentials")]
    Unauthorized,

    #[error("not found on order source: {0}")]
    NotFound(String),

    #[error("invalid response from order source: {0}")]
    InvalidResponse(String),
}

impl OrderSourceError {
    /// The order no longer exists on the source and never will again.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// OrderSource は注文の件数と個別の注文スナップショットを提供
///
/// # 設計原則
/// - 1 呼び出し = 1 注文（バッチ取得はしない）
/// - タイムアウトは実装側の責務
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Highest order identifier currently known to the source.
    async fn order_count(&self) -> Result<u64, OrderSourceError>;

    async fn get_order(&self, id: OrderId) -> Result<Order, OrderSourceError>;
}
