//! WeightStore port - 箱カテゴリ別の出荷重量を返す関係 DB
//!
//! # 実装
//! - **MySqlWeightStore**: `pickup-cli` 側の本番実装
//! - **FixedWeightStore**: テスト用

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::WeightRow;

#[derive(Debug, Clone, Error)]
pub enum WeightStoreError {
    #[error("weight store unavailable: {0}")]
    Connection(String),

    #[error("weight query failed: {0}")]
    Query(String),
}

/// WeightStore は注文 reference ごとの重量行を返す
///
/// 該当行がない場合は空の Vec（エラーではない）。
#[async_trait]
pub trait WeightStore: Send + Sync {
    async fn weights_for(&self, reference: &str) -> Result<Vec<WeightRow>, WeightStoreError>;
}
