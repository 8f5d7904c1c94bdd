//! Errors - 実行を中断するエラーとその分類
//!
//! 劣化して続行できる失敗（取得失敗・送信失敗など）はここには来ません。
//! それらは `RunReport` の incident として記録されます。

use thiserror::Error;

use crate::store::StoreError;

/// ErrorKind は運用上の分類
///
/// - Transient: 時間をおけば解消する（別の実行がロック中など）
/// - Permanent: 人手での修正が必要（カーソルファイル破損など）
/// - Infrastructure: ファイルシステムなど基盤の障害
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// PickupError は実行全体を中断するエラー
#[derive(Debug, Error)]
pub enum PickupError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PickupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PickupError::Store(StoreError::Locked(_)) => ErrorKind::Transient,
            PickupError::Store(StoreError::CorruptCursor { .. }) => ErrorKind::Permanent,
            PickupError::Store(StoreError::Malformed { .. }) => ErrorKind::Permanent,
            PickupError::Store(StoreError::Io { .. }) => ErrorKind::Infrastructure,
        }
    }
}
