//! Impls - ports の開発用・テスト用実装
//!
//! # 含まれる実装
//! - **InMemoryOrderSource**: 状態変更・接続失敗を差し込める注文サービス
//! - **FixedWeightStore**: reference ごとに固定の重量行を返す
//! - **RecordingMailTransport**: 送信内容を記録する
//! - **fixtures**: サンプル注文
//!
//! # 本番用実装
//! 本番用の実装は `pickup-cli` クレートに配置します：
//! - PrestaShopClient（reqwest）
//! - MySqlWeightStore（sqlx）
//! - SmtpMailer（lettre）

pub mod fixed_weights;
pub mod fixtures;
pub mod inmem_source;
pub mod recording_mail;

pub use self::fixed_weights::FixedWeightStore;
pub use self::inmem_source::InMemoryOrderSource;
pub use self::recording_mail::RecordingMailTransport;
