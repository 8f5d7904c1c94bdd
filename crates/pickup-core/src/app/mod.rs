//! App - アプリケーション層
//!
//! このモジュールは、ports と store を組み合わせてパイプラインを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: パイプラインの構築とワイヤリング
//! - **Orchestrator**: 1 回の実行（Lock → Fetch → Reconcile → Classify → Group → Compose → Send）
//! - **OrderFetcher**: カーソル以降の新規注文の取得
//! - **Classifier**: paid / pending / discarded への分類
//! - **Reconciler**: pending キューの再確認
//! - **WeightGrouper**: 重量行の付与
//! - **NotificationComposer**: 通知文の生成
//! - **Notifier**: メール送信と警告ダイジェスト

pub mod builder;
pub mod classifier;
pub mod composer;
pub mod fetcher;
pub mod grouper;
pub mod notifier;
pub mod orchestrator;
pub mod reconciler;

// 主要な型を再エクスポート
pub use self::builder::{AppBuilder, BuildError};
pub use self::classifier::{Classified, Classifier, classify};
pub use self::composer::{NotificationComposer, format_weight_rows, next_friday};
pub use self::fetcher::{Batch, FetchOutcome, OrderFetcher, filter_bulk, qualifies_for_bulk};
pub use self::grouper::{Grouping, WeightGrouper};
pub use self::notifier::Notifier;
pub use self::orchestrator::Orchestrator;
pub use self::reconciler::{Reconciler, Reconciliation};
