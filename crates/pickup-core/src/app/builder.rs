//! AppBuilder - 集荷パイプラインの組み立て
//!
//! 注文サービス・重量 DB・メール送信の 3 つのアダプタと `PipelineConfig` を
//! 受け取り、1 回分の実行を担う `Orchestrator` を返す。
//!
//! # 検証すること
//! - アダプタと設定がすべて揃っているか（不足分はまとめて報告）
//! - 高額注文のしきい値が負でないか
//! - 送信先が空でないか（dry run は送らないので不要）

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::app::orchestrator::Orchestrator;
use crate::config::PipelineConfig;
use crate::ports::{Clock, MailTransport, OrderSource, SystemClock, WeightStore};

/// AppBuilder は Orchestrator を構築
///
/// # 使用例
/// ```ignore
/// let orchestrator = AppBuilder::new()
///     .config(config)
///     .order_source(Arc::new(client))
///     .weight_store(Arc::new(weights))
///     .mail_transport(Arc::new(mailer))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 注文サービス・重量 DB・メール送信・設定はすべて必須
/// - build() 時に不足分をまとめて BuildError で返す
/// - Clock は省略時 SystemClock
pub struct AppBuilder {
    config: Option<PipelineConfig>,
    source: Option<Arc<dyn OrderSource>>,
    weights: Option<Arc<dyn WeightStore>>,
    transport: Option<Arc<dyn MailTransport>>,
    clock: Arc<dyn Clock>,
    dry_run: bool,
}

/// BuildError はパイプライン構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing collaborators: {0:?}. These must be set before build().")]
    MissingCollaborators(Vec<&'static str>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AppBuilder {
    /// 新しい AppBuilder を作成
    pub fn new() -> Self {
        Self {
            config: None,
            source: None,
            weights: None,
            transport: None,
            clock: Arc::new(SystemClock),
            dry_run: false,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn order_source(mut self, source: Arc<dyn OrderSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn weight_store(mut self, weights: Arc<dyn WeightStore>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn mail_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// AppBuilder を検証して Orchestrator を生成
    ///
    /// # 検証
    /// - 必須の collaborator が全て設定されているか
    /// - 金額しきい値が負でないか
    /// - dry run でなければ送信先が 1 件以上あるか
    pub fn build(self) -> Result<Orchestrator, BuildError> {
        let mut missing = Vec::new();
        if self.config.is_none() {
            missing.push("config");
        }
        if self.source.is_none() {
            missing.push("order_source");
        }
        if self.weights.is_none() {
            missing.push("weight_store");
        }
        if self.transport.is_none() {
            missing.push("mail_transport");
        }

        let (Some(config), Some(source), Some(weights), Some(transport)) =
            (self.config, self.source, self.weights, self.transport)
        else {
            return Err(BuildError::MissingCollaborators(missing));
        };

        if config.bulk_threshold < Decimal::ZERO {
            return Err(BuildError::InvalidConfig(format!(
                "bulk threshold must not be negative, got {}",
                config.bulk_threshold
            )));
        }
        if !self.dry_run && config.mail.to.is_empty() {
            return Err(BuildError::InvalidConfig(
                "no recipient for the pickup request".to_string(),
            ));
        }

        Ok(Orchestrator::new(config, source, weights, transport, self.clock).with_dry_run(self.dry_run))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::{FixedWeightStore, InMemoryOrderSource, RecordingMailTransport};

    fn config() -> PipelineConfig {
        let mut config = PipelineConfig::in_dir("resources");
        config.mail.to = vec!["carrier@example.com".into()];
        config
    }

    fn complete() -> AppBuilder {
        AppBuilder::new()
            .config(config())
            .order_source(Arc::new(InMemoryOrderSource::new()))
            .weight_store(Arc::new(FixedWeightStore::new()))
            .mail_transport(Arc::new(RecordingMailTransport::new()))
    }

    #[test]
    fn test_build_success() {
        let orchestrator = complete().build().unwrap();
        assert!(!orchestrator.is_dry_run());
        assert_eq!(orchestrator.config().bulk_threshold, Decimal::from(1500));
    }

    #[test]
    fn test_build_missing_collaborators() {
        let result = AppBuilder::new()
            .config(config())
            .order_source(Arc::new(InMemoryOrderSource::new()))
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingCollaborators(missing)) if missing == vec!["weight_store", "mail_transport"]
        ));
    }

    #[test]
    fn test_build_rejects_negative_threshold() {
        let mut config = config();
        config.bulk_threshold = Decimal::from(-1);
        let result = complete().config(config).build();
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));
    }

    #[test]
    fn test_build_requires_recipient_unless_dry_run() {
        let mut config = config();
        config.mail.to.clear();

        let result = complete().config(config.clone()).build();
        assert!(matches!(result, Err(BuildError::InvalidConfig(_))));

        let orchestrator = complete().config(config).dry_run(true).build().unwrap();
        assert!(orchestrator.is_dry_run());
    }
}
