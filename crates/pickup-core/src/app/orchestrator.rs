//! Orchestrator - 1 回の実行を順番に組み立てる
//!
//! # フロー
//! 1. RunLock を取得（他の実行が走っていれば即失敗）
//! 2. カーソルを読む（壊れていれば即失敗、取得前に検出）
//! 3. 新規注文を取得（削除済みの欠番は incident として飛ばす）
//! 4. pending キューを再確認
//! 5. 新規注文を分類し、pending をキューに追加
//! 6. ここまで成功したらカーソルを進める
//! 7. paid（新規 + 昇格）があれば重量行を付けて通知文を作り、1 回だけ送信
//! 8. incident があれば警告ダイジェストを送信
//!
//! # 設計原則
//! - 外部サービスの失敗は incident として記録し、実行は劣化して続行
//! - 永続状態（ロック・カーソル・キュー）の失敗だけが `PickupError` になる
//! - リトライは一切しない
//! - dry run はカーソルもキューも書き換えない

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::classifier::{Classifier, classify};
use crate::app::composer::NotificationComposer;
use crate::app::fetcher::{FetchOutcome, OrderFetcher, filter_bulk};
use crate::app::grouper::WeightGrouper;
use crate::app::notifier::Notifier;
use crate::app::reconciler::Reconciler;
use crate::config::PipelineConfig;
use crate::domain::{
    GroupedOrders, Incident, MailOutcome, Order, OrderId, PickupError, RunReport, Stage,
};
use crate::ports::{Clock, MailTransport, OrderSource, WeightStore};
use crate::store::{CursorStore, PendingQueue, RunLock};

pub struct Orchestrator {
    config: PipelineConfig,
    source: Arc<dyn OrderSource>,
    weights: Arc<dyn WeightStore>,
    transport: Arc<dyn MailTransport>,
    clock: Arc<dyn Clock>,
    dry_run: bool,
}

impl Orchestrator {
    /// Usually built through [`AppBuilder`](crate::app::AppBuilder).
    pub fn new(
        config: PipelineConfig,
        source: Arc<dyn OrderSource>,
        weights: Arc<dyn WeightStore>,
        transport: Arc<dyn MailTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            source,
            weights,
            transport,
            clock,
            dry_run: false,
        }
    }

    /// Compose the notification but hand nothing to the transport and leave
    /// the cursor and pending queue as they were.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Runs the whole pipeline once.
    pub async fn run(&self) -> Result<RunReport, PickupError> {
        let _lock = RunLock::acquire(&self.config.lock_path)?;

        let cursors = CursorStore::new(&self.config.cursor_path);
        let cursor = cursors.read()?;
        info!(cursor = cursor.get(), "Started pickup run");
        let mut report = RunReport::new(cursor);

        let (fetched, next_cursor) = match OrderFetcher::new(self.source.clone()).poll(cursor).await {
            FetchOutcome::UpToDate => (Vec::new(), None),
            FetchOutcome::Fetched {
                orders,
                missing,
                remote_count,
            } => {
                for id in missing {
                    report.record(Incident::new(
                        Stage::Fetch,
                        format!("order {id}: no longer exists on the order source, skipped"),
                    ));
                }
                (orders, cursor.advance_to(remote_count))
            }
            FetchOutcome::Aborted(err) => {
                warn!(error = %err, "Fetching new orders failed, batch dropped");
                report.record(Incident::new(Stage::Fetch, err.to_string()));
                (Vec::new(), None)
            }
        };
        report.fetched = fetched.len();
        let qualified = filter_bulk(fetched, self.config.bulk_threshold);
        report.qualified = qualified.len();

        let queue = PendingQueue::new(&self.config.pending_path);
        let reconciler = Reconciler::new(self.source.clone(), queue.clone());
        let reconciliation = if self.dry_run {
            reconciler.review().await?
        } else {
            reconciler.reconcile().await?
        };
        report.promoted = reconciliation.updated.len();
        report.still_pending = reconciliation.remaining.len();
        report.reconcile_failures = reconciliation.failures.len();
        record_failures(&mut report, Stage::Reconcile, reconciliation.failures);

        let classified = if self.dry_run {
            classify(qualified)
        } else {
            Classifier::new(queue).classify_and_enqueue(qualified)?
        };
        report.new_paid = classified.paid.len();
        report.new_pending = classified.pending.len();
        report.discarded = classified.discarded.len();
        // Promoted orders are no longer queued, so the two sets cannot overlap.
        report.still_pending += classified.pending.len();

        // Only now is every fetched order classified and queued.
        if let Some(next) = next_cursor {
            if self.dry_run {
                info!(cursor = next.get(), "Dry run, cursor not advanced");
            } else {
                cursors.write(next)?;
                report.cursor_after = next;
            }
        }

        let paid: Vec<Order> = classified
            .paid
            .into_iter()
            .chain(reconciliation.updated)
            .collect();
        let grouped = if paid.is_empty() {
            GroupedOrders::default()
        } else {
            let grouping = WeightGrouper::new(self.weights.clone()).group(paid).await;
            record_failures(&mut report, Stage::Group, grouping.failures);
            grouping.grouped
        };

        let composer = NotificationComposer::new(self.config.signature.clone());
        report.message = composer.compose(&grouped, self.clock.today());

        let notifier = Notifier::new(self.transport.clone(), self.config.mail.clone());
        report.mail = if self.dry_run && !report.message.is_empty() {
            info!(orders = grouped.len(), "Dry run, pickup request not sent");
            MailOutcome::Skipped
        } else {
            notifier.send(&report.message).await
        };
        if let MailOutcome::Failed(reason) = &report.mail {
            report.record(Incident::new(Stage::Mail, reason.clone()));
        }

        if report.is_degraded() && !self.dry_run {
            report.alert = notifier.send_alert(&report.incidents).await;
        }

        info!(
            cursor_before = report.cursor_before.get(),
            cursor_after = report.cursor_after.get(),
            fetched = report.fetched,
            new_paid = report.new_paid,
            promoted = report.promoted,
            still_pending = report.still_pending,
            incidents = report.incidents.len(),
            "Finished pickup run"
        );
        Ok(report)
    }
}

fn record_failures(report: &mut RunReport, stage: Stage, failures: Vec<(OrderId, String)>) {
    for (id, reason) in failures {
        report.record(Incident::new(stage, format!("order {id}: {reason}")));
    }
}
