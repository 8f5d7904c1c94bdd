//! pickup-core
//!
//! Core building blocks for the pickup pipeline: new PrestaShop orders in,
//! one pickup request mail out.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（order, cursor, state, weight, report, errors）
//! - **ports**: 抽象化レイヤー（OrderSource, WeightStore, MailTransport, Clock）
//! - **store**: 実行間で残る状態（カーソル・pending キュー・実行ロック）
//! - **app**: パイプライン本体（builder, orchestrator, fetcher, classifier, など）
//! - **impls**: テスト用実装（InMemoryOrderSource など）
//! - **config**: パイプライン設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod store;
