//! Adapters - ports の本番実装
//!
//! - **PrestaShopClient**: OrderSource（reqwest）
//! - **MySqlWeightStore**: WeightStore（sqlx）
//! - **SmtpMailer**: MailTransport（lettre）

pub mod mysql;
pub mod prestashop;
pub mod smtp;

pub use self::mysql::MySqlWeightStore;
pub use self::prestashop::PrestaShopClient;
pub use self::smtp::SmtpMailer;
