//! Pipeline configuration.
//!
//! Built once at process start and passed by reference; nothing in the crate
//! reads the environment on its own.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

pub const CURSOR_FILE: &str = "last_order.txt";
pub const PENDING_FILE: &str = "pending_orders.csv";
pub const LOCK_FILE: &str = "pickup.lock";

/// Orders must have paid strictly more than this to qualify for 3-box handling.
pub fn default_bulk_threshold() -> Decimal {
    Decimal::from(1500)
}

/// Addresses and subject of outgoing mail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailSettings {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    /// Recipients of the end-of-run incident digest; empty disables it.
    pub alert_to: Vec<String>,
    pub alert_subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub cursor_path: PathBuf,
    pub pending_path: PathBuf,
    pub lock_path: PathBuf,
    pub bulk_threshold: Decimal,
    /// Name closing the notification.
    pub signature: String,
    pub mail: MailSettings,
}

impl PipelineConfig {
    /// Default file names under `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            cursor_path: dir.join(CURSOR_FILE),
            pending_path: dir.join(PENDING_FILE),
            lock_path: dir.join(LOCK_FILE),
            bulk_threshold: default_bulk_threshold(),
            signature: String::new(),
            mail: MailSettings {
                alert_subject: "Log Warning Alert".to_string(),
                ..MailSettings::default()
            },
        }
    }
}
