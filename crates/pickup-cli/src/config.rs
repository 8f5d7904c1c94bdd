//! Process configuration, read once from the environment.
//!
//! `resources/.env` is loaded by `main` before this runs; variables already set
//! in the process environment win.

use std::path::PathBuf;

use pickup_core::config::{MailSettings, PipelineConfig};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct PrestaConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub schema: String,
    /// Prefix of the shop's tables (`lvs` → `lvsorders`).
    pub table_prefix: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// 465 means implicit TLS, anything else STARTTLS.
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub resources_dir: PathBuf,
    pub log_dir: PathBuf,
    pub presta: PrestaConfig,
    pub db: DbConfig,
    pub smtp: SmtpConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let port = |key: &'static str, default: u16| match get(key) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }),
            None => Ok(default),
        };

        let resources_dir = PathBuf::from(get("RESOURCES_DIR").unwrap_or_else(|| "resources".into()));
        let log_dir = PathBuf::from(get("LOG_DIR").unwrap_or_else(|| "logs".into()));

        let table_prefix = get("DB_TABLE_PREFIX").unwrap_or_else(|| "lvs".into());
        if !table_prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::Invalid {
                key: "DB_TABLE_PREFIX",
                reason: format!("{table_prefix:?} may only contain letters, digits and '_'"),
            });
        }

        let office_email = require("OFFICE_EMAIL")?;
        let info_email = get("LEVUS_INFO_EMAIL");
        let alert_to: Vec<String> = match get("WARNING_EMAIL") {
            Some(warning) => std::iter::once(warning).chain(info_email.clone()).collect(),
            None => Vec::new(),
        };

        let mut pipeline = PipelineConfig::in_dir(&resources_dir);
        pipeline.signature = get("MAIL_SIGNATURE").unwrap_or_default();
        pipeline.mail = MailSettings {
            from: office_email.clone(),
            to: vec![require("PUX_EMAIL")?],
            cc: info_email.into_iter().collect(),
            subject: get("SUBJECT").unwrap_or_else(|| "Abholung".into()),
            alert_to,
            alert_subject: pipeline.mail.alert_subject.clone(),
        };

        Ok(Self {
            presta: PrestaConfig {
                base_url: require("PRESTA_URL")?.trim_end_matches('/').to_string(),
                api_key: require("PRESTA_API_KEY")?,
            },
            db: DbConfig {
                host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
                port: port("DB_PORT", 3306)?,
                user: require("DB_USER")?,
                password: require("DB_PASSWD")?,
                schema: require("DB_SCHEMA")?,
                table_prefix,
            },
            smtp: SmtpConfig {
                host: get("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".into()),
                port: port("SMTP_PORT", 465)?,
                username: office_email,
                password: require("OFFICE_PASSWORD")?,
            },
            resources_dir,
            log_dir,
            pipeline,
        })
    }
}
