//! pickup - 高額注文の集荷依頼メールを 1 回分送る
//!
//! cron などから定期的に起動される前提。1 回の起動で 1 回だけ実行して終了する。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pickup_core::app::AppBuilder;
use pickup_core::domain::MailOutcome;
use tracing::{Instrument, error, info, info_span, warn};

mod adapters;
mod config;
mod logging;

use crate::adapters::{MySqlWeightStore, PrestaShopClient, SmtpMailer};
use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "pickup", version, about = "Mail a pickup request for new paid bulk orders")]
struct Cli {
    /// Compose the pickup request and print it instead of mailing it. The
    /// cursor and the pending queue are left untouched.
    #[arg(long)]
    dry_run: bool,

    /// Dotenv file with credentials; variables already in the environment win.
    #[arg(long, default_value = "resources/.env")]
    env_file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = dotenvy::from_path(&cli.env_file)
        && !err.not_found()
    {
        return Err(err).with_context(|| format!("reading {}", cli.env_file.display()));
    }
    let config = Config::from_env().context("invalid configuration")?;
    let _guard = logging::init(&config.log_dir)
        .with_context(|| format!("creating log directory {}", config.log_dir.display()))?;

    let source = PrestaShopClient::new(&config.presta).context("building PrestaShop client")?;
    let weights = Arc::new(MySqlWeightStore::connect_lazy(&config.db));
    let mailer = SmtpMailer::new(&config.smtp).context("building SMTP transport")?;

    let orchestrator = AppBuilder::new()
        .config(config.pipeline.clone())
        .order_source(Arc::new(source))
        .weight_store(weights.clone())
        .mail_transport(Arc::new(mailer))
        .dry_run(cli.dry_run)
        .build()?;

    let result = orchestrator
        .run()
        .instrument(info_span!("pickup_run", dry_run = cli.dry_run))
        .await;
    weights.close().await;

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, kind = ?err.kind(), "Pickup run aborted");
            return Err(err.into());
        }
    };

    if report.is_degraded() {
        warn!(incidents = report.incidents.len(), "Pickup run finished degraded");
    }
    if report.mail == MailOutcome::Skipped {
        println!("{}", report.message);
    }
    info!(mail = ?report.mail, "Done");
    Ok(())
}
