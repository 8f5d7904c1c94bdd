//! Notifier: hands composed text to the mail transport.
//!
//! Empty text never reaches the transport. Delivery failures are logged and
//! reported, never retried.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::MailSettings;
use crate::domain::{Incident, MailOutcome};
use crate::ports::{MailTransport, OutgoingMail};

pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    settings: MailSettings,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, settings: MailSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Sends the pickup request to the carrier.
    pub async fn send(&self, text: &str) -> MailOutcome {
        if text.is_empty() {
            info!("Found 0 paid orders -> mail not sent");
            return MailOutcome::NothingToSend;
        }

        let mail = OutgoingMail {
            from: self.settings.from.clone(),
            to: self.settings.to.clone(),
            cc: self.settings.cc.clone(),
            subject: self.settings.subject.clone(),
            body: text.to_string(),
        };
        info!(to = ?mail.to, cc = ?mail.cc, "Sending pickup request");
        self.deliver(&mail).await
    }

    /// Mails the run's incidents to the alert recipients, if any are configured.
    pub async fn send_alert(&self, incidents: &[Incident]) -> MailOutcome {
        if incidents.is_empty() || self.settings.alert_to.is_empty() {
            return MailOutcome::NothingToSend;
        }

        let body = incidents
            .iter()
            .map(|incident| format!("{incident}\n"))
            .collect::<String>();
        let mail = OutgoingMail {
            from: self.settings.from.clone(),
            to: self.settings.alert_to.clone(),
            cc: Vec::new(),
            subject: self.settings.alert_subject.clone(),
            body,
        };
        info!(incidents = incidents.len(), "Sending warning digest");
        self.deliver(&mail).await
    }

    async fn deliver(&self, mail: &OutgoingMail) -> MailOutcome {
        match self.transport.send(mail).await {
            Ok(()) => {
                info!(subject = %mail.subject, "Mail was successfully sent");
                MailOutcome::Sent
            }
            Err(err) => {
                error!(subject = %mail.subject, error = %err, "Failed to send the mail");
                MailOutcome::Failed(err.to_string())
            }
        }
    }
}
