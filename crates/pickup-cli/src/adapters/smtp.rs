//! SmtpMailer - lettre による SMTP 送信
//!
//! ポート 465 は implicit TLS、それ以外は STARTTLS で接続する。

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use pickup_core::ports::{MailTransport, OutgoingMail, TransportError};

use crate::config::SmtpConfig;

const IMPLICIT_TLS_PORT: u16 = 465;
const TIMEOUT: Duration = Duration::from_secs(30);

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let builder = if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| TransportError::Build(e.to_string()))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(TIMEOUT))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError> {
        let message = build_message(mail)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| TransportError::Delivery(e.to_string()))?;
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address
        .trim()
        .parse()
        .map_err(|_| TransportError::Address(address.to_string()))
}

/// Plain-text UTF-8 message with the given From/To/Cc/Subject.
pub fn build_message(mail: &OutgoingMail) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(mailbox(&mail.from)?)
        .subject(mail.subject.as_str())
        .header(ContentType::TEXT_PLAIN);
    for to in &mail.to {
        builder = builder.to(mailbox(to)?);
    }
    for cc in &mail.cc {
        builder = builder.cc(mailbox(cc)?);
    }
    builder
        .body(mail.body.clone())
        .map_err(|e| TransportError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "office@example.com".into(),
            to: vec!["carrier@example.com".into()],
            cc: vec!["info@example.com".into()],
            subject: "Abholung".into(),
            body: "Buchen Sie bitte die Abholung für Freitag 15.03".into(),
        }
    }

    #[test]
    fn message_carries_all_recipients() {
        let message = build_message(&mail()).unwrap();

        let envelope = message.envelope();
        assert_eq!(envelope.to().len(), 2);
        assert_eq!(
            envelope.from().map(|a| a.to_string()).as_deref(),
            Some("office@example.com")
        );

        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("To: carrier@example.com"));
        assert!(formatted.contains("Cc: info@example.com"));
        assert!(formatted.contains("Subject: Abholung"));
    }

    #[test]
    fn bad_address_is_rejected_before_sending() {
        let mut mail = mail();
        mail.to = vec!["not an address".into()];
        assert!(matches!(
            build_message(&mail),
            Err(TransportError::Address(addr)) if addr == "not an address"
        ));
    }
}
