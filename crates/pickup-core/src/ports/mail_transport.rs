//! MailTransport port - 完成したメッセージの送信（SMTP など）

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("invalid mail address {0:?}")]
    Address(String),

    #[error("could not build message: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// A fully composed plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Every address the message is delivered to.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to.iter().chain(self.cc.iter()).map(String::as_str)
    }
}

/// MailTransport は 1 通のメッセージを送る
///
/// 失敗はリトライしない。呼び出し側がログに残して続行する。
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError>;
}
