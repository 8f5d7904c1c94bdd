//! RecordingMailTransport - 送信内容を記録するだけのメール送信

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::ports::{MailTransport, OutgoingMail, TransportError};

#[derive(Default)]
pub struct RecordingMailTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    fail: AtomicBool,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent `send` fails with a delivery error.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    /// Messages passed to `send`, including failed attempts.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(mail.clone());
        if self.fail.load(Ordering::Relaxed) {
            return Err(TransportError::Delivery("535 authentication failed".into()));
        }
        Ok(())
    }
}
