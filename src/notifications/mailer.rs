use async_trait::async_trait;

use super::NotifyError;

/// A fully assembled outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivery seam for checkout notifications.
///
/// The service itself does not speak SMTP; deployments hang their delivery
/// mechanism off this trait. The default wiring logs rendered messages.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), NotifyError>;
}

/// Logs every message instead of delivering it.
#[derive(Debug, Default)]
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), NotifyError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            "outbound mail:\n{}",
            mail.body
        );
        Ok(())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Captures sent mail for assertions.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingMailer {
        sent: Arc<Mutex<Vec<OutboundMail>>>,
    }

    impl RecordingMailer {
        pub fn sent(&self) -> Vec<OutboundMail> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self, address: &str) -> bool {
            self.sent.lock().unwrap().iter().any(|m| m.to == address)
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: OutboundMail) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }
}
