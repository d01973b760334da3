pub mod log_file;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use log::{debug, error};

/// Context attached to every delivered notification.
#[derive(Clone, Debug)]
pub struct NotifyContext {
    /// Target URL the change was detected on
    pub url: String,
    /// When the change was detected
    pub timestamp: DateTime<Local>,
}

/// Notification channel capability. All delivery transports implement
/// this trait; the monitoring core never depends on a concrete channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in log lines.
    fn name(&self) -> &str;

    /// Deliver one message. A failure is reported to the caller but must
    /// never be treated as fatal by the check cycle.
    async fn deliver(&self, message: &str, context: &NotifyContext) -> Result<()>;
}

/// Fan a change event out to every registered channel.
///
/// Delivery is best-effort: a failing channel is logged and skipped, and
/// never blocks delivery on the remaining channels.
pub async fn dispatch_all(channels: &[Box<dyn Notifier>], message: &str, context: &NotifyContext) {
    for channel in channels {
        match channel.deliver(message, context).await {
            Ok(()) => debug!("Notification delivered via {}", channel.name()),
            Err(e) => error!("Failed to send notification via {}: {}", channel.name(), e),
        }
    }
}
