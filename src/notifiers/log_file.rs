use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::notifiers::{Notifier, NotifyContext};
use crate::utils::{append_line, format_timestamp};

/// Appends change notifications to a plain text log file.
pub struct LogFileNotifier {
    path: PathBuf,
}

impl LogFileNotifier {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Notifier for LogFileNotifier {
    fn name(&self) -> &str {
        "log-file"
    }

    async fn deliver(&self, message: &str, context: &NotifyContext) -> Result<()> {
        let line = format!(
            "[{}] {} ({})",
            format_timestamp(context.timestamp),
            message,
            context.url
        );
        append_line(&self.path, &line)?;
        Ok(())
    }
}
