//! Summary notification
//!
//! The agent hands a finished run's summary to whatever is behind this
//! trait, fire-and-forget. The contract is a single plain-text message;
//! delivery and its failures are the collaborator's problem.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Receives one plain-text message per completed run
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// POSTs the message body to a fixed URL
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        debug!(url = %self.url, "sending summary notification");
        self.client
            .post(&self.url)
            .timeout(SEND_TIMEOUT)
            .body(message.to_string())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Build the configured notifier, if any
pub fn from_config(notify_url: Option<&str>) -> Option<Arc<dyn Notifier>> {
    notify_url.map(|url| Arc::new(WebhookNotifier::new(url)) as Arc<dyn Notifier>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_url_means_no_notifier() {
        assert!(from_config(None).is_none());
        assert!(from_config(Some("https://example.com/hook")).is_some());
    }
}
