use serde_json::json;
use tracing::{debug, instrument};

/// POSTs checkout summaries to the endpoint configured in settings.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
}

impl Default for WebhookSink {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookSink {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Deliver a one-line summary to the webhook endpoint.
    #[instrument(skip(self))]
    pub async fn post_summary(
        &self,
        endpoint: &str,
        channel: Option<&str>,
        text: &str,
    ) -> Result<(), reqwest::Error> {
        debug!("Posting checkout summary to webhook endpoint");

        self.client
            .post(endpoint)
            .json(&json!({
                "channel": channel,
                "text": text,
            }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
