//! An [`AlertSink`] that posts to a Slack channel.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{errors::AlertError, sink::AlertSink};

/// Slack Web API method used to post a message.
pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

/// Upper bound on a single post.
const POST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,

    #[serde(default)]
    error: Option<String>,
}

impl PostMessageResponse {
    /// Slack reports most failures in the body of a 200.
    fn into_result(self) -> Result<(), AlertError> {
        if self.ok {
            return Ok(());
        }

        Err(AlertError::Rejected {
            service: "slack",
            reason: self.error.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}

/// Posts alerts to a Slack channel as a bot.
#[derive(Clone)]
pub struct SlackAlertSink {
    client: Client,
    endpoint: String,
    token: String,
    channel: String,
}

impl std::fmt::Debug for SlackAlertSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackAlertSink")
            .field("endpoint", &self.endpoint)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

impl SlackAlertSink {
    /// Creates a sink posting to `channel` with the bot `token`.
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Result<Self, AlertError> {
        let client = Client::builder().timeout(POST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: SLACK_POST_MESSAGE_URL.to_string(),
            token: token.into(),
            channel: channel.into(),
        })
    }

    /// Posts to `endpoint` instead of the public Slack API.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl AlertSink for SlackAlertSink {
    async fn notify(&self, message: &str) -> Result<(), AlertError> {
        self.post_message(message)
            .send()
            .await?
            .error_for_status()?
            .json::<PostMessageResponse>()
            .await?
            .into_result()?;

        debug!(channel = %self.channel, "posted alert to slack");
        Ok(())
    }
}

impl SlackAlertSink {
    fn post_message(&self, text: &str) -> RequestBuilder {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel: &self.channel,
                text,
            })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{header::AUTHORIZATION, Method};

    use super::*;

    #[test]
    fn posts_message_with_bot_token() {
        let sink = SlackAlertSink::new("xoxb-test", "#faucet-alerts").unwrap();

        let request = sink
            .post_message("Error dripping for 42, nonce too low")
            .build()
            .expect("must build request");

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.url().as_str(), SLACK_POST_MESSAGE_URL);
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer xoxb-test");
        assert_eq!(
            request.body().and_then(|body| body.as_bytes()),
            Some(
                br##"{"channel":"#faucet-alerts","text":"Error dripping for 42, nonce too low"}"##
                    .as_slice()
            )
        );
    }

    #[test]
    fn custom_endpoint_is_used() {
        let sink = SlackAlertSink::new("xoxb-test", "#faucet-alerts")
            .unwrap()
            .with_endpoint("http://127.0.0.1:3000/api/chat.postMessage");

        let request = sink.post_message("hello").build().unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:3000/api/chat.postMessage"
        );
    }

    #[test]
    fn surfaces_slack_rejection() {
        let accepted: PostMessageResponse = serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(accepted.into_result().is_ok());

        let rejected: PostMessageResponse =
            serde_json::from_str(r#"{"ok":false,"error":"channel_not_found"}"#).unwrap();
        assert!(matches!(
            rejected.into_result(),
            Err(AlertError::Rejected { service: "slack", ref reason }) if reason == "channel_not_found"
        ));

        let unexplained: PostMessageResponse = serde_json::from_str(r#"{"ok":false}"#).unwrap();
        assert!(matches!(
            unexplained.into_result(),
            Err(AlertError::Rejected { ref reason, .. }) if reason == "unknown"
        ));
    }
}
