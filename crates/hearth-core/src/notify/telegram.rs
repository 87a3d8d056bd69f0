//! Telegram Bot API sender -- post Markdown messages to one chat.

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::NotifyError;
use crate::storage::TelegramConfig;

#[derive(Debug, Clone)]
pub struct TelegramSender {
    client: Client,
    endpoint: Url,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramSender {
    /// Build a sender for `{api_base}/bot{token}/sendMessage`.
    pub fn new(api_base: &str, bot_token: &str, chat_id: &str) -> Result<Self, NotifyError> {
        if bot_token.is_empty() || chat_id.is_empty() {
            return Err(NotifyError::NotConfigured("Telegram"));
        }
        let base = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))?;
        let endpoint = base.join(&format!("bot{bot_token}/sendMessage"))?;
        Ok(Self {
            client: Client::new(),
            endpoint,
            chat_id: chat_id.to_string(),
        })
    }

    /// Sender for an enabled, fully configured Telegram section.
    pub fn from_config(config: &TelegramConfig) -> Result<Self, NotifyError> {
        if !config.is_configured() {
            return Err(NotifyError::NotConfigured("Telegram"));
        }
        Self::new(&config.api_base, &config.bot_token, &config.chat_id)
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Send `text` with Markdown parsing. A silent message arrives without
    /// a sound on the recipient's device.
    pub async fn send_message(&self, text: &str, silent: bool) -> Result<(), NotifyError> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_notification": silent,
        });

        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(NotifyError::Status {
                service: "Telegram",
                status: status.as_u16(),
                body: text,
            });
        }

        match serde_json::from_str::<ApiResponse>(&text) {
            Ok(ApiResponse { ok: false, description }) => Err(NotifyError::Status {
                service: "Telegram",
                status: status.as_u16(),
                body: description.unwrap_or(text),
            }),
            _ => {
                debug!(chat_id = %self.chat_id, "telegram message sent");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn missing_credentials_are_rejected() {
        assert!(matches!(
            TelegramSender::new("https://api.telegram.org", "", "42"),
            Err(NotifyError::NotConfigured("Telegram"))
        ));
        let disabled = TelegramConfig {
            enabled: false,
            bot_token: "t".into(),
            chat_id: "1".into(),
            ..TelegramConfig::default()
        };
        assert!(TelegramSender::from_config(&disabled).is_err());
    }

    #[test]
    fn invalid_base_url_is_an_error() {
        assert!(matches!(
            TelegramSender::new("not a url", "token", "42"),
            Err(NotifyError::Url(_))
        ));
    }

    #[tokio::test]
    async fn posts_markdown_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/botTOKEN/sendMessage")
            .match_body(Matcher::Json(json!({
                "chat_id": "42",
                "text": "*hello*",
                "parse_mode": "Markdown",
                "disable_notification": true,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"result":{}}"#)
            .create_async()
            .await;

        let sender = TelegramSender::new(&server.url(), "TOKEN", "42").unwrap();
        sender.send_message("*hello*", true).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTOKEN/sendMessage")
            .with_status(401)
            .with_body(r#"{"ok":false,"description":"Unauthorized"}"#)
            .create_async()
            .await;

        let sender = TelegramSender::new(&server.url(), "TOKEN", "42").unwrap();
        let err = sender.send_message("hi", false).await.unwrap_err();
        assert!(matches!(err, NotifyError::Status { status: 401, .. }));
        assert!(err.to_string().contains("Telegram answered HTTP 401"));
    }

    #[tokio::test]
    async fn api_level_failure_is_reported() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/botTOKEN/sendMessage")
            .with_status(200)
            .with_body(r#"{"ok":false,"description":"chat not found"}"#)
            .create_async()
            .await;

        let sender = TelegramSender::new(&server.url(), "TOKEN", "42").unwrap();
        match sender.send_message("hi", false).await {
            Err(NotifyError::Status { body, .. }) => assert_eq!(body, "chat not found"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
