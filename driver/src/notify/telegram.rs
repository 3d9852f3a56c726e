use std::time::Duration;

use error_stack::Report;
use serde::Serialize;

use kernel::interface::notify::NotificationSink;
use kernel::KernelError;

use crate::error::ConvertError;
use crate::optional_env;

static TELEGRAM_API_URL: &str = "https://api.telegram.org";
static TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
static TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct TelegramTarget {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Posts messages to a Telegram chat through the bot API.
///
/// Without `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` the notifier only logs what it would
/// have sent. Every request gives up after the configured timeout.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    target: Option<TelegramTarget>,
}

impl TelegramNotifier {
    pub fn new() -> error_stack::Result<Self, KernelError> {
        match (optional_env(TELEGRAM_BOT_TOKEN), optional_env(TELEGRAM_CHAT_ID)) {
            (Some(token), Some(chat_id)) => Self::with_api(TELEGRAM_API_URL, token, chat_id),
            _ => {
                tracing::warn!("Telegram credentials are not set, notifications are disabled");
                Ok(Self::disabled())
            }
        }
    }

    pub fn with_api(
        api_url: impl AsRef<str>,
        token: impl AsRef<str>,
        chat_id: impl Into<String>,
    ) -> error_stack::Result<Self, KernelError> {
        Self::with_timeout(api_url, token, chat_id, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_url: impl AsRef<str>,
        token: impl AsRef<str>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> error_stack::Result<Self, KernelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .convert_error()?;
        let endpoint = format!(
            "{}/bot{}/sendMessage",
            api_url.as_ref().trim_end_matches('/'),
            token.as_ref()
        );
        Ok(Self {
            target: Some(TelegramTarget {
                client,
                endpoint,
                chat_id: chat_id.into(),
            }),
        })
    }

    pub fn disabled() -> Self {
        Self { target: None }
    }
}

#[async_trait::async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, message: &str) -> error_stack::Result<(), KernelError> {
        let Some(target) = &self.target else {
            tracing::info!(notification = message, "Skipped notification");
            return Ok(());
        };
        let payload = SendMessage {
            chat_id: &target.chat_id,
            text: message,
            parse_mode: "HTML",
        };
        let response = target
            .client
            .post(&target.endpoint)
            .json(&payload)
            .send()
            .await
            .convert_error()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Report::new(KernelError::Internal)
                .attach_printable(format!("Telegram responded {status}: {body}")));
        }
        tracing::debug!("Telegram notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use kernel::interface::notify::NotificationSink;
    use kernel::KernelError;

    use crate::notify::TelegramNotifier;

    #[tokio::test]
    async fn posts_message_to_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottoken/sendMessage"))
            .and(body_json(json!({
                "chat_id": "42",
                "text": "hello",
                "parse_mode": "HTML",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::with_api(server.uri(), "token", "42").unwrap();
        notifier.send("hello").await.unwrap();
    }

    #[tokio::test]
    async fn rejected_message_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("chat not found"))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::with_api(server.uri(), "token", "42").unwrap();
        let report = notifier.send("hello").await.unwrap_err();
        assert_eq!(report.current_context(), &KernelError::Internal);
    }

    #[tokio::test]
    async fn stalled_api_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let notifier =
            TelegramNotifier::with_timeout(server.uri(), "token", "42", Duration::from_millis(200))
                .unwrap();
        let report = notifier.send("hello").await.unwrap_err();
        assert_eq!(report.current_context(), &KernelError::Timeout);
    }

    #[tokio::test]
    async fn disabled_notifier_accepts_everything() {
        TelegramNotifier::disabled().send("hello").await.unwrap();
    }
}
