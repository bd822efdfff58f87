use std::future::Future;

use reqwest::Client;

/// Human-readable event sink. Fire-and-forget: implementations log their
/// own failures and never propagate them into order bookkeeping.
pub trait Notifier: Send + Sync {
    fn post(&self, text: &str) -> impl Future<Output = ()> + Send;
}

/// Telegram bot sink for open/close announcements.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self::with_base_url("https://api.telegram.org", bot_token, chat_id)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn post(&self, text: &str) {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.bot_token);
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        match self.client.post(&url).json(&body).send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!("telegram rejected notification: {}", response.status());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("failed to send telegram notification: {}", e);
            }
        }
    }
}
