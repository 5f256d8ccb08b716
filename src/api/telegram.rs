use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::types::{ListingItem, SendMessage, TelegramResponse};
use crate::core::config::TelegramConfig;

/// Delivery of one listing to a human.
///
/// Failures are reported as `false` and never propagate: a lost message must
/// not stop the poll loop.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, item: &ListingItem) -> bool;
}

#[derive(Debug, Error)]
pub enum NotifyError {
    // reqwest errors carry the request url, which embeds the bot token.
    #[error("network error: {0}")]
    Network(String),
    #[error("telegram rejected message ({status}): {description}")]
    Rejected { status: StatusCode, description: String },
}

impl From<reqwest::Error> for NotifyError {
    fn from(e: reqwest::Error) -> Self {
        NotifyError::Network(e.without_url().to_string())
    }
}

pub struct TelegramNotifier {
    client: Client,
    send_url: String,
    user_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            client,
            send_url: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            user_id: config.user_id.clone(),
        })
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let body = SendMessage {
            chat_id: &self.user_id,
            text,
        };

        let response = self.client.post(&self.send_url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<TelegramResponse>(&raw)
                .ok()
                .and_then(|r| r.description)
                .unwrap_or(raw);
            return Err(NotifyError::Rejected {
                status,
                description,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, item: &ListingItem) -> bool {
        let text = format_message(item);

        match self.send(&text).await {
            Ok(()) => {
                tracing::info!("Successfully posted message to user {}", self.user_id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to post {} to Telegram: {}", item.url(), e);
                false
            }
        }
    }
}

pub fn format_message(item: &ListingItem) -> String {
    format!(
        "New item: {}\nPrice: {}\nTime: {}\nURL: {}\n{}",
        item.title(),
        item.price(),
        item.posted_at().format("%Y-%m-%d %H:%M:%S"),
        item.url(),
        item.image_url()
    )
}
