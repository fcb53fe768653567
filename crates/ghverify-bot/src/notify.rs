//! Outbound chat notifications.

use anyhow::Result;
use async_trait::async_trait;

use crate::telegram::TelegramClient;

/// Sends a text message to a chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<()>;
}

#[async_trait]
impl Notifier for TelegramClient {
    async fn notify(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text, None).await
    }
}
