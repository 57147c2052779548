//! Telegram transport boundaries: outbound delivery and inbound command
//! consumption. The watcher only ever sees the two traits here, so tests can
//! swap in recorders.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::payloads::{GetUpdatesSetters, SendMessageSetters};
use teloxide::prelude::*;
use teloxide::types::{ParseMode, UpdateKind};

/// Outbound delivery to the configured chat. Failure is the caller's to log;
/// it is never fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// One inbound update as seen by the dispatcher. Non-text updates and
/// messages from other chats surface with empty text so their offset still
/// gets acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub id: i32,
    pub text: String,
}

/// Two-step consumption contract: `read_pending` never advances the offset,
/// so an unacknowledged batch is re-delivered on the next poll;
/// `acknowledge` advances it past `last_id` exactly once.
#[async_trait]
pub trait CommandSource: Send + Sync {
    async fn read_pending(&mut self) -> Result<Vec<Inbound>>;
    async fn acknowledge(&mut self, last_id: i32) -> Result<()>;
}

pub struct TelegramNotifier {
    bot: Bot,
    chat: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.chat, text)
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}

pub struct TelegramCommands {
    bot: Bot,
    chat: ChatId,
    offset: Option<i32>,
}

impl TelegramCommands {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat: ChatId(chat_id),
            offset: None,
        }
    }
}

#[async_trait]
impl CommandSource for TelegramCommands {
    async fn read_pending(&mut self) -> Result<Vec<Inbound>> {
        let mut request = self.bot.get_updates().timeout(0).limit(100);
        if let Some(offset) = self.offset {
            request = request.offset(offset);
        }
        let updates = request.await?;
        let batch = updates
            .into_iter()
            .map(|update| {
                let text = match &update.kind {
                    UpdateKind::Message(msg) if msg.chat.id == self.chat => {
                        msg.text().unwrap_or_default().to_string()
                    }
                    _ => String::new(),
                };
                Inbound {
                    id: update.id,
                    text,
                }
            })
            .collect();
        Ok(batch)
    }

    async fn acknowledge(&mut self, last_id: i32) -> Result<()> {
        // Telegram confirms consumption through the offset of the next
        // getUpdates call.
        self.offset = Some(last_id + 1);
        Ok(())
    }
}
