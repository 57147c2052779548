//! One-off helper: prints the chat ids the bot can currently see, for
//! filling in TELEGRAM_CHAT_ID. Send the bot a message first, then run this.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use teloxide::prelude::*;
use teloxide::types::{ChatKind, UpdateKind};

#[tokio::main]
async fn main() -> Result<()> {
    let token =
        std::env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN is not set")?;
    let bot = Bot::new(token);

    let me = bot.get_me().await?;
    println!(
        "Bot: @{} ({})",
        me.username(),
        me.user.first_name
    );

    let updates = bot.get_updates().await?;
    if updates.is_empty() {
        println!("No pending updates. Send the bot a message, then run this again.");
        println!("Bot link: https://t.me/{}", me.username());
        return Ok(());
    }

    let mut chat_ids = BTreeSet::new();
    for update in updates {
        if let UpdateKind::Message(msg) = update.kind {
            let kind = match msg.chat.kind {
                ChatKind::Private(_) => "private",
                ChatKind::Public(_) => "group/channel",
            };
            let name = msg
                .chat
                .title()
                .or_else(|| msg.chat.first_name())
                .unwrap_or("unknown");
            println!("  {} chat \"{}\": {}", kind, name, msg.chat.id.0);
            chat_ids.insert(msg.chat.id.0);
        }
    }

    if chat_ids.len() == 1 {
        println!(
            "\nSingle chat found. Use: TELEGRAM_CHAT_ID={}",
            chat_ids.iter().next().unwrap()
        );
    }
    Ok(())
}
