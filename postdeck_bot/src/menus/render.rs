use anyhow::Result;
use teloxide::{
    prelude::*,
    types::{MessageId, ParseMode},
};

use super::keyboards::Screen;

pub async fn send_screen(bot: &Bot, chat_id: ChatId, screen: Screen) -> Result<()> {
    bot.send_message(chat_id, screen.text)
        .parse_mode(ParseMode::Html)
        .reply_markup(screen.keyboard)
        .await?;
    Ok(())
}

/// Replace a menu message in place. Telegram refuses edits that change nothing; those are ignored.
pub async fn edit_screen(bot: &Bot, chat_id: ChatId, message_id: MessageId, screen: Screen) -> Result<()> {
    if let Err(e) = bot
        .edit_message_text(chat_id, message_id, screen.text)
        .parse_mode(ParseMode::Html)
        .reply_markup(screen.keyboard)
        .await
    {
        if e.to_string().contains("message is not modified") {
            log::debug!("Menu {} unchanged", message_id.0);
        } else {
            return Err(e.into());
        }
    }
    Ok(())
}
