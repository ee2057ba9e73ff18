use anyhow::Result;
use teloxide::{Bot, types::Message};

use crate::{
    dependencies::BotDependencies,
    drafts::{dto::PostDraft, storage::DraftStorage},
    menus::{keyboards, render::send_screen},
};

/// Store `text` on the chat's active draft. `None` when nothing is being composed.
pub fn fill_active_draft(drafts: &DraftStorage, chat_id: i64, text: &str) -> Result<Option<PostDraft>> {
    let Some(mut draft) = drafts.active(chat_id)? else {
        return Ok(None);
    };
    draft.text = Some(text.trim().to_string());
    drafts.put(&draft)?;
    Ok(Some(draft))
}

/// Plain text in a private chat is the body of the post being composed.
pub async fn handle_message(bot: Bot, msg: Message, bot_deps: BotDependencies) -> Result<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let lang = bot_deps.preferences.for_user(msg.from.as_ref());

    let screen = match fill_active_draft(&bot_deps.drafts, msg.chat.id.0, text)? {
        Some(draft) => keyboards::platform_selection(lang, &draft),
        None => keyboards::notice(lang, lang.strings().no_active_draft),
    };
    send_screen(&bot, msg.chat.id, screen).await
}
