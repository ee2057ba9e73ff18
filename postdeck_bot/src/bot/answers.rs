use anyhow::Result;
use chrono::Utc;
use teloxide::{Bot, types::Message};

use crate::{
    accounts::selector::load_accounts,
    commands::Command,
    dependencies::BotDependencies,
    menus::{keyboards, render::send_screen},
};

pub async fn answers(
    bot: Bot,
    msg: Message,
    cmd: Command,
    bot_deps: BotDependencies,
) -> Result<()> {
    let lang = bot_deps.preferences.for_user(msg.from.as_ref());
    let screen = match cmd {
        Command::Start | Command::Menu => keyboards::main_menu(lang),
        Command::New => {
            bot_deps.drafts.start(msg.chat.id.0, Utc::now().timestamp())?;
            keyboards::compose_prompt(lang)
        }
        Command::Status => keyboards::status_menu(lang),
        Command::Accounts => {
            let can_remove = msg.from.as_ref().is_some_and(|u| bot_deps.is_admin(u.id.0));
            keyboards::accounts_screen(lang, &load_accounts(&bot_deps.credentials), can_remove)
        }
        Command::Language => keyboards::language_menu(lang),
        Command::Help => keyboards::help(lang),
    };
    send_screen(&bot, msg.chat.id, screen).await
}
