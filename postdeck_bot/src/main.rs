mod accounts;
mod bot;
mod callbacks;
mod commands;
mod config;
mod dependencies;
mod drafts;
mod i18n;
mod menus;
mod preferences;

use std::sync::Arc;

use postdeck_core::oauth_config::cache::{FileCacheStore, OAuthConfigCache};
use teloxide::{prelude::*, utils::command::BotCommands};

use crate::{
    bot::handler_tree::handler_tree, commands::Command, config::BotConfig,
    dependencies::BotDependencies, drafts::storage::DRAFT_MAX_AGE_SECS,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    log::info!("Starting postdeck_bot...");

    let config = BotConfig::from_env()?;
    let bot = Bot::new(config.teloxide_token.clone());
    let db = sled::open(&config.sled_url)?;

    let oauth_config = OAuthConfigCache::new(
        config.oauth_source(),
        Arc::new(FileCacheStore::new(config.oauth_cache_file.clone())),
    );
    let bot_deps = BotDependencies::new(
        db,
        config.twitter_accounts.clone(),
        oauth_config,
        config.admin_ids.clone(),
    )?;
    if bot_deps.admin_ids.is_empty() {
        log::warn!("ADMIN_IDS is empty, nobody can remove Twitter accounts from the bot");
    }
    match bot_deps
        .drafts
        .cleanup_expired(chrono::Utc::now().timestamp(), DRAFT_MAX_AGE_SECS)
    {
        Ok(0) => {}
        Ok(removed) => log::info!("Removed {} abandoned post drafts", removed),
        Err(e) => log::warn!("Failed to clean post drafts: {}", e),
    }
    log::info!(
        "Twitter credentials file: {}",
        bot_deps.credentials.path().display()
    );

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register bot commands: {}", e);
    }

    let db = bot_deps.db.clone();
    Dispatcher::builder(bot, handler_tree())
        .dependencies(dptree::deps![bot_deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    db.flush_async().await?;
    log::info!("postdeck_bot stopped");
    Ok(())
}
