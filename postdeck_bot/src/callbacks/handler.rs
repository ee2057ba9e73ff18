use anyhow::Result;
use chrono::{DateTime, Utc};
use postdeck_core::{
    accounts::dto::Platform,
    analytics::{DEFAULT_DAYS, summarize},
    helpers::{error::StoreError, format::format_timestamp},
    posts::dto::{Post, PostFilter, PostStatus},
};
use teloxide::{
    prelude::*,
    types::{CallbackQuery, MaybeInaccessibleMessage},
};

use super::action::{
    CallbackAction, ManageAction, MenuTarget, PostAction, QuickAction, ScheduleAction,
    SettingsAction,
};
use crate::{
    accounts::selector::{load_accounts, twitter_account_keyboard},
    dependencies::BotDependencies,
    drafts::dto::PostDraft,
    i18n::Language,
    menus::{
        keyboards::{self, Screen},
        render::{edit_screen, send_screen},
    },
};

/// Who pressed the button, and where.
#[derive(Debug, Clone)]
pub struct CallbackContext {
    pub chat_id: i64,
    pub user_id: u64,
    pub language_code: Option<String>,
    pub now: DateTime<Utc>,
}

impl CallbackContext {
    pub fn owner(&self) -> String {
        post_owner(self.user_id)
    }
}

/// What to show after a callback: an optional new screen and an optional toast on the button.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    pub screen: Option<Screen>,
    pub toast: Option<String>,
}

impl Reply {
    fn show(screen: Screen) -> Self {
        Self {
            screen: Some(screen),
            toast: None,
        }
    }

    fn toast(mut self, text: impl Into<String>) -> Self {
        self.toast = Some(text.into());
        self
    }
}

/// Posts created from Telegram belong to a per-user pseudo owner.
pub fn post_owner(user_id: u64) -> String {
    format!("telegram:{}", user_id)
}

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    bot_deps: BotDependencies,
) -> Result<()> {
    let user_id = query.from.id.0;
    let chat_id = match &query.message {
        Some(message) => message.chat().id,
        None => ChatId(user_id as i64),
    };
    let ctx = CallbackContext {
        chat_id: chat_id.0,
        user_id,
        language_code: query.from.language_code.clone(),
        now: Utc::now(),
    };

    let reply = reply_for(&bot_deps, &ctx, query.data.as_deref()).await;

    let mut answer = bot.answer_callback_query(query.id.clone());
    if let Some(text) = reply.toast {
        answer = answer.text(text);
    }
    if let Err(e) = answer.await {
        log::warn!("Failed to answer callback query: {}", e);
    }

    if let Some(screen) = reply.screen {
        let shown = match &query.message {
            Some(MaybeInaccessibleMessage::Regular(message)) => {
                edit_screen(&bot, message.chat.id, message.id, screen).await
            }
            _ => send_screen(&bot, chat_id, screen).await,
        };
        if let Err(e) = shown {
            log::error!("Failed to render menu for user {}: {}", user_id, e);
        }
    }
    Ok(())
}

/// Parse the button data and run its handler. Unknown data re-shows the main
/// menu; a failing handler becomes a generic error toast.
pub async fn reply_for(deps: &BotDependencies, ctx: &CallbackContext, data: Option<&str>) -> Reply {
    match data.and_then(CallbackAction::parse) {
        Some(action) => match resolve(deps, ctx, action).await {
            Ok(reply) => reply,
            Err(e) => {
                log::error!("Callback {:?} from user {} failed: {}", data, ctx.user_id, e);
                Reply::default().toast(language(deps, ctx).strings().generic_error)
            }
        },
        None => {
            log::warn!("Unrecognized callback data {:?} from user {}", data, ctx.user_id);
            Reply::show(keyboards::main_menu(language(deps, ctx)))
        }
    }
}

fn language(deps: &BotDependencies, ctx: &CallbackContext) -> Language {
    deps.preferences
        .language(ctx.user_id, ctx.language_code.as_deref())
}

/// Run the single handler for `action`.
pub async fn resolve(
    deps: &BotDependencies,
    ctx: &CallbackContext,
    action: CallbackAction,
) -> Result<Reply> {
    let lang = language(deps, ctx);
    let s = lang.strings();

    let reply = match action {
        CallbackAction::Menu(target) => Reply::show(menu(deps, ctx, lang, target)),
        CallbackAction::Language(chosen) => {
            deps.preferences.set_language(ctx.user_id, chosen)?;
            Reply::show(keyboards::settings_menu(chosen)).toast(chosen.strings().language_updated)
        }
        CallbackAction::Post(PostAction::New)
        | CallbackAction::Schedule(ScheduleAction::New)
        | CallbackAction::Quick(QuickAction::Post) => {
            deps.drafts.start(ctx.chat_id, ctx.now.timestamp())?;
            Reply::show(keyboards::compose_prompt(lang))
        }
        CallbackAction::Post(PostAction::List) => {
            let posts = deps.posts.list(&ctx.owner(), &PostFilter::default())?;
            Reply::show(keyboards::post_list(lang, posts, MenuTarget::Post))
        }
        CallbackAction::Schedule(ScheduleAction::List) => Reply::show(keyboards::post_list(
            lang,
            posts_with_status(deps, ctx, Some(PostStatus::Scheduled))?,
            MenuTarget::Schedule,
        )),
        CallbackAction::Status(status) => Reply::show(keyboards::post_list(
            lang,
            posts_with_status(deps, ctx, status)?,
            MenuTarget::Status,
        )),
        CallbackAction::SchedulePlatform { platform, ts } => {
            let Some(mut draft) = deps.drafts.get(ctx.chat_id, ts)? else {
                return Ok(expired(lang));
            };
            let selected = draft.toggle_platform(platform);
            deps.drafts.put(&draft)?;
            if platform == Platform::Twitter && selected {
                Reply::show(Screen {
                    text: s.choose_twitter_account.to_string(),
                    keyboard: twitter_account_keyboard(
                        &deps.credentials,
                        "schedule",
                        platform,
                        ts,
                        lang,
                    ),
                })
            } else {
                Reply::show(keyboards::platform_selection(lang, &draft))
            }
        }
        CallbackAction::TwitterAccount {
            account,
            platform,
            ts,
        } => {
            let Some(mut draft) = deps.drafts.get(ctx.chat_id, ts)? else {
                return Ok(expired(lang));
            };
            if !load_accounts(&deps.credentials)
                .iter()
                .any(|a| a.account_name == account)
            {
                return Ok(Reply::show(keyboards::platform_selection(lang, &draft))
                    .toast(s.account_not_found));
            }
            if !draft.has_platform(platform) {
                draft.toggle_platform(platform);
            }
            draft.twitter_account = Some(account);
            deps.drafts.put(&draft)?;
            Reply::show(keyboards::platform_selection(lang, &draft))
                .toast(s.twitter_account_selected)
        }
        CallbackAction::Schedule(ScheduleAction::Done { ts }) => {
            let Some(draft) = deps.drafts.get(ctx.chat_id, ts)? else {
                return Ok(expired(lang));
            };
            match incomplete(lang, &draft) {
                Some(reply) => reply,
                None => Reply::show(keyboards::time_selection(lang, ts)),
            }
        }
        CallbackAction::Time { choice, ts } => {
            let Some(mut draft) = deps.drafts.get(ctx.chat_id, ts)? else {
                return Ok(expired(lang));
            };
            if let Some(reply) = incomplete(lang, &draft) {
                return Ok(reply);
            }
            draft.scheduled_at = Some(choice.resolve(ctx.now).timestamp());
            deps.drafts.put(&draft)?;
            Reply::show(keyboards::confirmation(lang, &draft))
        }
        CallbackAction::Confirm { ts } => {
            let Some(draft) = deps.drafts.get(ctx.chat_id, ts)? else {
                return Ok(expired(lang));
            };
            if let Some(reply) = incomplete(lang, &draft) {
                return Ok(reply);
            }
            let Some(at) = draft.scheduled_time() else {
                return Ok(Reply::show(keyboards::time_selection(lang, ts)));
            };
            let post = persist(deps, ctx, &draft, at)?;
            Reply::show(keyboards::notice(
                lang,
                format!("{}\n⏰ {}", s.post_scheduled, scheduled_label(&post)),
            ))
        }
        CallbackAction::Live { ts } => {
            let Some(draft) = deps.drafts.get(ctx.chat_id, ts)? else {
                return Ok(expired(lang));
            };
            if let Some(reply) = incomplete(lang, &draft) {
                return Ok(reply);
            }
            persist(deps, ctx, &draft, ctx.now)?;
            Reply::show(keyboards::notice(lang, s.post_published_now))
        }
        CallbackAction::CancelPost { post_id } => {
            let toast = match deps.posts.cancel(&ctx.owner(), &post_id) {
                Ok(_) => s.post_cancelled.to_string(),
                Err(e @ (StoreError::NotFound(_) | StoreError::Invalid(_) | StoreError::Conflict(_))) => {
                    e.to_string()
                }
                Err(e) => return Err(e.into()),
            };
            Reply::show(keyboards::post_list(
                lang,
                posts_with_status(deps, ctx, Some(PostStatus::Scheduled))?,
                MenuTarget::Schedule,
            ))
            .toast(toast)
        }
        CallbackAction::Settings(SettingsAction::Language) => {
            Reply::show(keyboards::language_menu(lang))
        }
        CallbackAction::Settings(SettingsAction::Accounts)
        | CallbackAction::Manage(ManageAction::Accounts)
        | CallbackAction::Quick(QuickAction::Accounts) => {
            Reply::show(menu(deps, ctx, lang, MenuTarget::Accounts))
        }
        CallbackAction::Manage(ManageAction::Channels) => {
            let channels = deps.channels.list_for_user(&ctx.owner())?;
            Reply::show(keyboards::channels_screen(lang, &channels))
        }
        CallbackAction::Manage(ManageAction::Remove(name)) => {
            if !deps.is_admin(ctx.user_id) {
                log::warn!(
                    "User {} tried to remove Twitter account {} without admin rights",
                    ctx.user_id,
                    name
                );
                return Ok(Reply::show(menu(deps, ctx, lang, MenuTarget::Accounts)).toast(s.admin_only));
            }
            let removed = deps.credentials.remove(&name)?;
            if removed {
                log::info!("User {} removed Twitter account {}", ctx.user_id, name);
            }
            Reply::show(menu(deps, ctx, lang, MenuTarget::Accounts)).toast(if removed {
                s.account_removed
            } else {
                s.account_not_found
            })
        }
        CallbackAction::Quick(QuickAction::Stats) => {
            let posts = deps.posts.list(&ctx.owner(), &PostFilter::default())?;
            let report = summarize(&posts, &[], ctx.now, DEFAULT_DAYS);
            Reply::show(keyboards::stats_screen(lang, &report))
        }
        CallbackAction::Platform(platform) => {
            let oauth2 = deps.oauth_config.is_oauth2_available(platform.as_str()).await;
            let accounts = if platform == Platform::Twitter {
                load_accounts(&deps.credentials)
            } else {
                Vec::new()
            };
            Reply::show(keyboards::platform_screen(lang, platform, oauth2, &accounts))
        }
    };
    Ok(reply)
}

fn menu(deps: &BotDependencies, ctx: &CallbackContext, lang: Language, target: MenuTarget) -> Screen {
    match target {
        MenuTarget::Main => keyboards::main_menu(lang),
        MenuTarget::Post => keyboards::post_menu(lang),
        MenuTarget::Schedule => keyboards::schedule_menu(lang),
        MenuTarget::Settings => keyboards::settings_menu(lang),
        MenuTarget::Status => keyboards::status_menu(lang),
        MenuTarget::Accounts => keyboards::accounts_screen(
            lang,
            &load_accounts(&deps.credentials),
            deps.is_admin(ctx.user_id),
        ),
        MenuTarget::Help => keyboards::help(lang),
    }
}

fn posts_with_status(
    deps: &BotDependencies,
    ctx: &CallbackContext,
    status: Option<PostStatus>,
) -> Result<Vec<Post>> {
    let filter = PostFilter {
        status,
        ..Default::default()
    };
    Ok(deps.posts.list(&ctx.owner(), &filter)?)
}

fn expired(lang: Language) -> Reply {
    Reply::show(keyboards::notice(lang, lang.strings().draft_expired))
}

/// The draft cannot move on to scheduling without text and at least one platform.
fn incomplete(lang: Language, draft: &PostDraft) -> Option<Reply> {
    let s = lang.strings();
    if draft.text.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Some(Reply::show(keyboards::compose_prompt(lang)).toast(s.draft_text_missing));
    }
    if draft.platforms.is_empty() {
        return Some(
            Reply::show(keyboards::platform_selection(lang, draft)).toast(s.select_platform_first),
        );
    }
    None
}

fn persist(
    deps: &BotDependencies,
    ctx: &CallbackContext,
    draft: &PostDraft,
    at: DateTime<Utc>,
) -> Result<Post> {
    let post = deps.posts.create(&ctx.owner(), draft.to_new_post(at)?)?;
    if let Some(account) = &draft.twitter_account {
        if let Err(e) = deps.credentials.touch_last_used(account, ctx.now) {
            log::warn!("Could not update lastUsed for {}: {}", account, e);
        }
    }
    deps.drafts.delete(draft.chat_id, draft.created_at)?;
    log::info!(
        "Post {} scheduled by Telegram user {} on {:?}",
        post.id,
        ctx.user_id,
        post.platforms
    );
    Ok(post)
}

fn scheduled_label(post: &Post) -> String {
    post.scheduled_at
        .map(|at| format_timestamp(&at))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use postdeck_core::{
        oauth_config::{
            cache::{MemoryCacheStore, OAuthConfigCache},
            dto::default_platforms,
            source::StaticConfigSource,
        },
        telegram::dto::NewChannel,
        twitter::{credential_file::TwitterCredentialFile, dto::TwitterCredentialRecord},
    };
    use std::sync::Arc;
    use teloxide::types::InlineKeyboardButtonKind;

    struct Fixture {
        _dir: tempfile::TempDir,
        deps: BotDependencies,
        ctx: CallbackContext,
    }

    const ADMIN: u64 = 777;

    fn fixture() -> Fixture {
        fixture_with_credentials("twitter_accounts.json")
    }

    fn fixture_with_credentials(file_name: &str) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path().join("db")).unwrap();
        let credentials = TwitterCredentialFile::new(dir.path().join(file_name));
        let oauth_config = OAuthConfigCache::new(
            Arc::new(StaticConfigSource(default_platforms(true))),
            Arc::new(MemoryCacheStore::default()),
        );
        let deps = BotDependencies::new(db, credentials, oauth_config, vec![ADMIN]).unwrap();
        let ctx = CallbackContext {
            chat_id: 555,
            user_id: ADMIN,
            language_code: Some("en".to_string()),
            now: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        };
        Fixture {
            _dir: dir,
            deps,
            ctx,
        }
    }

    fn add_account(deps: &BotDependencies, name: &str) {
        deps.credentials
            .upsert(TwitterCredentialRecord {
                account_name: name.to_string(),
                username: format!("{}_x", name),
                display_name: String::new(),
                access_token: "token".to_string(),
                access_secret: "secret".to_string(),
                created_at: Utc::now(),
                last_used: None,
            })
            .unwrap();
    }

    async fn press(f: &Fixture, data: &str) -> Reply {
        let action = CallbackAction::parse(data).unwrap();
        resolve(&f.deps, &f.ctx, action).await.unwrap()
    }

    /// Start a draft and fill in its text the way the message handler does.
    async fn draft_with_text(f: &Fixture, text: &str) -> i64 {
        press(f, "post_new").await;
        let mut draft = f.deps.drafts.active(f.ctx.chat_id).unwrap().unwrap();
        draft.text = Some(text.to_string());
        f.deps.drafts.put(&draft).unwrap();
        draft.created_at
    }

    fn data_of(reply: &Reply) -> Vec<String> {
        reply
            .screen
            .as_ref()
            .unwrap()
            .keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_compose_and_schedule_flow() {
        let f = fixture();
        let ts = draft_with_text(&f, "Launch day").await;

        press(&f, &format!("schedule_platform_linkedin_{}", ts)).await;
        press(&f, &format!("schedule_platform_telegram_{}", ts)).await;
        let time = press(&f, &format!("schedule_done_{}", ts)).await;
        assert!(data_of(&time).contains(&format!("time_1h_{}", ts)));

        let confirm = press(&f, &format!("time_1h_{}", ts)).await;
        assert!(data_of(&confirm).contains(&format!("confirm_{}", ts)));

        let done = press(&f, &format!("confirm_{}", ts)).await;
        assert!(done.screen.unwrap().text.contains("Post scheduled"));

        let posts = f
            .deps
            .posts
            .list(&f.ctx.owner(), &PostFilter::default())
            .unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].status, PostStatus::Scheduled);
        assert_eq!(posts[0].scheduled_at, Some(f.ctx.now + Duration::hours(1)));
        assert_eq!(posts[0].platforms, vec![Platform::Linkedin, Platform::Telegram]);
        assert!(f.deps.drafts.get(f.ctx.chat_id, ts).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_twitter_selection_shows_accounts_and_binds_one() {
        let f = fixture();
        add_account(&f.deps, "brand_news");
        let ts = draft_with_text(&f, "hello").await;

        let selector = press(&f, &format!("schedule_platform_twitter_{}", ts)).await;
        assert_eq!(
            data_of(&selector),
            vec![format!("schedule_twitter_account_brand_news_twitter_{}", ts)]
        );

        let bound = press(&f, &data_of(&selector)[0]).await;
        assert_eq!(bound.toast.as_deref(), Some("Twitter account selected"));
        let draft = f.deps.drafts.get(f.ctx.chat_id, ts).unwrap().unwrap();
        assert_eq!(draft.twitter_account.as_deref(), Some("brand_news"));

        press(&f, &format!("live_{}", ts)).await;
        let record = f.deps.credentials.get("brand_news").unwrap().unwrap();
        assert_eq!(record.last_used, Some(f.ctx.now));
    }

    #[tokio::test]
    async fn test_twitter_without_accounts_offers_accounts_menu() {
        let f = fixture();
        let ts = draft_with_text(&f, "hello").await;
        let selector = press(&f, &format!("schedule_platform_twitter_{}", ts)).await;
        assert_eq!(data_of(&selector), vec!["menu_accounts".to_string()]);
    }

    #[tokio::test]
    async fn test_live_publishes_at_current_time() {
        let f = fixture();
        let ts = draft_with_text(&f, "now!").await;
        press(&f, &format!("schedule_platform_facebook_{}", ts)).await;
        let reply = press(&f, &format!("live_{}", ts)).await;
        assert!(reply.screen.unwrap().text.contains("publishing now"));

        let posts = f
            .deps
            .posts
            .list(&f.ctx.owner(), &PostFilter::default())
            .unwrap();
        assert_eq!(posts[0].scheduled_at, Some(f.ctx.now));
    }

    #[tokio::test]
    async fn test_incomplete_drafts_are_held_back() {
        let f = fixture();
        press(&f, "post_new").await;
        let ts = f.deps.drafts.active(f.ctx.chat_id).unwrap().unwrap().created_at;

        let no_text = press(&f, &format!("schedule_done_{}", ts)).await;
        assert_eq!(no_text.toast.as_deref(), Some("Send the post text first."));

        let ts = draft_with_text(&f, "text").await;
        let no_platform = press(&f, &format!("confirm_{}", ts)).await;
        assert_eq!(
            no_platform.toast.as_deref(),
            Some("Select at least one platform.")
        );
        assert!(
            f.deps
                .posts
                .list(&f.ctx.owner(), &PostFilter::default())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_unknown_draft_is_reported_expired() {
        let f = fixture();
        let reply = press(&f, "confirm_123").await;
        assert!(reply.screen.unwrap().text.contains("no longer available"));
    }

    #[tokio::test]
    async fn test_cancel_post_only_for_owner() {
        let f = fixture();
        let ts = draft_with_text(&f, "cancel me").await;
        press(&f, &format!("schedule_platform_telegram_{}", ts)).await;
        press(&f, &format!("time_3h_{}", ts)).await;
        press(&f, &format!("confirm_{}", ts)).await;
        let post_id = f
            .deps
            .posts
            .list(&f.ctx.owner(), &PostFilter::default())
            .unwrap()[0]
            .id
            .clone();

        let stranger = CallbackContext {
            user_id: 1,
            ..f.ctx.clone()
        };
        let denied = resolve(
            &f.deps,
            &stranger,
            CallbackAction::CancelPost {
                post_id: post_id.clone(),
            },
        )
        .await
        .unwrap();
        assert!(denied.toast.unwrap().contains("not found"));

        let cancelled = press(&f, &format!("cancel_post_{}", post_id)).await;
        assert_eq!(cancelled.toast.as_deref(), Some("Post cancelled"));
        let post = f.deps.posts.get(&post_id).unwrap().unwrap();
        assert_eq!(post.status, PostStatus::Cancelled);

        let listed = press(&f, "status_cancelled").await;
        assert!(listed.screen.unwrap().text.contains("cancel me"));
    }

    #[tokio::test]
    async fn test_language_change_rerenders_settings() {
        let f = fixture();
        let reply = press(&f, "lang_es").await;
        assert_eq!(reply.toast.as_deref(), Some("Idioma actualizado"));
        assert!(reply.screen.unwrap().text.contains("Ajustes"));

        let menu = press(&f, "menu_main").await;
        assert!(menu.screen.unwrap().text.contains("Redacta"));
    }

    #[tokio::test]
    async fn test_manage_remove_account() {
        let f = fixture();
        add_account(&f.deps, "old_brand");

        let accounts = press(&f, "manage_accounts").await;
        assert!(data_of(&accounts).contains(&"manage_remove_old_brand".to_string()));

        let removed = press(&f, "manage_remove_old_brand").await;
        assert_eq!(removed.toast.as_deref(), Some("Account removed"));
        assert!(f.deps.credentials.get("old_brand").unwrap().is_none());

        let again = press(&f, "manage_remove_old_brand").await;
        assert_eq!(again.toast.as_deref(), Some("Account not found"));
    }

    #[tokio::test]
    async fn test_platform_screen_reports_oauth_availability() {
        let f = fixture();
        let twitter = press(&f, "platform_twitter").await;
        assert!(twitter.screen.unwrap().text.contains("OAuth2 connection available"));
        let linkedin = press(&f, "platform_linkedin").await;
        assert!(linkedin.screen.unwrap().text.contains("Manual credentials only"));
    }

    #[tokio::test]
    async fn test_quick_stats_and_channels() {
        let f = fixture();
        let ts = draft_with_text(&f, "stat").await;
        press(&f, &format!("schedule_platform_telegram_{}", ts)).await;
        press(&f, &format!("live_{}", ts)).await;

        let stats = press(&f, "quick_stats").await;
        assert!(stats.screen.unwrap().text.contains("Total posts: 1"));

        f.deps
            .channels
            .add(
                &f.ctx.owner(),
                NewChannel {
                    name: "News".to_string(),
                    username: "news".to_string(),
                },
                Some(12),
            )
            .unwrap();
        let channels = press(&f, "manage_channels").await;
        assert!(channels.screen.unwrap().text.contains("News (@news) · 👥 12"));
    }

    #[tokio::test]
    async fn test_non_admin_cannot_remove_accounts() {
        let f = fixture();
        add_account(&f.deps, "old_brand");
        let before = std::fs::read(f.deps.credentials.path()).unwrap();

        let member = CallbackContext {
            user_id: 1,
            ..f.ctx.clone()
        };
        let accounts = reply_for(&f.deps, &member, Some("manage_accounts")).await;
        assert!(!data_of(&accounts).iter().any(|d| d.starts_with("manage_remove_")));

        let refused = reply_for(&f.deps, &member, Some("manage_remove_old_brand")).await;
        assert_eq!(
            refused.toast.as_deref(),
            Some("⛔ Only bot administrators can remove accounts")
        );
        assert_eq!(std::fs::read(f.deps.credentials.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_data_shows_main_menu() {
        let f = fixture();
        for data in [Some("bogus_data"), Some(""), None] {
            let reply = reply_for(&f.deps, &f.ctx, data).await;
            assert!(reply.toast.is_none());
            let screen = reply.screen.unwrap();
            assert_eq!(screen.text, keyboards::main_menu(Language::En).text);
        }
    }

    #[tokio::test]
    async fn test_failing_handler_becomes_error_toast() {
        // A directory where the credentials file should be makes every write fail.
        let f = fixture_with_credentials("credentials_dir");
        std::fs::create_dir(f.deps.credentials.path()).unwrap();

        let reply = reply_for(&f.deps, &f.ctx, Some("manage_remove_old_brand")).await;
        assert!(reply.screen.is_none());
        assert_eq!(
            reply.toast.as_deref(),
            Some("❌ Something went wrong, please try again.")
        );
    }
}
