//! Callback data grammar.
//!
//! Every inline button carries its full menu position in its data string, so the
//! bot keeps no per-chat menu state. Data is parsed once into [`CallbackAction`]
//! and dispatched with a single `match`.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use postdeck_core::{accounts::dto::Platform, posts::dto::PostStatus};

use crate::i18n::Language;

/// Telegram rejects callback data longer than this.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Main,
    Post,
    Schedule,
    Settings,
    Status,
    Accounts,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    New,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    New,
    List,
    Done { ts: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Language,
    Accounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManageAction {
    Accounts,
    Channels,
    Remove(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Post,
    Stats,
    Accounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeChoice {
    Now,
    InOneHour,
    InThreeHours,
    Tomorrow,
}

impl TimeChoice {
    fn as_str(&self) -> &'static str {
        match self {
            TimeChoice::Now => "now",
            TimeChoice::InOneHour => "1h",
            TimeChoice::InThreeHours => "3h",
            TimeChoice::Tomorrow => "tomorrow",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "now" => Some(TimeChoice::Now),
            "1h" => Some(TimeChoice::InOneHour),
            "3h" => Some(TimeChoice::InThreeHours),
            "tomorrow" => Some(TimeChoice::Tomorrow),
            _ => None,
        }
    }

    /// "Tomorrow" is 09:00 UTC on the next calendar day.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeChoice::Now => now,
            TimeChoice::InOneHour => now + Duration::hours(1),
            TimeChoice::InThreeHours => now + Duration::hours(3),
            TimeChoice::Tomorrow => (now.date_naive() + Duration::days(1))
                .and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default())
                .and_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Menu(MenuTarget),
    Language(Language),
    Post(PostAction),
    SchedulePlatform { platform: Platform, ts: i64 },
    TwitterAccount { account: String, platform: Platform, ts: i64 },
    Schedule(ScheduleAction),
    Settings(SettingsAction),
    Manage(ManageAction),
    Live { ts: i64 },
    Quick(QuickAction),
    Platform(Platform),
    Time { choice: TimeChoice, ts: i64 },
    Confirm { ts: i64 },
    CancelPost { post_id: String },
    Status(Option<PostStatus>),
}

type RestParser = fn(&str) -> Option<CallbackAction>;

/// Checked in order. A prefix must come before any shorter prefix it starts with,
/// otherwise `schedule_platform_...` would be routed to `schedule_`.
pub const PREFIXES: [(&str, RestParser); 15] = [
    ("schedule_twitter_account_", parse_twitter_account),
    ("schedule_platform_", parse_schedule_platform),
    ("schedule_", parse_schedule),
    ("cancel_post_", parse_cancel_post),
    ("menu_", parse_menu),
    ("lang_", parse_language),
    ("post_", parse_post),
    ("settings_", parse_settings),
    ("manage_", parse_manage),
    ("live_", parse_live),
    ("quick_", parse_quick),
    ("platform_", parse_platform),
    ("time_", parse_time),
    ("confirm_", parse_confirm),
    ("status_", parse_status),
];

impl CallbackAction {
    /// `None` for unknown prefixes and for known prefixes with a malformed tail.
    /// A matched prefix never falls through to another entry.
    pub fn parse(data: &str) -> Option<Self> {
        let (prefix, parser) = PREFIXES
            .iter()
            .find(|(prefix, _)| data.starts_with(prefix))?;
        parser(&data[prefix.len()..])
    }

    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::Menu(target) => format!(
                "menu_{}",
                match target {
                    MenuTarget::Main => "main",
                    MenuTarget::Post => "post",
                    MenuTarget::Schedule => "schedule",
                    MenuTarget::Settings => "settings",
                    MenuTarget::Status => "status",
                    MenuTarget::Accounts => "accounts",
                    MenuTarget::Help => "help",
                }
            ),
            CallbackAction::Language(lang) => format!("lang_{}", lang),
            CallbackAction::Post(PostAction::New) => "post_new".to_string(),
            CallbackAction::Post(PostAction::List) => "post_list".to_string(),
            CallbackAction::SchedulePlatform { platform, ts } => {
                format!("schedule_platform_{}_{}", platform, ts)
            }
            CallbackAction::TwitterAccount {
                account,
                platform,
                ts,
            } => format!("schedule_twitter_account_{}_{}_{}", account, platform, ts),
            CallbackAction::Schedule(ScheduleAction::New) => "schedule_new".to_string(),
            CallbackAction::Schedule(ScheduleAction::List) => "schedule_list".to_string(),
            CallbackAction::Schedule(ScheduleAction::Done { ts }) => format!("schedule_done_{}", ts),
            CallbackAction::Settings(SettingsAction::Language) => "settings_language".to_string(),
            CallbackAction::Settings(SettingsAction::Accounts) => "settings_accounts".to_string(),
            CallbackAction::Manage(ManageAction::Accounts) => "manage_accounts".to_string(),
            CallbackAction::Manage(ManageAction::Channels) => "manage_channels".to_string(),
            CallbackAction::Manage(ManageAction::Remove(name)) => format!("manage_remove_{}", name),
            CallbackAction::Live { ts } => format!("live_{}", ts),
            CallbackAction::Quick(QuickAction::Post) => "quick_post".to_string(),
            CallbackAction::Quick(QuickAction::Stats) => "quick_stats".to_string(),
            CallbackAction::Quick(QuickAction::Accounts) => "quick_accounts".to_string(),
            CallbackAction::Platform(platform) => format!("platform_{}", platform),
            CallbackAction::Time { choice, ts } => format!("time_{}_{}", choice.as_str(), ts),
            CallbackAction::Confirm { ts } => format!("confirm_{}", ts),
            CallbackAction::CancelPost { post_id } => format!("cancel_post_{}", post_id),
            CallbackAction::Status(None) => "status_all".to_string(),
            CallbackAction::Status(Some(status)) => format!("status_{}", status),
        }
    }
}

fn parse_ts(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

fn parse_menu(rest: &str) -> Option<CallbackAction> {
    let target = match rest {
        "main" => MenuTarget::Main,
        "post" => MenuTarget::Post,
        "schedule" => MenuTarget::Schedule,
        "settings" => MenuTarget::Settings,
        "status" => MenuTarget::Status,
        "accounts" => MenuTarget::Accounts,
        "help" => MenuTarget::Help,
        _ => return None,
    };
    Some(CallbackAction::Menu(target))
}

fn parse_language(rest: &str) -> Option<CallbackAction> {
    rest.parse().ok().map(CallbackAction::Language)
}

fn parse_post(rest: &str) -> Option<CallbackAction> {
    match rest {
        "new" => Some(CallbackAction::Post(PostAction::New)),
        "list" => Some(CallbackAction::Post(PostAction::List)),
        _ => None,
    }
}

fn parse_schedule_platform(rest: &str) -> Option<CallbackAction> {
    let (platform, ts) = rest.rsplit_once('_')?;
    Some(CallbackAction::SchedulePlatform {
        platform: platform.parse().ok()?,
        ts: parse_ts(ts)?,
    })
}

/// `{account}_{platform}_{ts}`; the account name may itself contain `_`, so split from the right.
fn parse_twitter_account(rest: &str) -> Option<CallbackAction> {
    let mut parts = rest.rsplitn(3, '_');
    let ts = parse_ts(parts.next()?)?;
    let platform = parts.next()?.parse().ok()?;
    let account = parts.next().filter(|a| !a.is_empty())?;
    Some(CallbackAction::TwitterAccount {
        account: account.to_string(),
        platform,
        ts,
    })
}

fn parse_schedule(rest: &str) -> Option<CallbackAction> {
    let action = match rest {
        "new" => ScheduleAction::New,
        "list" => ScheduleAction::List,
        other => ScheduleAction::Done {
            ts: parse_ts(other.strip_prefix("done_")?)?,
        },
    };
    Some(CallbackAction::Schedule(action))
}

fn parse_settings(rest: &str) -> Option<CallbackAction> {
    match rest {
        "language" => Some(CallbackAction::Settings(SettingsAction::Language)),
        "accounts" => Some(CallbackAction::Settings(SettingsAction::Accounts)),
        _ => None,
    }
}

fn parse_manage(rest: &str) -> Option<CallbackAction> {
    let action = match rest {
        "accounts" => ManageAction::Accounts,
        "channels" => ManageAction::Channels,
        other => {
            let name = other.strip_prefix("remove_").filter(|n| !n.is_empty())?;
            ManageAction::Remove(name.to_string())
        }
    };
    Some(CallbackAction::Manage(action))
}

fn parse_live(rest: &str) -> Option<CallbackAction> {
    Some(CallbackAction::Live { ts: parse_ts(rest)? })
}

fn parse_quick(rest: &str) -> Option<CallbackAction> {
    let action = match rest {
        "post" => QuickAction::Post,
        "stats" => QuickAction::Stats,
        "accounts" => QuickAction::Accounts,
        _ => return None,
    };
    Some(CallbackAction::Quick(action))
}

fn parse_platform(rest: &str) -> Option<CallbackAction> {
    rest.parse().ok().map(CallbackAction::Platform)
}

fn parse_time(rest: &str) -> Option<CallbackAction> {
    let (choice, ts) = rest.split_once('_')?;
    Some(CallbackAction::Time {
        choice: TimeChoice::parse(choice)?,
        ts: parse_ts(ts)?,
    })
}

fn parse_confirm(rest: &str) -> Option<CallbackAction> {
    Some(CallbackAction::Confirm { ts: parse_ts(rest)? })
}

fn parse_cancel_post(rest: &str) -> Option<CallbackAction> {
    if rest.is_empty() {
        return None;
    }
    Some(CallbackAction::CancelPost {
        post_id: rest.to_string(),
    })
}

fn parse_status(rest: &str) -> Option<CallbackAction> {
    if rest == "all" {
        return Some(CallbackAction::Status(None));
    }
    rest.parse().ok().map(|s| CallbackAction::Status(Some(s)))
}
