use postdeck_core::{
    accounts::dto::Platform,
    analytics::AnalyticsReport,
    helpers::format::format_timestamp,
    posts::dto::Post,
    telegram::dto::TelegramChannel,
    twitter::dto::TwitterCredentialRecord,
};
use teloxide::{
    types::{InlineKeyboardButton, InlineKeyboardMarkup},
    utils::html,
};

use crate::{
    accounts::selector::account_label,
    callbacks::action::{
        CallbackAction, MAX_CALLBACK_DATA_LEN, ManageAction, MenuTarget, PostAction, QuickAction,
        ScheduleAction, SettingsAction, TimeChoice,
    },
    drafts::dto::PostDraft,
    i18n::Language,
};

const MAX_LISTED_POSTS: usize = 10;
const PREVIEW_CHARS: usize = 60;

/// Text plus inline keyboard; sent with HTML parse mode.
#[derive(Debug, Clone)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboardMarkup,
}

impl Screen {
    pub fn new(text: impl Into<String>, rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self {
            text: text.into(),
            keyboard: InlineKeyboardMarkup::new(rows),
        }
    }
}

fn button(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text.into(), action.to_data())
}

fn back(lang: Language, target: MenuTarget) -> Vec<InlineKeyboardButton> {
    vec![button(lang.strings().btn_back, CallbackAction::Menu(target))]
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push('…');
    }
    html::escape(&out)
}

pub fn main_menu(lang: Language) -> Screen {
    let s = lang.strings();
    Screen::new(
        s.main_menu,
        vec![
            vec![
                button(s.btn_new_post, CallbackAction::Quick(QuickAction::Post)),
                button(s.btn_schedule, CallbackAction::Menu(MenuTarget::Schedule)),
            ],
            vec![
                button(s.btn_my_posts, CallbackAction::Menu(MenuTarget::Post)),
                button(s.btn_status, CallbackAction::Menu(MenuTarget::Status)),
            ],
            vec![
                button(s.btn_accounts, CallbackAction::Quick(QuickAction::Accounts)),
                button(s.btn_stats, CallbackAction::Quick(QuickAction::Stats)),
            ],
            vec![
                button(s.btn_settings, CallbackAction::Menu(MenuTarget::Settings)),
                button(s.btn_help, CallbackAction::Menu(MenuTarget::Help)),
            ],
        ],
    )
}

pub fn post_menu(lang: Language) -> Screen {
    let s = lang.strings();
    Screen::new(
        s.post_menu,
        vec![
            vec![button(s.btn_new_post, CallbackAction::Post(PostAction::New))],
            vec![button(s.btn_my_posts, CallbackAction::Post(PostAction::List))],
            back(lang, MenuTarget::Main),
        ],
    )
}

pub fn schedule_menu(lang: Language) -> Screen {
    let s = lang.strings();
    Screen::new(
        s.schedule_menu,
        vec![
            vec![button(s.btn_new_post, CallbackAction::Schedule(ScheduleAction::New))],
            vec![button(
                s.btn_scheduled_posts,
                CallbackAction::Schedule(ScheduleAction::List),
            )],
            back(lang, MenuTarget::Main),
        ],
    )
}

pub fn settings_menu(lang: Language) -> Screen {
    let s = lang.strings();
    Screen::new(
        format!("{}\n\n{}: {}", s.settings_menu, s.btn_language, s.language_name),
        vec![
            vec![button(s.btn_language, CallbackAction::Settings(SettingsAction::Language))],
            vec![button(s.btn_accounts, CallbackAction::Settings(SettingsAction::Accounts))],
            back(lang, MenuTarget::Main),
        ],
    )
}

pub fn language_menu(lang: Language) -> Screen {
    let s = lang.strings();
    let choices = Language::ALL
        .iter()
        .map(|l| button(l.strings().language_name, CallbackAction::Language(*l)))
        .collect();
    Screen::new(s.btn_language, vec![choices, back(lang, MenuTarget::Settings)])
}

pub fn status_menu(lang: Language) -> Screen {
    let s = lang.strings();
    let mut rows = vec![vec![button(s.btn_all, CallbackAction::Status(None))]];
    for chunk in postdeck_core::posts::dto::PostStatus::ALL.chunks(2) {
        rows.push(
            chunk
                .iter()
                .map(|status| button(lang.status_label(*status), CallbackAction::Status(Some(*status))))
                .collect(),
        );
    }
    rows.push(back(lang, MenuTarget::Main));
    Screen::new(s.status_menu, rows)
}

pub fn help(lang: Language) -> Screen {
    Screen::new(lang.strings().help, vec![back(lang, MenuTarget::Main)])
}

/// A plain message with a way back to the main menu.
pub fn notice(lang: Language, text: impl Into<String>) -> Screen {
    Screen::new(text, vec![back(lang, MenuTarget::Main)])
}

pub fn compose_prompt(lang: Language) -> Screen {
    let s = lang.strings();
    Screen::new(
        s.ask_post_text,
        vec![vec![button(s.btn_cancel, CallbackAction::Menu(MenuTarget::Main))]],
    )
}

pub fn platform_selection(lang: Language, draft: &PostDraft) -> Screen {
    let s = lang.strings();
    let ts = draft.created_at;
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Platform::ALL
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|platform| {
                    let mark = if draft.has_platform(*platform) { "✅" } else { "▫️" };
                    button(
                        format!("{} {} {}", mark, platform.icon(), platform.display_name()),
                        CallbackAction::SchedulePlatform {
                            platform: *platform,
                            ts,
                        },
                    )
                })
                .collect()
        })
        .collect();
    rows.push(vec![
        button(s.btn_done, CallbackAction::Schedule(ScheduleAction::Done { ts })),
        button(s.btn_cancel, CallbackAction::Menu(MenuTarget::Main)),
    ]);

    let mut text = format!(
        "{}\n\n<i>{}</i>",
        s.choose_platforms,
        preview(draft.text.as_deref().unwrap_or_default())
    );
    if let Some(account) = &draft.twitter_account {
        text.push_str(&format!("\n\n🐦 {}", html::escape(account)));
    }
    Screen::new(text, rows)
}

pub fn time_selection(lang: Language, ts: i64) -> Screen {
    let s = lang.strings();
    let time = |label: &str, choice| button(label, CallbackAction::Time { choice, ts });
    Screen::new(
        s.choose_time,
        vec![
            vec![
                time(s.btn_time_now, TimeChoice::Now),
                time(s.btn_time_1h, TimeChoice::InOneHour),
            ],
            vec![
                time(s.btn_time_3h, TimeChoice::InThreeHours),
                time(s.btn_time_tomorrow, TimeChoice::Tomorrow),
            ],
            vec![button(s.btn_publish_now, CallbackAction::Live { ts })],
            vec![button(s.btn_cancel, CallbackAction::Menu(MenuTarget::Main))],
        ],
    )
}

pub fn confirmation(lang: Language, draft: &PostDraft) -> Screen {
    let s = lang.strings();
    let ts = draft.created_at;
    let platforms = draft
        .selected_platforms()
        .iter()
        .map(|p| format!("{} {}", p.icon(), p.display_name()))
        .collect::<Vec<_>>()
        .join(", ");
    let when = draft
        .scheduled_time()
        .map(|at| format_timestamp(&at))
        .unwrap_or_default();
    let mut text = format!(
        "{}\n\n{}\n\n📡 {}\n⏰ {}",
        s.confirm_post,
        html::escape(draft.text.as_deref().unwrap_or_default()),
        platforms,
        when
    );
    if let Some(account) = &draft.twitter_account {
        text.push_str(&format!("\n🐦 {}", html::escape(account)));
    }
    Screen::new(
        text,
        vec![
            vec![button(s.btn_confirm, CallbackAction::Confirm { ts })],
            vec![button(s.btn_publish_now, CallbackAction::Live { ts })],
            vec![button(s.btn_cancel, CallbackAction::Menu(MenuTarget::Main))],
        ],
    )
}

/// Newest posts first; editable ones get a cancel button.
pub fn post_list(lang: Language, mut posts: Vec<Post>, back_to: MenuTarget) -> Screen {
    let s = lang.strings();
    if posts.is_empty() {
        return Screen::new(
            format!("{}\n\n{}", s.posts_title, s.no_posts),
            vec![back(lang, back_to)],
        );
    }

    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut lines = vec![s.posts_title.to_string()];
    let mut rows = Vec::new();
    for (i, post) in posts.iter().take(MAX_LISTED_POSTS).enumerate() {
        let icons: String = post.platforms.iter().map(|p| p.icon()).collect();
        let when = post
            .scheduled_at
            .map(|at| format!(" · {}", format_timestamp(&at)))
            .unwrap_or_default();
        lines.push(format!(
            "\n{}. {}{} {}\n{}",
            i + 1,
            lang.status_label(post.status),
            when,
            icons,
            preview(&post.content.text)
        ));
        if post.status.is_user_editable() {
            rows.push(vec![button(
                format!("{} #{}", s.btn_cancel_post, i + 1),
                CallbackAction::CancelPost {
                    post_id: post.id.clone(),
                },
            )]);
        }
    }
    rows.push(back(lang, back_to));
    Screen::new(lines.join("\n"), rows)
}

/// Remove buttons are only offered when `can_remove` is set.
pub fn accounts_screen(
    lang: Language,
    accounts: &[TwitterCredentialRecord],
    can_remove: bool,
) -> Screen {
    let s = lang.strings();
    let mut lines = vec![s.accounts_title.to_string()];
    let mut rows = Vec::new();
    if accounts.is_empty() {
        lines.push(s.no_accounts_configured.to_string());
    }
    for account in accounts {
        lines.push(html::escape(&format!(
            "{} · {}",
            account_label(account),
            account.account_name
        )));
        let action = CallbackAction::Manage(ManageAction::Remove(account.account_name.clone()));
        if can_remove && action.to_data().len() <= MAX_CALLBACK_DATA_LEN {
            rows.push(vec![button(
                format!("{} {}", s.btn_remove, account.account_name),
                action,
            )]);
        }
    }
    for chunk in Platform::ALL.chunks(3) {
        rows.push(
            chunk
                .iter()
                .map(|p| button(format!("{} {}", p.icon(), p.display_name()), CallbackAction::Platform(*p)))
                .collect(),
        );
    }
    rows.push(vec![button(
        s.btn_channels,
        CallbackAction::Manage(ManageAction::Channels),
    )]);
    rows.push(back(lang, MenuTarget::Main));
    Screen::new(lines.join("\n"), rows)
}

pub fn platform_screen(
    lang: Language,
    platform: Platform,
    oauth2_available: bool,
    accounts: &[TwitterCredentialRecord],
) -> Screen {
    let s = lang.strings();
    let mut lines = vec![
        format!("{} <b>{}</b>", platform.icon(), platform.display_name()),
        if oauth2_available {
            s.oauth_available.to_string()
        } else {
            s.oauth_unavailable.to_string()
        },
        String::new(),
    ];
    if platform == Platform::Twitter && !accounts.is_empty() {
        lines.extend(accounts.iter().map(|a| html::escape(&account_label(a))));
    } else {
        lines.push(s.connect_from_dashboard.to_string());
    }
    Screen::new(lines.join("\n"), vec![back(lang, MenuTarget::Accounts)])
}

pub fn channels_screen(lang: Language, channels: &[TelegramChannel]) -> Screen {
    let s = lang.strings();
    let mut lines = vec![s.channels_title.to_string()];
    if channels.is_empty() {
        lines.push(s.no_channels.to_string());
    }
    for channel in channels {
        let members = channel
            .member_count
            .map(|n| format!(" · 👥 {}", n))
            .unwrap_or_default();
        lines.push(format!(
            "{} ({}){}",
            html::escape(&channel.name),
            html::escape(&channel.username),
            members
        ));
    }
    Screen::new(lines.join("\n"), vec![back(lang, MenuTarget::Accounts)])
}

pub fn stats_screen(lang: Language, report: &AnalyticsReport) -> Screen {
    let s = lang.strings();
    let mut lines = vec![
        s.stats_title.to_string(),
        String::new(),
        format!("{}: {}", s.stats_total, report.total_posts),
        format!("{}: {}", s.stats_upcoming, report.upcoming),
        String::new(),
    ];
    for (status, count) in &report.by_status {
        lines.push(format!("{}: {}", lang.status_label(*status), count));
    }
    if !report.by_platform.is_empty() {
        lines.push(String::new());
        for (platform, count) in &report.by_platform {
            lines.push(format!("{} {}: {}", platform.icon(), platform.display_name(), count));
        }
    }
    Screen::new(lines.join("\n"), vec![back(lang, MenuTarget::Main)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    fn all_data(screen: &Screen) -> Vec<String> {
        screen
            .keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_every_button_parses() {
        let mut draft = PostDraft::new(1, 1_700_000_000);
        draft.text = Some("<b>launch</b>".to_string());
        draft.toggle_platform(Platform::Twitter);
        draft.scheduled_at = Some(1_700_003_600);

        let screens = [
            main_menu(Language::En),
            post_menu(Language::En),
            schedule_menu(Language::Es),
            settings_menu(Language::En),
            language_menu(Language::En),
            status_menu(Language::En),
            compose_prompt(Language::En),
            platform_selection(Language::En, &draft),
            time_selection(Language::En, draft.created_at),
            confirmation(Language::En, &draft),
            accounts_screen(Language::En, &[], true),
        ];
        for screen in &screens {
            for data in all_data(screen) {
                assert!(data.len() <= MAX_CALLBACK_DATA_LEN, "{}", data);
                assert!(CallbackAction::parse(&data).is_some(), "{}", data);
            }
        }
    }

    #[test]
    fn test_platform_selection_marks_and_escapes() {
        let mut draft = PostDraft::new(1, 42);
        draft.text = Some("<b>launch</b>".to_string());
        draft.toggle_platform(Platform::Linkedin);

        let screen = platform_selection(Language::En, &draft);
        assert!(screen.text.contains("&lt;b&gt;launch&lt;/b&gt;"));
        let labels: Vec<String> = screen
            .keyboard
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.text.clone())
            .collect();
        assert!(labels.contains(&"✅ 💼 LinkedIn".to_string()));
        assert!(all_data(&screen).contains(&"schedule_done_42".to_string()));
    }
}
