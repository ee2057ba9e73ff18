use anyhow::Result;
use postdeck_core::{
    accounts::dto::Platform,
    twitter::{credential_file::TwitterCredentialFile, dto::TwitterCredentialRecord},
};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::{
    callbacks::action::{CallbackAction, MAX_CALLBACK_DATA_LEN, MenuTarget},
    i18n::Language,
};

/// Where the selector reads stored Twitter credentials from.
pub trait AccountSource {
    fn twitter_accounts(&self) -> Result<Vec<TwitterCredentialRecord>>;
}

impl AccountSource for TwitterCredentialFile {
    fn twitter_accounts(&self) -> Result<Vec<TwitterCredentialRecord>> {
        Ok(self.list()?)
    }
}

/// Listed accounts, or an empty list when the source cannot be read.
pub fn load_accounts(source: &dyn AccountSource) -> Vec<TwitterCredentialRecord> {
    source.twitter_accounts().unwrap_or_else(|e| {
        log::warn!("Could not read Twitter accounts: {}", e);
        Vec::new()
    })
}

/// One button per stored account with data `{action_prefix}_twitter_account_{name}_{platform}_{ts}`.
///
/// Accounts whose data would exceed Telegram's limit are left out. With nothing to
/// show, the keyboard is a single "no accounts configured" button that opens the accounts menu.
pub fn twitter_account_keyboard(
    source: &dyn AccountSource,
    action_prefix: &str,
    platform: Platform,
    ts: i64,
    lang: Language,
) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = load_accounts(source)
        .into_iter()
        .filter_map(|account| {
            let data = format!(
                "{}_twitter_account_{}_{}_{}",
                action_prefix, account.account_name, platform, ts
            );
            if data.len() > MAX_CALLBACK_DATA_LEN {
                log::warn!(
                    "Skipping Twitter account {}: callback data too long",
                    account.account_name
                );
                return None;
            }
            Some(vec![InlineKeyboardButton::callback(
                account_label(&account),
                data,
            )])
        })
        .collect();

    if rows.is_empty() {
        return InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            lang.strings().no_accounts_configured,
            CallbackAction::Menu(MenuTarget::Accounts).to_data(),
        )]]);
    }
    InlineKeyboardMarkup::new(rows)
}

pub fn account_label(account: &TwitterCredentialRecord) -> String {
    if account.display_name.is_empty() {
        format!("🐦 @{}", account.username)
    } else {
        format!("🐦 {} (@{})", account.display_name, account.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::Utc;
    use teloxide::types::InlineKeyboardButtonKind;

    struct Fixed(Vec<&'static str>);

    impl AccountSource for Fixed {
        fn twitter_accounts(&self) -> Result<Vec<TwitterCredentialRecord>> {
            Ok(self
                .0
                .iter()
                .map(|name| TwitterCredentialRecord {
                    account_name: name.to_string(),
                    username: format!("{}_handle", name),
                    display_name: String::new(),
                    access_token: "t".to_string(),
                    access_secret: "s".to_string(),
                    created_at: Utc::now(),
                    last_used: None,
                })
                .collect())
        }
    }

    struct Broken;

    impl AccountSource for Broken {
        fn twitter_accounts(&self) -> Result<Vec<TwitterCredentialRecord>> {
            Err(anyhow!("disk on fire"))
        }
    }

    fn buttons(markup: &InlineKeyboardMarkup) -> Vec<(String, String)> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| match &b.kind {
                InlineKeyboardButtonKind::CallbackData(data) => (b.text.clone(), data.clone()),
                other => panic!("unexpected button kind {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_one_button_per_account() {
        let markup = twitter_account_keyboard(
            &Fixed(vec!["main", "brand_es"]),
            "schedule",
            Platform::Twitter,
            1_700_000_000,
            Language::En,
        );
        assert_eq!(
            buttons(&markup),
            vec![
                (
                    "🐦 @main_handle".to_string(),
                    "schedule_twitter_account_main_twitter_1700000000".to_string()
                ),
                (
                    "🐦 @brand_es_handle".to_string(),
                    "schedule_twitter_account_brand_es_twitter_1700000000".to_string()
                ),
            ]
        );
        let parsed = CallbackAction::parse(&buttons(&markup)[1].1);
        assert_eq!(
            parsed,
            Some(CallbackAction::TwitterAccount {
                account: "brand_es".to_string(),
                platform: Platform::Twitter,
                ts: 1_700_000_000
            })
        );
    }

    #[test]
    fn test_zero_accounts_shows_localized_placeholder() {
        for (lang, text) in [
            (Language::En, "⚠️ No accounts configured"),
            (Language::Es, "⚠️ No hay cuentas configuradas"),
        ] {
            let markup =
                twitter_account_keyboard(&Fixed(vec![]), "schedule", Platform::Twitter, 1, lang);
            assert_eq!(
                buttons(&markup),
                vec![(text.to_string(), "menu_accounts".to_string())]
            );
        }
    }

    #[test]
    fn test_source_errors_count_as_zero_accounts() {
        let markup = twitter_account_keyboard(&Broken, "schedule", Platform::Twitter, 1, Language::En);
        assert_eq!(buttons(&markup).len(), 1);
        assert_eq!(buttons(&markup)[0].1, "menu_accounts");
    }

    #[test]
    fn test_overlong_account_names_are_skipped() {
        let long = "a_really_long_account_name_that_cannot_fit";
        let markup = twitter_account_keyboard(
            &Fixed(vec![long, "ok"]),
            "schedule",
            Platform::Twitter,
            1_700_000_000,
            Language::En,
        );
        let data: Vec<String> = buttons(&markup).into_iter().map(|(_, d)| d).collect();
        assert_eq!(data, vec!["schedule_twitter_account_ok_twitter_1700000000"]);
    }

    #[test]
    fn test_reads_credential_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TwitterCredentialFile::new(dir.path().join("twitter_accounts.json"));
        assert!(load_accounts(&missing).is_empty());
    }
}
