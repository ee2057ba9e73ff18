use std::io::Write;

use anyhow::Result;
use chrono::Utc;

use crate::common::{load_accounts, ScriptContext, EXIT_FAILURE, EXIT_OK};

/// Re-read username and display name from the API for every account that still
/// authenticates, stamp `lastUsed`, and write the file back under its lock.
pub async fn refresh_accounts(
    ctx: &ScriptContext,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let accounts = match load_accounts(&ctx.file, err)? {
        Ok(accounts) => accounts,
        Err(code) => return Ok(code),
    };
    let Some(keys) = ctx.app_keys.as_ref() else {
        writeln!(err, "❌ TWITTER_API_KEY and TWITTER_API_SECRET must be set")?;
        return Ok(EXIT_FAILURE);
    };

    writeln!(out, "🔄 Refreshing {} Twitter account(s)...", accounts.len())?;
    let mut refreshed = Vec::new();
    for account in &accounts {
        match ctx.client.verify_record(keys, account).await {
            Ok(profile) => {
                writeln!(
                    out,
                    "✅ {}: @{} → @{} ({})",
                    account.account_name, account.username, profile.username, profile.name
                )?;
                refreshed.push((account.account_name.clone(), profile));
            }
            Err(e) => writeln!(out, "⚠️ {}: kept as is, {}", account.account_name, e)?,
        }
    }

    if refreshed.is_empty() {
        writeln!(err, "❌ No account could be refreshed")?;
        return Ok(EXIT_FAILURE);
    }

    let now = Utc::now();
    let updated = ctx.file.update(|stored| {
        let mut updated = 0;
        for (name, profile) in &refreshed {
            // Entries removed by someone else meanwhile stay removed.
            if let Some(record) = stored.get_mut(name) {
                record.username = profile.username.clone();
                record.display_name = profile.name.clone();
                record.last_used = Some(now);
                updated += 1;
            }
        }
        updated
    })?;

    writeln!(
        out,
        "\n💾 Updated {}/{} account(s) in {}",
        updated,
        accounts.len(),
        ctx.file.path().display()
    )?;
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures::{context, record};
    use serde_json::json;
    use wiremock::{
        matchers::{header_regex, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn test_refresh_updates_profile_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .and(header_regex("Authorization", "oauth_token=\"good-token\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "1", "username": "brand_new", "name": "Brand New"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &server.uri());
        ctx.file.upsert(record("main", "good-token")).unwrap();
        ctx.file.upsert(record("stale", "bad-token")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(refresh_accounts(&ctx, &mut out, &mut err).await.unwrap(), 0);

        let main = ctx.file.get("main").unwrap().unwrap();
        assert_eq!(main.username, "brand_new");
        assert_eq!(main.display_name, "Brand New");
        assert!(main.last_used.is_some());

        let stale = ctx.file.get("stale").unwrap().unwrap();
        assert_eq!(stale.username, "old_stale");
        assert_eq!(stale.last_used, None);
    }

    #[tokio::test]
    async fn test_refresh_fails_when_nothing_authenticates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &server.uri());
        ctx.file.upsert(record("stale", "bad-token")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(refresh_accounts(&ctx, &mut out, &mut err).await.unwrap(), 1);
    }
}
