use std::io::Write;

use anyhow::Result;

use crate::common::{load_accounts, mask, ScriptContext, EXIT_FAILURE, EXIT_OK};

/// Check every stored account against `GET /2/users/me`, one at a time.
/// Succeeds when at least one account validates.
pub async fn validate_tokens(
    ctx: &ScriptContext,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let accounts = match load_accounts(&ctx.file, err)? {
        Ok(accounts) => accounts,
        Err(code) => return Ok(code),
    };

    writeln!(out, "🔍 Validating {} Twitter account(s)...", accounts.len())?;
    let mut valid = 0;
    for account in &accounts {
        let Some(keys) = ctx.app_keys.as_ref() else {
            writeln!(
                out,
                "❌ {}: TWITTER_API_KEY/TWITTER_API_SECRET are required to sign requests",
                account.account_name
            )?;
            continue;
        };
        match ctx.client.verify_record(keys, account).await {
            Ok(profile) => {
                valid += 1;
                writeln!(
                    out,
                    "✅ {}: @{} ({})",
                    account.account_name, profile.username, profile.name
                )?;
            }
            Err(e) => writeln!(out, "❌ {}: {}", account.account_name, e)?,
        }
    }

    writeln!(out, "\n📊 {}/{} account(s) valid", valid, accounts.len())?;
    Ok(if valid > 0 { EXIT_OK } else { EXIT_FAILURE })
}

/// Like [`validate_tokens`], but first reports the configuration and stops
/// before any API call when the app consumer keys are missing.
pub async fn validate_config(
    ctx: &ScriptContext,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    writeln!(out, "⚙️ Twitter configuration")?;
    writeln!(out, "   📄 Credentials file: {}", ctx.file.path().display())?;
    match &ctx.app_keys {
        Some(keys) => {
            writeln!(out, "   🔑 TWITTER_API_KEY: {}", mask(&keys.api_key))?;
            writeln!(out, "   🔑 TWITTER_API_SECRET: {}", mask(&keys.api_secret))?;
        }
        None => {
            writeln!(err, "❌ TWITTER_API_KEY and TWITTER_API_SECRET must be set")?;
            return Ok(EXIT_FAILURE);
        }
    }
    writeln!(out)?;
    validate_tokens(ctx, out, err).await
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

    async fn twitter_api() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .and(header_regex("Authorization", "oauth_token=\"good-token\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "1", "username": "brand", "name": "Brand"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/2/users/me"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_absent_file_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, "http://127.0.0.1:9");
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(validate_tokens(&ctx, &mut out, &mut err).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_one_valid_account_is_enough() {
        let server = twitter_api().await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &server.uri());
        ctx.file.upsert(record("main", "good-token")).unwrap();
        ctx.file.upsert(record("stale", "bad-token")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(validate_tokens(&ctx, &mut out, &mut err).await.unwrap(), 0);
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("✅ main: @brand (Brand)"));
        assert!(report.contains("❌ stale:"));
        assert!(report.contains("1/2 account(s) valid"));
    }

    #[tokio::test]
    async fn test_no_valid_account_exits_one() {
        let server = twitter_api().await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &server.uri());
        ctx.file.upsert(record("stale", "bad-token")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(validate_tokens(&ctx, &mut out, &mut err).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_config_check_stops_without_keys() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = context(&dir, &server.uri());
        ctx.file.upsert(record("main", "good-token")).unwrap();
        ctx.app_keys = None;

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(validate_config(&ctx, &mut out, &mut err).await.unwrap(), 1);
        assert!(String::from_utf8(err).unwrap().contains("TWITTER_API_KEY"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_config_check_masks_keys_then_validates() {
        let server = twitter_api().await;
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir, &server.uri());
        ctx.file.upsert(record("main", "good-token")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(validate_config(&ctx, &mut out, &mut err).await.unwrap(), 0);
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("cons…-key"));
        assert!(!report.contains("consumer-secret"));
    }
}
