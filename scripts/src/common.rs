// Shared setup and reporting for the Twitter credential utilities

use std::io::Write;
use std::process;

use anyhow::Result;
use postdeck_core::twitter::{
    client::{TwitterAppKeys, TwitterClient},
    credential_file::TwitterCredentialFile,
    dto::TwitterCredentialRecord,
};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Everything a script needs: the credentials file, the API client and the app consumer keys.
pub struct ScriptContext {
    pub file: TwitterCredentialFile,
    pub client: TwitterClient,
    pub app_keys: Option<TwitterAppKeys>,
}

impl ScriptContext {
    pub fn from_env() -> Self {
        Self {
            file: TwitterCredentialFile::from_env(),
            client: TwitterClient::from_env(),
            app_keys: TwitterAppKeys::from_env().ok(),
        }
    }
}

/// Stored accounts, or the exit code to stop with when there is nothing to work on.
pub fn load_accounts(
    file: &TwitterCredentialFile,
    err: &mut impl Write,
) -> Result<Result<Vec<TwitterCredentialRecord>, i32>> {
    if !file.exists() {
        writeln!(err, "❌ Credentials file not found: {}", file.path().display())?;
        writeln!(err, "💡 Set TWITTER_ACCOUNTS_FILE or add an account first")?;
        return Ok(Err(EXIT_FAILURE));
    }
    let accounts = match file.list() {
        Ok(accounts) => accounts,
        Err(e) => {
            writeln!(err, "❌ {}", e)?;
            return Ok(Err(EXIT_FAILURE));
        }
    };
    if accounts.is_empty() {
        writeln!(err, "❌ No Twitter accounts stored in {}", file.path().display())?;
        return Ok(Err(EXIT_FAILURE));
    }
    Ok(Ok(accounts))
}

/// Show only the edges of a secret.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

/// Exit with the script's code, or 1 if it failed outright.
pub fn exit_with(result: Result<i32>) -> ! {
    let code = result.unwrap_or_else(|e| {
        eprintln!("❌ {:#}", e);
        EXIT_FAILURE
    });
    process::exit(code)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("1234567890abcdef"), "1234…cdef");
    }

    #[test]
    fn test_missing_and_empty_files_stop_the_script() {
        let dir = tempfile::tempdir().unwrap();
        let file = TwitterCredentialFile::new(dir.path().join("twitter_accounts.json"));
        let mut err = Vec::new();
        assert_eq!(load_accounts(&file, &mut err).unwrap(), Err(EXIT_FAILURE));
        assert!(String::from_utf8(err).unwrap().contains("not found"));

        std::fs::write(file.path(), "{}").unwrap();
        let mut err = Vec::new();
        assert_eq!(load_accounts(&file, &mut err).unwrap(), Err(EXIT_FAILURE));
        assert!(String::from_utf8(err).unwrap().contains("No Twitter accounts"));
    }
}
