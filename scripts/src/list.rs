use std::io::Write;

use anyhow::Result;
use postdeck_core::{
    helpers::format::format_timestamp, twitter::credential_file::TwitterCredentialFile,
};

use crate::common::{load_accounts, EXIT_OK};

pub fn list_accounts(
    file: &TwitterCredentialFile,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32> {
    let accounts = match load_accounts(file, err)? {
        Ok(accounts) => accounts,
        Err(code) => return Ok(code),
    };

    writeln!(out, "🐦 {} Twitter account(s) in {}\n", accounts.len(), file.path().display())?;
    for account in &accounts {
        writeln!(out, "• {}", account.account_name)?;
        if account.display_name.is_empty() {
            writeln!(out, "   👤 @{}", account.username)?;
        } else {
            writeln!(out, "   👤 @{} ({})", account.username, account.display_name)?;
        }
        writeln!(out, "   📅 Added {}", format_timestamp(&account.created_at))?;
        match &account.last_used {
            Some(at) => writeln!(out, "   🕒 Last used {}", format_timestamp(at))?,
            None => writeln!(out, "   🕒 Never used")?,
        }
    }
    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::fixtures::record;

    #[test]
    fn test_list_prints_each_account() {
        let dir = tempfile::tempdir().unwrap();
        let file = TwitterCredentialFile::new(dir.path().join("twitter_accounts.json"));
        file.upsert(record("main", "t")).unwrap();
        file.upsert(record("brand_es", "t")).unwrap();

        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(list_accounts(&file, &mut out, &mut err).unwrap(), 0);
        let listing = String::from_utf8(out).unwrap();
        assert!(listing.starts_with("🐦 2 Twitter account(s)"));
        // BTreeMap order
        assert!(listing.find("• brand_es").unwrap() < listing.find("• main").unwrap());
        assert!(listing.contains("Never used"));
    }

    #[test]
    fn test_list_without_accounts_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let file = TwitterCredentialFile::new(dir.path().join("twitter_accounts.json"));
        let (mut out, mut err) = (Vec::new(), Vec::new());
        assert_eq!(list_accounts(&file, &mut out, &mut err).unwrap(), 1);
    }
}
