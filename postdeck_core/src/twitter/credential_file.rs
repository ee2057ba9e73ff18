use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    thread,
    time::{Duration, SystemTime},
};
use tempfile::NamedTempFile;
use thiserror::Error;

use super::dto::TwitterCredentialRecord;
use crate::helpers::env;

pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials/twitter_accounts.json";

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);
const LOCK_MAX_ATTEMPTS: u32 = 100;
const STALE_LOCK_AGE: Duration = Duration::from_secs(30);

pub type CredentialMap = BTreeMap<String, TwitterCredentialRecord>;

#[derive(Debug, Error)]
pub enum CredentialFileError {
    #[error("credentials file not found: {0}")]
    NotFound(PathBuf),
    #[error("timed out waiting for lock on {0}")]
    LockTimeout(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid credentials file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to replace credentials file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// The local JSON file of OAuth1 credentials shared by the bot and the CLI utilities.
///
/// Readers see either the old or the new file: writes go through a temp file in the same
/// directory and a rename. Read-modify-write cycles hold `<file>.lock`, created with
/// `create_new`, so two processes cannot lose each other's updates.
#[derive(Debug, Clone)]
pub struct TwitterCredentialFile {
    path: PathBuf,
}

struct FileLock {
    path: PathBuf,
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

impl TwitterCredentialFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::new(env::or_default("TWITTER_ACCOUNTS_FILE", DEFAULT_CREDENTIALS_PATH))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<CredentialMap, CredentialFileError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialFileError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(CredentialMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn load_or_empty(&self) -> Result<CredentialMap, CredentialFileError> {
        match self.load() {
            Err(CredentialFileError::NotFound(_)) => Ok(CredentialMap::new()),
            other => other,
        }
    }

    /// Records ordered by account name.
    pub fn list(&self) -> Result<Vec<TwitterCredentialRecord>, CredentialFileError> {
        Ok(self.load()?.into_values().collect())
    }

    pub fn get(&self, account_name: &str) -> Result<Option<TwitterCredentialRecord>, CredentialFileError> {
        Ok(self.load()?.remove(account_name))
    }

    pub fn upsert(&self, record: TwitterCredentialRecord) -> Result<(), CredentialFileError> {
        self.update(|accounts| {
            accounts.insert(record.account_name.clone(), record);
        })
    }

    pub fn remove(&self, account_name: &str) -> Result<bool, CredentialFileError> {
        self.update(|accounts| accounts.remove(account_name).is_some())
    }

    pub fn touch_last_used(&self, account_name: &str, at: DateTime<Utc>) -> Result<bool, CredentialFileError> {
        self.update(|accounts| match accounts.get_mut(account_name) {
            Some(record) => {
                record.last_used = Some(at);
                true
            }
            None => false,
        })
    }

    /// Locked read-modify-write. A missing file starts out empty.
    pub fn update<R>(&self, f: impl FnOnce(&mut CredentialMap) -> R) -> Result<R, CredentialFileError> {
        let _lock = self.lock()?;
        let mut accounts = self.load_or_empty()?;
        let result = f(&mut accounts);
        self.write(&accounts)?;
        Ok(result)
    }

    fn write(&self, accounts: &CredentialMap) -> Result<(), CredentialFileError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, accounts)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn lock(&self) -> Result<FileLock, CredentialFileError> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        for _ in 0..LOCK_MAX_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(FileLock { path: lock_path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale(&lock_path) {
                        log::warn!("Removing stale lock {}", lock_path.display());
                        let _ = fs::remove_file(&lock_path);
                        continue;
                    }
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(CredentialFileError::LockTimeout(lock_path))
    }
}

fn is_stale(lock_path: &Path) -> bool {
    fs::metadata(lock_path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .map(|age| age > STALE_LOCK_AGE)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(name: &str) -> TwitterCredentialRecord {
        TwitterCredentialRecord {
            account_name: name.to_string(),
            username: format!("{}_handle", name),
            display_name: name.to_uppercase(),
            access_token: "token".to_string(),
            access_secret: "secret".to_string(),
            created_at: Utc::now(),
            last_used: None,
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let file = TwitterCredentialFile::new(temp.path().join("none.json"));
        assert!(matches!(file.load(), Err(CredentialFileError::NotFound(_))));
        assert!(file.load_or_empty().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_creates_directories_and_camel_case_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("credentials").join("twitter_accounts.json");
        let file = TwitterCredentialFile::new(&path);

        file.upsert(record("main")).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"accountName\": \"main\""));
        assert!(raw.contains("\"accessSecret\""));
        assert!(!file.lock_path().exists());
        assert_eq!(file.get("main").unwrap().unwrap().username, "main_handle");
    }

    #[test]
    fn test_remove_and_touch() {
        let temp = TempDir::new().unwrap();
        let file = TwitterCredentialFile::new(temp.path().join("accounts.json"));
        file.upsert(record("a")).unwrap();
        file.upsert(record("b")).unwrap();

        assert!(file.touch_last_used("a", Utc::now()).unwrap());
        assert!(!file.touch_last_used("zzz", Utc::now()).unwrap());
        assert!(file.get("a").unwrap().unwrap().last_used.is_some());

        assert!(file.remove("b").unwrap());
        assert!(!file.remove("b").unwrap());
        let names: Vec<String> = file.list().unwrap().into_iter().map(|r| r.account_name).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_concurrent_writers_keep_every_entry() {
        let temp = TempDir::new().unwrap();
        let file = Arc::new(TwitterCredentialFile::new(temp.path().join("accounts.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let file = Arc::clone(&file);
                thread::spawn(move || file.upsert(record(&format!("acc{}", i))).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(file.load().unwrap().len(), 8);
    }

    #[test]
    fn test_stale_lock_is_reclaimed() {
        let temp = TempDir::new().unwrap();
        let file = TwitterCredentialFile::new(temp.path().join("accounts.json"));
        let lock = file.lock_path();
        fs::write(&lock, "999").unwrap();
        let old = SystemTime::now() - Duration::from_secs(120);
        fs::File::options()
            .write(true)
            .open(&lock)
            .unwrap()
            .set_modified(old)
            .unwrap();

        file.upsert(record("a")).unwrap();
        assert!(file.get("a").unwrap().is_some());
    }
}
