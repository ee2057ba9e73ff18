use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use sled::{Db, Tree};
use uuid::Uuid;

use super::dto::User;
use crate::helpers::error::{StoreError, StoreResult};

const USERS_TREE: &str = "users";
const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

/// Users keyed by id, with `name:` and `twitter:` index entries pointing at the id.
#[derive(Clone)]
pub struct UserStorage {
    tree: Tree,
    bcrypt_cost: u32,
}

impl UserStorage {
    pub fn new(db: &Db) -> sled::Result<Self> {
        Self::with_cost(db, DEFAULT_COST)
    }

    pub fn with_cost(db: &Db, bcrypt_cost: u32) -> sled::Result<Self> {
        let tree = db.open_tree(USERS_TREE)?;
        Ok(Self { tree, bcrypt_cost })
    }

    pub fn register(&self, username: &str, password: &str) -> StoreResult<User> {
        let username = username.trim();
        if username.len() < MIN_USERNAME_LEN {
            return Err(StoreError::Invalid(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(StoreError::Invalid(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.get_by_username(username)?.is_some() {
            return Err(StoreError::Conflict("Username is already taken".to_string()));
        }

        let password_hash = hash(password, self.bcrypt_cost)
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: Some(password_hash),
            twitter_id: None,
            created_at: Utc::now(),
        };
        self.put(&user)?;
        Ok(user)
    }

    /// `Ok(None)` for unknown users and wrong passwords alike.
    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        let Some(user) = self.get_by_username(username.trim())? else {
            return Ok(None);
        };
        let Some(password_hash) = user.password_hash.as_deref() else {
            return Ok(None);
        };

        let valid = verify(password, password_hash)
            .map_err(|e| anyhow::anyhow!("Password verification failed: {}", e))?;
        Ok(valid.then_some(user))
    }

    /// Find the user linked to an X account or create one named after the handle.
    pub fn upsert_twitter_user(&self, twitter_id: &str, handle: &str) -> StoreResult<User> {
        if let Some(id) = self.tree.get(twitter_key(twitter_id))? {
            let id = String::from_utf8_lossy(&id).to_string();
            if let Some(user) = self.get(&id)? {
                return Ok(user);
            }
        }

        let mut username = handle.to_string();
        let mut suffix = 1;
        while self.get_by_username(&username)?.is_some() {
            suffix += 1;
            username = format!("{}_{}", handle, suffix);
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash: None,
            twitter_id: Some(twitter_id.to_string()),
            created_at: Utc::now(),
        };
        self.put(&user)?;
        log::info!("Created user {} from X login @{}", user.id, handle);
        Ok(user)
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<User>> {
        match self.tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn get_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        match self.tree.get(name_key(username))? {
            Some(id) => self.get(&String::from_utf8_lossy(&id)),
            None => Ok(None),
        }
    }

    fn put(&self, user: &User) -> StoreResult<()> {
        self.tree
            .insert(user.id.as_bytes(), serde_json::to_vec(user)?)?;
        self.tree
            .insert(name_key(&user.username), user.id.as_bytes())?;
        if let Some(twitter_id) = &user.twitter_id {
            self.tree
                .insert(twitter_key(twitter_id), user.id.as_bytes())?;
        }
        Ok(())
    }
}

fn name_key(username: &str) -> String {
    format!("name:{}", username.to_lowercase())
}

fn twitter_key(twitter_id: &str) -> String {
    format!("twitter:{}", twitter_id)
}
