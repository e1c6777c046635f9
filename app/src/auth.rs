//! Login gate in front of the tool. Users live in the `users` collection and
//! the logged-in identity in `currentUser`.

use std::sync::Arc;

use log::{info, warn};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::store::{CollectionStore, CollectionStoreExt, CURRENT_USER, USERS};

pub const BOOTSTRAP_USERNAME: &str = "admin";
pub const BOOTSTRAP_PASSWORD: &str = "password";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    id: String,
    username: String,
    #[serde(default)]
    password_hash: String,
    #[serde(default)]
    salt: String,
    /// Plaintext from records written before hashing; replaced on next login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    role: Role,
    created_at: String,
}

impl StoredUser {
    fn verify(&self, candidate: &str) -> bool {
        if !self.password_hash.is_empty() {
            return hash_password(&self.salt, candidate) == self.password_hash;
        }
        self.password.as_deref() == Some(candidate)
    }

    fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at.clone(),
        }
    }
}

/// A user as seen by the rest of the app: never carries credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub created_at: String,
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let out = hasher.finalize();
    out.iter().map(|b| format!("{b:02x}")).collect()
}

fn hash_password(salt: &str, password: &str) -> String {
    sha256_hex(&format!("{salt}:{password}"))
}

fn new_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn new_user(username: &str, password: &str, role: Role) -> StoredUser {
    let salt = new_salt();
    StoredUser {
        id: Uuid::now_v7().to_string(),
        username: username.to_string(),
        password_hash: hash_password(&salt, password),
        salt,
        password: None,
        role,
        created_at: crate::now_iso(),
    }
}

pub struct AuthService {
    store: Arc<dyn CollectionStore>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    fn users_raw(&self) -> Result<Vec<StoredUser>> {
        self.store.load_all(USERS)
    }

    /// Creates the default admin account when no user exists yet.
    pub fn ensure_bootstrap_user(&self) -> Result<bool> {
        if !self.users_raw()?.is_empty() {
            return Ok(false);
        }
        let admin = new_user(BOOTSTRAP_USERNAME, BOOTSTRAP_PASSWORD, Role::Admin);
        self.store.save_all(USERS, &[admin])?;
        warn!("no users found; created default '{BOOTSTRAP_USERNAME}' account");
        Ok(true)
    }

    /// On success the matching user becomes the current session.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        let mut users = self.users_raw()?;
        let Some(idx) = users
            .iter()
            .position(|u| u.username == username && u.verify(password))
        else {
            warn!("login failed for {username}");
            return Ok(false);
        };

        if users[idx].password_hash.is_empty() {
            let upgraded = new_user(username, password, users[idx].role);
            users[idx].salt = upgraded.salt;
            users[idx].password_hash = upgraded.password_hash;
            users[idx].password = None;
            self.store.save_all(USERS, &users)?;
            info!("upgraded stored password for {username}");
        }

        self.store.save_value(CURRENT_USER, &users[idx].identity())?;
        info!("{username} logged in");
        Ok(true)
    }

    pub fn current_session(&self) -> Result<Option<Identity>> {
        self.store.load_value(CURRENT_USER)
    }

    pub fn require_session(&self) -> Result<Identity> {
        self.current_session()?
            .ok_or_else(|| Error::Auth("not logged in".to_string()))
    }

    pub fn logout(&self) -> Result<()> {
        self.store.remove(CURRENT_USER)
    }

    pub fn users(&self) -> Result<Vec<Identity>> {
        Ok(self.users_raw()?.iter().map(StoredUser::identity).collect())
    }

    /// Returns false when the username is taken.
    pub fn add_user(&self, username: &str, password: &str) -> Result<bool> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(Error::validation("Username and password are required."));
        }
        let mut users = self.users_raw()?;
        if users.iter().any(|u| u.username == username) {
            return Ok(false);
        }
        users.push(new_user(username, password, Role::User));
        self.store.save_all(USERS, &users)?;
        info!("user {username} added");
        Ok(true)
    }

    pub fn delete_user(&self, id: &str) -> Result<bool> {
        let users = self.users_raw()?;
        let before = users.len();
        let next: Vec<StoredUser> = users.into_iter().filter(|u| u.id != id).collect();
        if next.len() == before {
            return Ok(false);
        }
        self.store.save_all(USERS, &next)?;
        if self.current_session()?.is_some_and(|s| s.id == id) {
            self.logout()?;
        }
        info!("user {id} removed");
        Ok(true)
    }
}
