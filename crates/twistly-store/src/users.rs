use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use twistly_types::models::User;

use crate::error::{Result, StoreError};
use crate::keys;
use crate::kv::KvStore;

/// Signup input. An empty `pfp` falls back to a deterministic avatar URL
/// seeded by the email.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub username: String,
    pub bio: String,
    pub pfp: String,
}

/// Email-keyed collection of registered accounts.
#[derive(Clone)]
pub struct UserStore {
    kv: Arc<dyn KvStore>,
}

impl UserStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn all(&self) -> Result<Vec<User>> {
        match self.kv.get(keys::USERS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                key: keys::USERS,
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, users: &[User]) -> Result<()> {
        let raw = serde_json::to_string(users).map_err(|e| StoreError::Backend(e.into()))?;
        self.kv.set(keys::USERS, &raw)?;
        Ok(())
    }

    /// Create an account. A duplicate email fails before anything is
    /// written.
    pub fn create(&self, new: NewUser) -> Result<User> {
        let mut users = self.all()?;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::EmailTaken);
        }

        let pfp = if new.pfp.trim().is_empty() {
            default_avatar(&new.email)
        } else {
            new.pfp
        };
        let user = User {
            email: new.email,
            password: new.password,
            username: new.username,
            bio: new.bio,
            pfp,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        self.save(&users)?;
        info!("created user {}", user.email);
        Ok(user)
    }

    pub fn find(&self, email: &str) -> Result<Option<User>> {
        Ok(self.all()?.into_iter().find(|u| u.email == email))
    }

    /// Exact email + password match, or `InvalidCredentials`.
    pub fn verify_login(&self, email: &str, password: &str) -> Result<User> {
        self.all()?
            .into_iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(StoreError::InvalidCredentials)
    }

    /// Username for display. Authors with no backing record degrade to a
    /// placeholder rather than an error: there is no referential integrity
    /// between stores.
    pub fn display_name(&self, email: &str) -> Result<String> {
        Ok(self
            .find(email)?
            .map(|u| u.username)
            .unwrap_or_else(|| "Unknown".to_string()))
    }
}

/// Default avatar for accounts that did not supply one.
pub fn default_avatar(email: &str) -> String {
    format!("https://i.pravatar.cc/150?u={email}")
}
