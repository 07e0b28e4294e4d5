use tracing::info;

use twistly_store::users::NewUser;
use twistly_store::{Result, StoreError};
use twistly_types::identity::Identity;
use twistly_types::models::User;

use crate::app::App;

impl App {
    /// Create an account and log it in. A duplicate email fails before
    /// anything is written, leaving any existing session untouched.
    pub fn sign_up(&self, new: NewUser) -> Result<User> {
        let user = self.users.create(new)?;
        self.session.set_registered(&user.email)?;
        Ok(user)
    }

    pub fn log_in(&self, email: &str, password: &str) -> Result<User> {
        let user = self.users.verify_login(email, password)?;
        self.session.set_registered(&user.email)?;
        info!("logged in as {}", user.email);
        Ok(user)
    }

    /// Start an anonymous session. Guests can browse but hold no backing
    /// user record, so every write operation rejects them.
    pub fn guest_login(&self) -> Result<Identity> {
        self.session.set_guest()
    }

    /// Clear the session and the guest marker.
    pub fn log_out(&self) -> Result<()> {
        self.session.clear()
    }

    pub fn current_identity(&self) -> Result<Option<Identity>> {
        self.session.current()
    }

    /// The registered user behind the session, if any. Guests and session
    /// ids with no backing record both resolve to `None`.
    pub fn current_user(&self) -> Result<Option<User>> {
        match self.session.current()? {
            Some(Identity::Registered(email)) => self.users.find(&email),
            _ => Ok(None),
        }
    }

    /// Gate for write operations: reactions, comments, uploads and
    /// messages all require a backing registered user.
    pub(crate) fn require_user(&self) -> Result<User> {
        self.current_user()?.ok_or(StoreError::NotAuthenticated)
    }
}
