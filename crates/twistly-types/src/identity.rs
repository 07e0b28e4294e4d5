/// The active session identity. At most one is active at a time.
///
/// Guests carry a synthetic `guest_<timestamp>_<random>` id and have no
/// backing [`User`](crate::models::User) record, so they can browse but
/// never author content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Registered(String),
    Guest(String),
}

impl Identity {
    /// The account email, if this is a registered identity.
    pub fn email(&self) -> Option<&str> {
        match self {
            Identity::Registered(email) => Some(email),
            Identity::Guest(_) => None,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Identity::Guest(_))
    }

    /// The raw session string as persisted: an email or a guest id.
    pub fn as_str(&self) -> &str {
        match self {
            Identity::Registered(s) | Identity::Guest(s) => s,
        }
    }
}
