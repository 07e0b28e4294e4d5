use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use twistly_types::identity::Identity;

use crate::error::Result;
use crate::keys;
use crate::kv::KvStore;

/// Tracks the single active identity.
///
/// The session id itself lives in the persistent store; the guest marker
/// lives in the transient (tab-scoped) store so it never outlives the tab
/// and is cleared on logout.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    transient: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>, transient: Arc<dyn KvStore>) -> Self {
        Self { kv, transient }
    }

    pub fn set_registered(&self, email: &str) -> Result<()> {
        self.transient.remove(keys::GUEST_FLAG)?;
        self.kv.set(keys::SESSION, email)?;
        Ok(())
    }

    /// Start an anonymous session with a fresh synthetic id and no backing
    /// user record.
    pub fn set_guest(&self) -> Result<Identity> {
        let id = format!(
            "guest_{}_{}",
            Utc::now().timestamp_millis(),
            rand::rng().random_range(0..1000)
        );
        self.kv.set(keys::SESSION, &id)?;
        self.transient.set(keys::GUEST_FLAG, "true")?;
        debug!("guest session {}", id);
        Ok(Identity::Guest(id))
    }

    pub fn current(&self) -> Result<Option<Identity>> {
        let Some(raw) = self.kv.get(keys::SESSION)? else {
            return Ok(None);
        };
        // The transient flag marks the tab that created the guest session;
        // the id prefix classifies it from anywhere else.
        if self.is_guest()? || raw.starts_with("guest_") {
            Ok(Some(Identity::Guest(raw)))
        } else {
            Ok(Some(Identity::Registered(raw)))
        }
    }

    pub fn is_guest(&self) -> Result<bool> {
        Ok(self.transient.get(keys::GUEST_FLAG)?.as_deref() == Some("true"))
    }

    /// Clear the session and the guest marker.
    pub fn clear(&self) -> Result<()> {
        self.kv.remove(keys::SESSION)?;
        self.transient.remove(keys::GUEST_FLAG)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    #[test]
    fn no_session_by_default() {
        assert_eq!(store().current().unwrap(), None);
    }

    #[test]
    fn registered_session_roundtrip() {
        let session = store();
        session.set_registered("alice@example.com").unwrap();
        assert_eq!(
            session.current().unwrap(),
            Some(Identity::Registered("alice@example.com".into()))
        );
        assert!(!session.is_guest().unwrap());

        session.clear().unwrap();
        assert_eq!(session.current().unwrap(), None);
    }

    #[test]
    fn guest_session_sets_flag_and_id_shape() {
        let session = store();
        let identity = session.set_guest().unwrap();
        assert!(identity.is_guest());
        assert!(identity.as_str().starts_with("guest_"));
        assert!(session.is_guest().unwrap());
        assert_eq!(session.current().unwrap(), Some(identity));
    }

    #[test]
    fn guest_id_classifies_without_the_transient_flag() {
        // A fresh "tab": same persistent store, empty transient store.
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        let tab_one = SessionStore::new(kv.clone(), Arc::new(MemoryStore::new()));
        let tab_two = SessionStore::new(kv, Arc::new(MemoryStore::new()));

        tab_one.set_guest().unwrap();
        assert!(!tab_two.is_guest().unwrap());
        assert!(matches!(
            tab_two.current().unwrap(),
            Some(Identity::Guest(_))
        ));
    }

    #[test]
    fn logging_in_clears_guest_flag() {
        let session = store();
        session.set_guest().unwrap();
        session.set_registered("alice@example.com").unwrap();
        assert!(!session.is_guest().unwrap());
        assert_eq!(
            session.current().unwrap(),
            Some(Identity::Registered("alice@example.com".into()))
        );
    }
}
