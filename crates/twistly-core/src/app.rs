use std::sync::Arc;

use twistly_store::kv::KvStore;
use twistly_store::messages::MessageStore;
use twistly_store::posts::PostStore;
use twistly_store::session::SessionStore;
use twistly_store::users::UserStore;

/// Wires the four stores over one persistent backend plus one transient
/// (tab-scoped) backend for the guest flag. All gated operations live on
/// this type; the raw stores stay reachable for direct access.
#[derive(Clone)]
pub struct App {
    pub users: UserStore,
    pub session: SessionStore,
    pub posts: PostStore,
    pub messages: MessageStore,
}

impl App {
    pub fn new(kv: Arc<dyn KvStore>, transient: Arc<dyn KvStore>) -> Self {
        Self {
            users: UserStore::new(kv.clone()),
            session: SessionStore::new(kv.clone(), transient),
            posts: PostStore::new(kv.clone()),
            messages: MessageStore::new(kv),
        }
    }
}
