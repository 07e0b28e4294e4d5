use twistly_store::Result;
use twistly_types::models::Message;

use crate::app::App;

/// One conversation with a single peer, display name resolved. A peer
/// with no user record falls back to their raw email.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub peer_email: String,
    pub peer_name: String,
    pub messages: Vec<Message>,
}

impl App {
    /// Send a direct message from the current user. Rejected without an
    /// authenticated registered user or with empty trimmed text.
    pub fn send_message(&self, to: &str, text: &str) -> Result<Message> {
        let user = self.require_user()?;
        self.messages.send(&user.email, to, text)
    }

    /// Every conversation of the current user, ordered by peer email,
    /// each internally ascending by time.
    pub fn conversations(&self) -> Result<Vec<Conversation>> {
        let user = self.require_user()?;
        let groups = self.messages.conversations_for(&user.email)?;

        let mut convos = Vec::with_capacity(groups.len());
        for (peer_email, messages) in groups {
            let peer_name = self
                .users
                .find(&peer_email)?
                .map(|u| u.username)
                .unwrap_or_else(|| peer_email.clone());
            convos.push(Conversation {
                peer_email,
                peer_name,
                messages,
            });
        }
        Ok(convos)
    }

    /// The open-chat view: full history with one peer, oldest first.
    pub fn chat_with(&self, peer: &str) -> Result<Vec<Message>> {
        let user = self.require_user()?;
        self.messages.chat_between(&user.email, peer)
    }
}
