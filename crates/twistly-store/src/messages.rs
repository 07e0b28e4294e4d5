use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use twistly_types::models::Message;

use crate::error::{Result, StoreError};
use crate::keys;
use crate::kv::KvStore;

/// The directed-message collection. Messages are immutable once created;
/// conversations are derived from the full collection on every read, with
/// no pagination or windowing.
#[derive(Clone)]
pub struct MessageStore {
    kv: Arc<dyn KvStore>,
}

impl MessageStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    pub fn all(&self) -> Result<Vec<Message>> {
        match self.kv.get(keys::MESSAGES)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                key: keys::MESSAGES,
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, messages: &[Message]) -> Result<()> {
        let raw = serde_json::to_string(messages).map_err(|e| StoreError::Backend(e.into()))?;
        self.kv.set(keys::MESSAGES, &raw)?;
        Ok(())
    }

    /// Append a new immutable message. Empty trimmed text is a validation
    /// error and writes nothing.
    pub fn send(&self, from: &str, to: &str, text: &str) -> Result<Message> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }

        let message = Message {
            id: Uuid::new_v4(),
            from: from.to_string(),
            to: to.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };

        let mut all = self.all()?;
        all.push(message.clone());
        self.save(&all)?;
        Ok(message)
    }

    /// Partition every message touching `email` into groups keyed by the
    /// counterpart, each group ascending by time. The partition is
    /// disjoint: each message lands in exactly one group. A `BTreeMap`
    /// keeps the derivation deterministic.
    pub fn conversations_for(&self, email: &str) -> Result<BTreeMap<String, Vec<Message>>> {
        let mut convos: BTreeMap<String, Vec<Message>> = BTreeMap::new();
        for msg in self.all()? {
            if let Some(other) = msg.counterpart(email) {
                convos.entry(other.to_string()).or_default().push(msg);
            }
        }
        for group in convos.values_mut() {
            group.sort_by_key(|m| m.created_at);
        }
        Ok(convos)
    }

    /// The full history between exactly `a` and `b`, oldest first.
    pub fn chat_between(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        let mut chat: Vec<Message> = self
            .all()?
            .into_iter()
            .filter(|m| (m.from == a && m.to == b) || (m.from == b && m.to == a))
            .collect();
        chat.sort_by_key(|m| m.created_at);
        Ok(chat)
    }
}
