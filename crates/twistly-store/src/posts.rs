use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use twistly_types::models::{Comment, Post, REACTION_EMOJIS};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::kv::KvStore;

/// What a reaction toggle did to the actor's reaction on the post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// The ephemeral post collection.
///
/// Expiry is lazy: there is no background sweep, the collection is pruned
/// whenever it is loaded. The expiry predicate is recomputed against a
/// fresh `now` on every call, never cached. The `_at` variants take an
/// explicit clock reading; the plain forms use `Utc::now()`.
#[derive(Clone)]
pub struct PostStore {
    kv: Arc<dyn KvStore>,
}

impl PostStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Decode the raw stored collection, expired entries included.
    fn all_raw(&self) -> Result<Vec<Post>> {
        match self.kv.get(keys::POSTS)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Decode {
                key: keys::POSTS,
                source,
            }),
            None => Ok(Vec::new()),
        }
    }

    /// Overwrite the entire collection. Last-writer-wins at
    /// whole-collection granularity.
    pub fn save(&self, posts: &[Post]) -> Result<()> {
        let raw = serde_json::to_string(posts).map_err(|e| StoreError::Backend(e.into()))?;
        self.kv.set(keys::POSTS, &raw)?;
        Ok(())
    }

    /// Pure read: the posts still live at `now`, newest first. Never
    /// writes.
    pub fn list_active_at(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .all_raw()?
            .into_iter()
            .filter(|p| p.is_live(now))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    pub fn list_active(&self) -> Result<Vec<Post>> {
        self.list_active_at(Utc::now())
    }

    /// Prune expired posts and persist the pruned collection. Returns how
    /// many were dropped.
    pub fn compact_at(&self, now: DateTime<Utc>) -> Result<usize> {
        let posts = self.all_raw()?;
        let before = posts.len();
        let live: Vec<Post> = posts.into_iter().filter(|p| p.is_live(now)).collect();
        let pruned = before - live.len();
        if pruned > 0 {
            debug!("pruned {} expired posts", pruned);
        }
        self.save(&live)?;
        Ok(pruned)
    }

    pub fn compact(&self) -> Result<usize> {
        self.compact_at(Utc::now())
    }

    /// The read contract: every load garbage-collects expired posts from
    /// storage, so no reader ever observes an expired post. Returns the
    /// live posts, newest first.
    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Vec<Post>> {
        self.compact_at(now)?;
        self.list_active_at(now)
    }

    pub fn load(&self) -> Result<Vec<Post>> {
        self.load_at(Utc::now())
    }

    /// Append a new post without compacting (the upload path).
    pub fn append(&self, post: Post) -> Result<()> {
        let mut posts = self.all_raw()?;
        posts.push(post);
        self.save(&posts)
    }

    /// Toggle `actor_email`'s reaction on a post. Setting the emoji the
    /// actor already holds removes it; anything else sets or overwrites
    /// it, so the actor holds at most one reaction per post. An unknown or
    /// since-expired post is a silent no-op (`Ok(None)`); an emoji outside
    /// the palette is rejected.
    pub fn toggle_reaction_at(
        &self,
        now: DateTime<Utc>,
        post_id: Uuid,
        emoji: &str,
        actor_email: &str,
    ) -> Result<Option<ToggleOutcome>> {
        if !REACTION_EMOJIS.contains(&emoji) {
            return Err(StoreError::UnknownEmoji(emoji.to_string()));
        }

        let mut posts = self.load_at(now)?;
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(None);
        };

        let outcome = if post.reactions.get(actor_email).is_some_and(|e| e == emoji) {
            post.reactions.remove(actor_email);
            ToggleOutcome::Removed
        } else {
            post.reactions
                .insert(actor_email.to_string(), emoji.to_string());
            ToggleOutcome::Added
        };

        self.save(&posts)?;
        Ok(Some(outcome))
    }

    pub fn toggle_reaction(
        &self,
        post_id: Uuid,
        emoji: &str,
        actor_email: &str,
    ) -> Result<Option<ToggleOutcome>> {
        self.toggle_reaction_at(Utc::now(), post_id, emoji, actor_email)
    }

    /// Append a comment to a post, preserving insertion order. Empty
    /// trimmed text is a validation error and mutates nothing; an unknown
    /// or expired post returns `Ok(false)`.
    pub fn add_comment_at(
        &self,
        now: DateTime<Utc>,
        post_id: Uuid,
        text: &str,
        username: &str,
    ) -> Result<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }

        let mut posts = self.load_at(now)?;
        let Some(post) = posts.iter_mut().find(|p| p.id == post_id) else {
            return Ok(false);
        };

        post.comments.push(Comment {
            username: username.to_string(),
            text: text.to_string(),
            created_at: now,
        });

        self.save(&posts)?;
        Ok(true)
    }

    pub fn add_comment(&self, post_id: Uuid, text: &str, username: &str) -> Result<bool> {
        self.add_comment_at(Utc::now(), post_id, text, username)
    }
}
