use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The fixed reaction palette. A stored reaction is always one of these six.
pub const REACTION_EMOJIS: [&str; 6] = ["❤️", "🔥", "😂", "😍", "😮", "👏"];

/// Posts stay visible for 24 hours from creation.
pub const POST_TTL_MS: i64 = 24 * 60 * 60 * 1000;

/// A registered account. Users are created on signup and never updated or
/// deleted. The password is stored as-is; nothing here is real
/// authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub password: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    /// Avatar URL.
    #[serde(default)]
    pub pfp: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// An ephemeral media post. `reactions` maps a user's email to the single
/// emoji they currently hold on this post; `comments` keep insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub author_email: String,
    /// Media payload reference, a base64 `data:` URL.
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reactions: HashMap<String, String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    /// Whether the post is still visible at `now`. Strictly less than the
    /// TTL: a post exactly 24 hours old has expired.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        (now - self.created_at).num_milliseconds() < POST_TTL_MS
    }

    /// Milliseconds until expiry, clamped at zero. Feeds the cosmetic
    /// countdown only; the authoritative check is [`Post::is_live`].
    pub fn remaining_ms(&self, now: DateTime<Utc>) -> i64 {
        (POST_TTL_MS - (now - self.created_at).num_milliseconds()).max(0)
    }

    /// How many users currently hold `emoji` on this post.
    pub fn reaction_count(&self, emoji: &str) -> usize {
        self.reactions.values().filter(|e| *e == emoji).count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub username: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A directed text message, immutable once created. Conversations are a
/// derived view over the full message collection, not a stored entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The other party of this message from `email`'s point of view, or
    /// `None` if the message does not involve `email` at all.
    pub fn counterpart<'a>(&'a self, email: &str) -> Option<&'a str> {
        if self.from == email {
            Some(&self.to)
        } else if self.to == email {
            Some(&self.from)
        } else {
            None
        }
    }
}
