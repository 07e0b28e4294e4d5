use chrono::{DateTime, Utc};
use uuid::Uuid;

use twistly_store::Result;
use twistly_store::posts::ToggleOutcome;
use twistly_store::users::default_avatar;
use twistly_types::models::{Post, REACTION_EMOJIS};

use crate::app::App;

/// A post decorated for display: resolved author, per-emoji counts and the
/// remaining lifetime for the countdown badge.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub post: Post,
    pub author_name: String,
    pub author_avatar: String,
    pub reaction_counts: Vec<(&'static str, usize)>,
    pub remaining_ms: i64,
}

impl App {
    /// Load the feed: expired posts are garbage-collected from storage,
    /// the rest come back newest first with authors resolved. An author
    /// with no user record degrades to a placeholder.
    pub fn feed(&self) -> Result<Vec<FeedPost>> {
        self.feed_at(Utc::now())
    }

    pub fn feed_at(&self, now: DateTime<Utc>) -> Result<Vec<FeedPost>> {
        let posts = self.posts.load_at(now)?;
        let users = self.users.all()?;

        let mut feed = Vec::with_capacity(posts.len());
        for post in posts {
            let author = users.iter().find(|u| u.email == post.author_email);
            let author_name = author
                .map(|u| u.username.clone())
                .unwrap_or_else(|| "Unknown".to_string());
            let author_avatar = author
                .map(|u| u.pfp.clone())
                .unwrap_or_else(|| default_avatar(&post.author_email));
            let reaction_counts = REACTION_EMOJIS
                .iter()
                .map(|&emoji| (emoji, post.reaction_count(emoji)))
                .collect();
            let remaining_ms = post.remaining_ms(now);

            feed.push(FeedPost {
                post,
                author_name,
                author_avatar,
                reaction_counts,
                remaining_ms,
            });
        }
        Ok(feed)
    }

    /// Toggle the current user's reaction on a post. Unknown or expired
    /// posts are a silent no-op; unauthenticated actors are rejected.
    pub fn toggle_reaction(&self, post_id: Uuid, emoji: &str) -> Result<Option<ToggleOutcome>> {
        let user = self.require_user()?;
        self.posts.toggle_reaction(post_id, emoji, &user.email)
    }

    /// Comment on a post as the current user. Returns `false` if the post
    /// no longer exists.
    pub fn comment(&self, post_id: Uuid, text: &str) -> Result<bool> {
        let user = self.require_user()?;
        self.posts.add_comment(post_id, text, &user.username)
    }
}
