use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use twistly_store::{Result, StoreError};
use twistly_types::models::{MediaKind, Post};

use crate::app::App;

/// Classify an upload by MIME type. Anything that is not an image or a
/// video is rejected before any state is touched.
pub fn classify_media(content_type: &str) -> Result<MediaKind> {
    if content_type.starts_with("image/") {
        Ok(MediaKind::Image)
    } else if content_type.starts_with("video/") {
        Ok(MediaKind::Video)
    } else {
        Err(StoreError::UnsupportedMedia(content_type.to_string()))
    }
}

/// Inline the payload as a base64 `data:` URL, the shape the post
/// collection stores.
pub fn to_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, B64.encode(bytes))
}

impl App {
    /// Publish a new post from raw media bytes. Requires a registered
    /// user. Appends to the stored collection without compacting it; the
    /// next feed load prunes.
    pub fn create_post(&self, content_type: &str, bytes: &[u8]) -> Result<Post> {
        let user = self.require_user()?;
        let kind = classify_media(content_type)?;

        let post = Post {
            id: Uuid::new_v4(),
            author_email: user.email,
            url: to_data_url(content_type, bytes),
            kind,
            created_at: Utc::now(),
            reactions: HashMap::new(),
            comments: Vec::new(),
        };
        self.posts.append(post.clone())?;
        info!("new {:?} post {} by {}", kind, post.id, post.author_email);
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_mime_prefix() {
        assert_eq!(classify_media("image/png").unwrap(), MediaKind::Image);
        assert_eq!(classify_media("video/mp4").unwrap(), MediaKind::Video);
        assert!(matches!(
            classify_media("text/plain"),
            Err(StoreError::UnsupportedMedia(_))
        ));
        assert!(matches!(
            classify_media("application/pdf"),
            Err(StoreError::UnsupportedMedia(_))
        ));
    }

    #[test]
    fn data_url_embeds_type_and_payload() {
        assert_eq!(
            to_data_url("image/png", &[0x89, 0x50]),
            "data:image/png;base64,iVA="
        );
    }
}
