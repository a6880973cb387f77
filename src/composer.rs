use std::path::Path;

use base64::Engine as _;
use chrono::Utc;
use rand::Rng;
use tracing::{error, info};

use crate::facade::{ClientResult, StorageService};
use crate::models::{FeedPost, Feeling, MediaItem, MediaKind, Profile, Story};

/// The mood tags offered by the composer.
pub const FEELINGS: [(&str, &str); 14] = [
    ("😊", "Happy"),
    ("😍", "Loved"),
    ("🤩", "Excited"),
    ("🤪", "Crazy"),
    ("😌", "Blissful"),
    ("🙏", "Grateful"),
    ("😔", "Sad"),
    ("😡", "Angry"),
    ("💪", "Motivated"),
    ("😴", "Tired"),
    ("🥳", "Celebrating"),
    ("🤔", "Thinking"),
    ("😎", "Cool"),
    ("🙌", "Blessed"),
];

pub fn feeling(label: &str) -> Option<Feeling> {
    FEELINGS
        .iter()
        .find(|(_, l)| l.eq_ignore_ascii_case(label))
        .map(|(emoji, label)| Feeling { emoji: (*emoji).into(), label: (*label).into() })
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 9-character base36 id. Never reconciled with the server's row id.
pub fn client_id() -> String {
    let mut rng = rand::thread_rng();
    (0..9).map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char).collect()
}

/// Encode raw bytes as a `data:` URL, sniffing the MIME type from content.
pub fn to_data_url(bytes: &[u8]) -> MediaItem {
    let mime = infer::get(bytes).map(|t| t.mime_type()).unwrap_or("application/octet-stream");
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    MediaItem { url: format!("data:{mime};base64,{encoded}"), kind: MediaKind::from_mime(mime) }
}

/// Read a whole file into an inline data URL. No size limit is applied.
pub fn read_media_file(path: impl AsRef<Path>) -> std::io::Result<MediaItem> {
    let bytes = std::fs::read(path)?;
    Ok(to_data_url(&bytes))
}

/// Post and reel composer state.
#[derive(Debug, Default, Clone)]
pub struct PostComposer {
    content: String,
    media: Vec<MediaItem>,
    reel_mode: bool,
    feeling: Option<Feeling>,
}

impl PostComposer {
    pub fn new() -> Self { Self::default() }

    pub fn set_content(&mut self, text: impl Into<String>) { self.content = text.into(); }

    pub fn attach(&mut self, item: MediaItem) { self.media.push(item); }

    pub fn attach_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let item = read_media_file(path)?;
        self.media.push(item);
        Ok(())
    }

    pub fn remove_media(&mut self, index: usize) {
        if index < self.media.len() {
            self.media.remove(index);
        }
    }

    pub fn media(&self) -> &[MediaItem] { &self.media }

    pub fn set_reel_mode(&mut self, on: bool) { self.reel_mode = on; }

    pub fn set_feeling(&mut self, feeling: Option<Feeling>) { self.feeling = feeling; }

    /// Blank text with nothing attached cannot be posted.
    pub fn can_submit(&self) -> bool {
        !self.content.trim().is_empty() || !self.media.is_empty()
    }

    pub fn build(&self, author: &Profile) -> Option<FeedPost> {
        if !self.can_submit() {
            return None;
        }
        Some(FeedPost {
            id: client_id(),
            user_id: author.id.clone(),
            content: self.content.clone(),
            media_items: self.media.clone(),
            is_reel: self.reel_mode,
            feeling: self.feeling.clone(),
            likes: 0,
            liked_by: Vec::new(),
            comments: 0,
            comments_list: Vec::new(),
            shares: 0,
            timestamp: Utc::now(),
            author: crate::models::AuthorSnapshot { is_verified: true, ..author.snapshot() },
        })
    }

    /// Build, save and reset. An empty composer does nothing; a failed save
    /// keeps the draft.
    pub async fn submit(&mut self, author: &Profile, facade: &StorageService) -> ClientResult<Option<FeedPost>> {
        let Some(post) = self.build(author) else { return Ok(None) };
        if let Err(e) = facade.save_post(&post, &author.id).await {
            error!("failed to save post: {e}");
            return Err(e);
        }
        info!(id = %post.id, reel = post.is_reel, media = post.media_items.len(), "post submitted");
        *self = Self::default();
        Ok(Some(post))
    }
}

/// Story composer: a single selected image.
#[derive(Debug, Default, Clone)]
pub struct StoryComposer {
    image: Option<String>,
}

impl StoryComposer {
    pub fn new() -> Self { Self::default() }

    pub fn select_image(&mut self, url: impl Into<String>) { self.image = Some(url.into()); }

    pub fn select_file(&mut self, path: impl AsRef<Path>) -> std::io::Result<()> {
        self.image = Some(read_media_file(path)?.url);
        Ok(())
    }

    pub fn clear(&mut self) { self.image = None; }

    pub fn build(&self, author: &Profile) -> Option<Story> {
        let image_url = self.image.clone()?;
        Some(Story {
            id: uuid::Uuid::new_v4().to_string(),
            image_url,
            is_seen: false,
            is_me: true,
            user: author.snapshot(),
            created_at: Utc::now(),
        })
    }

    /// Hand the story to the façade (which does not persist it) and clear.
    pub async fn share(&mut self, author: &Profile, facade: &StorageService) -> ClientResult<Option<Story>> {
        let Some(story) = self.build(author) else { return Ok(None) };
        facade.save_story(&story).await?;
        self.clear();
        Ok(Some(story))
    }
}
