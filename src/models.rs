use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub type Id = i64;

// ---------------- Server rows ----------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct User {
    pub id: Id,
    pub clerk_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
}

/// Body of `POST /api/users`. Keyed on the identity provider id.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUser {
    pub clerk_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Post {
    pub id: Id,
    pub user_id: Id,
    pub content: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feed listing row: a post joined with its author's name and avatar.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct FeedRow {
    pub id: Id,
    pub user_id: Id,
    pub content: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub clerk_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Insert payload once the clerk id has been resolved to a row id.
#[derive(Debug, Clone)]
pub struct InsertPost {
    pub user_id: Id,
    pub content: String,
    pub image: Option<String>,
}

// ---------------- Client-side shapes ----------------
//
// These mirror what the browser keeps in local storage and component state,
// so they serialize camelCase.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("video") { MediaKind::Video } else { MediaKind::Image }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feeling {
    pub emoji: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub author: String,
    pub avatar: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Author fields copied onto a post when it is created. Never refreshed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSnapshot {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub media_items: Vec<MediaItem>,
    #[serde(default)]
    pub is_reel: bool,
    #[serde(default)]
    pub feeling: Option<Feeling>,
    pub likes: u32,
    #[serde(default)]
    pub liked_by: Vec<String>,
    pub comments: u32,
    #[serde(default)]
    pub comments_list: Vec<Comment>,
    pub shares: u32,
    pub timestamp: DateTime<Utc>,
    pub author: AuthorSnapshot,
}

impl From<FeedRow> for FeedPost {
    /// Engagement counters are not stored server side and come back zeroed.
    fn from(row: FeedRow) -> Self {
        let user_id = row.user_id.to_string();
        FeedPost {
            id: row.id.to_string(),
            user_id: user_id.clone(),
            content: row.content,
            media_items: row
                .image
                .map(|url| vec![MediaItem { url, kind: MediaKind::Image }])
                .unwrap_or_default(),
            is_reel: false,
            feeling: None,
            likes: 0,
            liked_by: Vec::new(),
            comments: 0,
            comments_list: Vec::new(),
            shares: 0,
            timestamp: row.created_at,
            author: AuthorSnapshot {
                id: user_id,
                display_name: row.name,
                avatar: row.avatar,
                is_verified: false,
            },
        }
    }
}

pub const STORY_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    pub image_url: String,
    #[serde(default)]
    pub is_seen: bool,
    #[serde(default)]
    pub is_me: bool,
    pub user: AuthorSnapshot,
    pub created_at: DateTime<Utc>,
}

impl Story {
    /// Nothing prunes stories; callers may use this to hide stale ones.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::hours(STORY_LIFETIME_HOURS)
    }
}

/// The rich client-side user record kept in the session blob and directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "displayName")]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub followers_count: u32,
    #[serde(default)]
    pub following_count: u32,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub wallet_balance: f64, // cosmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_photo: Option<String>,
    /// Fields written by other code paths; kept so a save does not drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn snapshot(&self) -> AuthorSnapshot {
        AuthorSnapshot {
            id: self.id.clone(),
            display_name: Some(self.name.clone()),
            avatar: Some(self.avatar.clone()),
            is_verified: self.is_verified,
        }
    }

    pub fn is_following(&self, user_id: &str) -> bool {
        self.following.iter().any(|f| f == user_id)
    }
}

/// What the identity provider hands back on sign-in / sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginData {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub following: Option<Vec<String>>,
}

/// Editable profile fields; `None` leaves the current value alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub work: Option<String>,
    pub education: Option<String>,
    pub avatar: Option<String>,
    pub cover_photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_row_maps_to_zeroed_client_post() {
        let row = FeedRow {
            id: 7,
            user_id: 3,
            content: "hello".into(),
            image: Some("data:image/png;base64,AAAA".into()),
            created_at: Utc::now(),
            name: Some("Ada".into()),
            avatar: None,
        };
        let post = FeedPost::from(row);
        assert_eq!(post.id, "7");
        assert_eq!(post.user_id, "3");
        assert_eq!(post.author.id, "3");
        assert_eq!(post.author.display_name.as_deref(), Some("Ada"));
        assert_eq!(post.media_items.len(), 1);
        assert_eq!(post.media_items[0].kind, MediaKind::Image);
        assert_eq!((post.likes, post.comments, post.shares), (0, 0, 0));
        assert!(!post.is_reel);
    }

    #[test]
    fn profile_keeps_unknown_fields() {
        let raw = r#"{"id":"u1","displayName":"Ada","following":["u2"],"theme":"dark"}"#;
        let p: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(p.name, "Ada");
        assert!(p.is_following("u2"));
        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["theme"], "dark");
        assert_eq!(back["name"], "Ada");
    }

    #[test]
    fn story_expires_after_a_day() {
        let created = Utc::now() - Duration::hours(25);
        let story = Story {
            id: "s".into(),
            image_url: "x".into(),
            is_seen: false,
            is_me: true,
            user: AuthorSnapshot::default(),
            created_at: created,
        };
        assert!(story.is_expired(Utc::now()));
        assert!(!Story { created_at: Utc::now(), ..story }.is_expired(Utc::now()));
    }

    #[test]
    fn media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("image/gif"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("application/octet-stream"), MediaKind::Image);
    }
}
