use rand::seq::SliceRandom;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, warn};

use crate::ai::GenAiClient;
use crate::events::AppEvent;
use crate::facade::StorageService;
use crate::models::{FeedPost, Profile, Story};

pub const QUIET_FEED: &str = "The feed is currently quiet. Be the first to start a conversation!";
pub const NO_INSIGHT: &str = "AI insight not available.";
pub const SUMMARY_WINDOW: usize = 10;
pub const DISCOVERY_SIZE: usize = 5;

/// Case-insensitive substring match over content and author name.
/// A blank query keeps everything.
pub fn filter_posts<'a>(posts: &'a [FeedPost], query: &str) -> Vec<&'a FeedPost> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return posts.iter().collect();
    }
    posts
        .iter()
        .filter(|p| {
            p.content.to_lowercase().contains(&q)
                || p.author.display_name.as_deref().is_some_and(|n| n.to_lowercase().contains(&q))
        })
        .collect()
}

pub fn posts_by_user<'a>(posts: &'a [FeedPost], user_id: &str) -> Vec<&'a FeedPost> {
    posts.iter().filter(|p| p.user_id == user_id).collect()
}

/// Up to `n` random directory users other than `me`.
pub fn discovery_users(directory: &[Profile], me: &str, n: usize) -> Vec<Profile> {
    let others: Vec<&Profile> = directory.iter().filter(|u| u.id != me).collect();
    others
        .choose_multiple(&mut rand::thread_rng(), n)
        .map(|u| (*u).clone())
        .collect()
}

/// Client view of the feed: the whole post collection plus the active query.
#[derive(Default)]
pub struct Feed {
    posts: Vec<FeedPost>,
    stories: Vec<Story>,
    query: String,
}

impl Feed {
    pub fn new() -> Self { Self::default() }

    /// Replace posts and stories from the façade. On failure the previous
    /// contents stay in place.
    pub async fn load(&mut self, facade: &StorageService) {
        match facade.get_all_posts().await {
            Ok(posts) => self.posts = posts,
            Err(e) => error!("failed to load posts: {e}"),
        }
        match facade.get_all_stories().await {
            Ok(stories) => self.stories = stories,
            Err(e) => error!("failed to load stories: {e}"),
        }
    }

    /// Apply one bus event. Returns `false` once the bus is closed.
    pub async fn next_event(&mut self, facade: &StorageService, rx: &mut broadcast::Receiver<AppEvent>) -> bool {
        match rx.recv().await {
            Ok(AppEvent::DataChanged) => self.load(facade).await,
            Ok(AppEvent::Search(q)) => self.set_query(q),
            Ok(AppEvent::Storage { .. }) => self.load(facade).await,
            Err(RecvError::Lagged(n)) => {
                warn!(missed = n, "feed lagged behind events; reloading");
                self.load(facade).await;
            }
            Err(RecvError::Closed) => return false,
        }
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) { self.query = query.into(); }

    pub fn query(&self) -> &str { &self.query }

    pub fn posts(&self) -> &[FeedPost] { &self.posts }

    pub fn stories(&self) -> &[Story] { &self.stories }

    /// Filtered standard posts.
    pub fn visible_posts(&self) -> Vec<&FeedPost> {
        filter_posts(&self.posts, &self.query).into_iter().filter(|p| !p.is_reel).collect()
    }

    /// All reels. The search box does not apply to the reels shelf.
    pub fn reels(&self) -> Vec<&FeedPost> {
        self.posts.iter().filter(|p| p.is_reel).collect()
    }

    /// Replace one post in place (after a like or comment on it).
    pub fn replace_post(&mut self, post: FeedPost) {
        if let Some(slot) = self.posts.iter_mut().find(|p| p.id == post.id) {
            *slot = post;
        }
    }

    pub async fn summary(&self, ai: &GenAiClient) -> String {
        if self.posts.is_empty() {
            return QUIET_FEED.to_string();
        }
        let window = &self.posts[..self.posts.len().min(SUMMARY_WINDOW)];
        let text = ai.feed_summary(window).await;
        if text.is_empty() { NO_INSIGHT.to_string() } else { text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorSnapshot;
    use chrono::Utc;

    fn post(id: &str, content: &str, author: &str, reel: bool) -> FeedPost {
        FeedPost {
            id: id.into(),
            user_id: format!("u-{author}"),
            content: content.into(),
            media_items: vec![],
            is_reel: reel,
            feeling: None,
            likes: 0,
            liked_by: vec![],
            comments: 0,
            comments_list: vec![],
            shares: 0,
            timestamp: Utc::now(),
            author: AuthorSnapshot { id: format!("u-{author}"), display_name: Some(author.into()), avatar: None, is_verified: false },
        }
    }

    #[test]
    fn filter_matches_content_or_author_case_insensitively() {
        let posts = vec![post("1", "Sunset at the BEACH", "ada", false), post("2", "coffee", "Grace", false)];
        assert_eq!(filter_posts(&posts, "beach").len(), 1);
        assert_eq!(filter_posts(&posts, "GRACE")[0].id, "2");
        assert_eq!(filter_posts(&posts, "   ").len(), 2);
        assert!(filter_posts(&posts, "zebra").is_empty());
    }

    #[test]
    fn reels_ignore_the_query() {
        let mut feed = Feed::new();
        feed.posts = vec![post("1", "cat video", "ada", true), post("2", "dog pic", "ada", false)];
        feed.set_query("dog");
        assert_eq!(feed.visible_posts().len(), 1);
        assert_eq!(feed.reels().len(), 1);
        feed.set_query("nothing matches");
        assert!(feed.visible_posts().is_empty());
        assert_eq!(feed.reels()[0].id, "1");
    }

    #[test]
    fn discovery_excludes_me_and_caps() {
        let dir: Vec<Profile> = (0..8).map(|i| Profile { id: format!("u{i}"), ..Profile::default() }).collect();
        let picked = discovery_users(&dir, "u0", DISCOVERY_SIZE);
        assert_eq!(picked.len(), DISCOVERY_SIZE);
        assert!(picked.iter().all(|p| p.id != "u0"));
        assert_eq!(discovery_users(&dir[..2], "u0", DISCOVERY_SIZE).len(), 1);
    }

    #[tokio::test]
    async fn quiet_feed_summary_skips_ai() {
        let ai = GenAiClient::new(Some("k".into()), "m", "http://127.0.0.1:9");
        assert_eq!(Feed::new().summary(&ai).await, QUIET_FEED);
    }
}
