use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::events::{AppEvent, EventBus};
use crate::models::{FeedPost, FeedRow, NewPost, Post, Story, UpsertUser, User};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Single entry point the views use for persistence.
///
/// Posts go to the REST backend. Post updates/deletes and stories are not
/// persisted anywhere: those calls only announce `AppEvent::DataChanged`.
#[derive(Clone)]
pub struct StorageService {
    http: reqwest::Client,
    base: String,
    events: EventBus,
}

impl StorageService {
    pub fn new(base: impl Into<String>, events: EventBus) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { http: reqwest::Client::new(), base, events }
    }

    pub fn from_config(cfg: &ClientConfig, events: EventBus) -> Self {
        Self::new(cfg.api_base.clone(), events)
    }

    pub fn events(&self) -> &EventBus { &self.events }

    async fn check(resp: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), %body, "api request failed");
        Err(ClientError::Status { status: status.as_u16(), body })
    }

    /// Full feed, mapped to the client shape with engagement counters zeroed.
    pub async fn get_all_posts(&self) -> ClientResult<Vec<FeedPost>> {
        let resp = self.http.get(format!("{}/posts", self.base)).send().await?;
        let rows: Vec<FeedRow> = Self::check(resp).await?.json().await?;
        Ok(rows.into_iter().map(FeedPost::from).collect())
    }

    /// Sends content and the first media url only. The server's id is discarded.
    pub async fn save_post(&self, post: &FeedPost, clerk_id: &str) -> ClientResult<()> {
        let body = NewPost {
            clerk_id: clerk_id.to_string(),
            content: post.content.clone(),
            image: post.media_items.first().map(|m| m.url.clone()),
        };
        let resp = self.http.post(format!("{}/posts", self.base)).json(&body).send().await?;
        Self::check(resp).await?;
        debug!(client_id = %post.id, "post saved");
        self.events.publish(AppEvent::DataChanged);
        Ok(())
    }

    pub async fn update_post(&self, post: &FeedPost) -> ClientResult<()> {
        debug!(id = %post.id, "update_post is not persisted");
        self.events.publish(AppEvent::DataChanged);
        Ok(())
    }

    pub async fn delete_post(&self, id: &str) -> ClientResult<()> {
        debug!(%id, "delete_post is not persisted");
        self.events.publish(AppEvent::DataChanged);
        Ok(())
    }

    pub async fn get_all_stories(&self) -> ClientResult<Vec<Story>> {
        Ok(Vec::new())
    }

    pub async fn save_story(&self, story: &Story) -> ClientResult<()> {
        debug!(id = %story.id, "save_story is not persisted");
        self.events.publish(AppEvent::DataChanged);
        Ok(())
    }

    pub async fn get_user(&self, clerk_id: &str) -> ClientResult<User> {
        let url = format!("{}/users/{}", self.base, urlencoding::encode(clerk_id));
        let resp = self.http.get(url).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn upsert_user(&self, user: &UpsertUser) -> ClientResult<User> {
        let resp = self.http.post(format!("{}/users", self.base)).json(user).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    pub async fn get_user_posts(&self, clerk_id: &str) -> ClientResult<Vec<Post>> {
        let url = format!("{}/posts/user/{}", self.base, urlencoding::encode(clerk_id));
        let resp = self.http.get(url).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}
