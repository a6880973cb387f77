use async_trait::async_trait;

use crate::models::*;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("internal: {0}")] Internal(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_user(&self, clerk_id: &str) -> RepoResult<User>;
    /// Insert, or overwrite name/email/avatar/bio of the row with the same clerk id.
    async fn upsert_user(&self, new: UpsertUser) -> RepoResult<User>;
    async fn resolve_user_id(&self, clerk_id: &str) -> RepoResult<Id>;
}

#[async_trait]
pub trait PostRepo: Send + Sync {
    /// Every post with its author, newest first.
    async fn list_posts(&self) -> RepoResult<Vec<FeedRow>>;
    async fn create_post(&self, new: InsertPost) -> RepoResult<Post>;
    async fn list_user_posts(&self, user_id: Id) -> RepoResult<Vec<Post>>;
}

pub trait Repo: UserRepo + PostRepo {}

impl<T> Repo for T where T: UserRepo + PostRepo {}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use chrono::Utc;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, RwLock};
    use tracing::{info, warn};

    #[derive(Default, Serialize, Deserialize)]
    struct State {
        users: HashMap<Id, User>,
        posts: HashMap<Id, Post>,
        next_id: Id,
    }

    /// Map-backed repository. Optionally mirrored to a JSON snapshot file.
    #[derive(Clone, Default)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
        snapshot_path: Option<Arc<PathBuf>>,
    }

    impl InMemRepo {
        pub fn new() -> Self { Self::default() }

        pub fn with_snapshot(path: impl Into<PathBuf>) -> Self {
            let path = path.into();
            let state = Self::load_state_from(&path);
            Self {
                state: Arc::new(RwLock::new(state)),
                snapshot_path: Some(Arc::new(path)),
            }
        }

        fn load_state_from(path: &Path) -> State {
            match std::fs::read(path) {
                Ok(bytes) => match serde_json::from_slice::<State>(&bytes) {
                    Ok(s) => {
                        info!("loaded snapshot '{}'", path.display());
                        s
                    }
                    Err(e) => {
                        warn!("failed to parse snapshot '{}': {e}. Starting empty.", path.display());
                        State::default()
                    }
                },
                Err(e) => {
                    info!("no snapshot at '{}': {e}. Starting empty.", path.display());
                    State::default()
                }
            }
        }

        fn persist(&self, state: &State) {
            let Some(path) = self.snapshot_path.as_deref() else { return };
            match serde_json::to_vec_pretty(state) {
                Ok(bytes) => {
                    if let Some(dir) = path.parent() {
                        let _ = std::fs::create_dir_all(dir);
                    }
                    if let Err(e) = std::fs::write(path, bytes) {
                        warn!("failed to write snapshot '{}': {e}", path.display());
                    }
                }
                Err(e) => warn!("failed to encode snapshot: {e}"),
            }
        }

        fn next_id(state: &mut State) -> Id {
            state.next_id += 1;
            state.next_id
        }

        fn lock_err<E: std::fmt::Display>(e: E) -> RepoError {
            RepoError::Internal(format!("state lock poisoned: {e}"))
        }
    }

    #[async_trait]
    impl UserRepo for InMemRepo {
        async fn get_user(&self, clerk_id: &str) -> RepoResult<User> {
            let s = self.state.read().map_err(Self::lock_err)?;
            s.users.values().find(|u| u.clerk_id == clerk_id).cloned().ok_or(RepoError::NotFound)
        }

        async fn upsert_user(&self, new: UpsertUser) -> RepoResult<User> {
            let mut s = self.state.write().map_err(Self::lock_err)?;
            let existing = s.users.values().find(|u| u.clerk_id == new.clerk_id).map(|u| u.id);
            let id = match existing {
                Some(id) => id,
                None => Self::next_id(&mut s),
            };
            let user = User {
                id,
                clerk_id: new.clerk_id,
                name: new.name,
                email: new.email,
                avatar: new.avatar,
                bio: new.bio,
            };
            s.users.insert(id, user.clone());
            self.persist(&s);
            Ok(user)
        }

        async fn resolve_user_id(&self, clerk_id: &str) -> RepoResult<Id> {
            self.get_user(clerk_id).await.map(|u| u.id)
        }
    }

    #[async_trait]
    impl PostRepo for InMemRepo {
        async fn list_posts(&self) -> RepoResult<Vec<FeedRow>> {
            let s = self.state.read().map_err(Self::lock_err)?;
            let mut v: Vec<FeedRow> = s
                .posts
                .values()
                .filter_map(|p| {
                    // inner join: posts whose author vanished are skipped
                    let u = s.users.get(&p.user_id)?;
                    Some(FeedRow {
                        id: p.id,
                        user_id: p.user_id,
                        content: p.content.clone(),
                        image: p.image.clone(),
                        created_at: p.created_at,
                        name: u.name.clone(),
                        avatar: u.avatar.clone(),
                    })
                })
                .collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(v)
        }

        async fn create_post(&self, new: InsertPost) -> RepoResult<Post> {
            let mut s = self.state.write().map_err(Self::lock_err)?;
            if !s.users.contains_key(&new.user_id) { return Err(RepoError::NotFound); }
            let id = Self::next_id(&mut s);
            let post = Post {
                id,
                user_id: new.user_id,
                content: new.content,
                image: new.image,
                created_at: Utc::now(),
            };
            s.posts.insert(id, post.clone());
            self.persist(&s);
            Ok(post)
        }

        async fn list_user_posts(&self, user_id: Id) -> RepoResult<Vec<Post>> {
            let s = self.state.read().map_err(Self::lock_err)?;
            let mut v: Vec<Post> = s.posts.values().filter(|p| p.user_id == user_id).cloned().collect();
            v.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(v)
        }
    }
}

#[cfg(feature = "postgres-store")]
pub mod pg {
    use super::*;
    use sqlx::{Pool, Postgres};

    impl From<sqlx::Error> for RepoError {
        fn from(e: sqlx::Error) -> Self {
            match e {
                sqlx::Error::RowNotFound => RepoError::NotFound,
                sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Conflict,
                sqlx::Error::Database(db) if db.is_foreign_key_violation() => RepoError::NotFound,
                other => RepoError::Internal(other.to_string()),
            }
        }
    }

    #[derive(Clone)]
    pub struct PgRepo { pool: Pool<Postgres> }

    impl PgRepo {
        pub fn new(pool: Pool<Postgres>) -> Self { Self { pool } }
    }

    #[async_trait]
    impl UserRepo for PgRepo {
        async fn get_user(&self, clerk_id: &str) -> RepoResult<User> {
            let rec = sqlx::query_as::<_, User>(
                "SELECT id, clerk_id, name, email, avatar, bio FROM users WHERE clerk_id = $1"
            )
            .bind(clerk_id)
            .fetch_one(&self.pool).await?;
            Ok(rec)
        }

        async fn upsert_user(&self, new: UpsertUser) -> RepoResult<User> {
            let rec = sqlx::query_as::<_, User>(r#"
                INSERT INTO users (clerk_id, name, email, avatar, bio) VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (clerk_id) DO UPDATE
                   SET name = EXCLUDED.name, email = EXCLUDED.email,
                       avatar = EXCLUDED.avatar, bio = EXCLUDED.bio
                RETURNING id, clerk_id, name, email, avatar, bio
            "#)
            .bind(&new.clerk_id)
            .bind(new.name.as_ref())
            .bind(new.email.as_ref())
            .bind(new.avatar.as_ref())
            .bind(new.bio.as_ref())
            .fetch_one(&self.pool).await?;
            Ok(rec)
        }

        async fn resolve_user_id(&self, clerk_id: &str) -> RepoResult<Id> {
            let (id,): (Id,) = sqlx::query_as("SELECT id FROM users WHERE clerk_id = $1")
                .bind(clerk_id)
                .fetch_one(&self.pool).await?;
            Ok(id)
        }
    }

    #[async_trait]
    impl PostRepo for PgRepo {
        async fn list_posts(&self) -> RepoResult<Vec<FeedRow>> {
            let recs = sqlx::query_as::<_, FeedRow>(r#"
                SELECT p.id, p.user_id, p.content, p.image, p.created_at, u.name, u.avatar
                FROM posts p
                JOIN users u ON p.user_id = u.id
                ORDER BY p.created_at DESC, p.id DESC
            "#)
            .fetch_all(&self.pool).await?;
            Ok(recs)
        }

        async fn create_post(&self, new: InsertPost) -> RepoResult<Post> {
            let rec = sqlx::query_as::<_, Post>(
                "INSERT INTO posts (user_id, content, image) VALUES ($1, $2, $3) RETURNING id, user_id, content, image, created_at"
            )
            .bind(new.user_id)
            .bind(&new.content)
            .bind(new.image.as_ref())
            .fetch_one(&self.pool).await?;
            Ok(rec)
        }

        async fn list_user_posts(&self, user_id: Id) -> RepoResult<Vec<Post>> {
            let recs = sqlx::query_as::<_, Post>(
                "SELECT id, user_id, content, image, created_at FROM posts WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
            )
            .bind(user_id)
            .fetch_all(&self.pool).await?;
            Ok(recs)
        }
    }
}
