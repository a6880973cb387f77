//! Likes and comments. These live on the in-memory post only; the façade's
//! `update_post` is called afterwards but persists nothing.

use chrono::Utc;

use crate::composer::client_id;
use crate::facade::{ClientResult, StorageService};
use crate::models::{Comment, FeedPost, Profile};

pub fn is_liked_by(post: &FeedPost, user_id: &str) -> bool {
    post.liked_by.iter().any(|id| id == user_id)
}

/// Flip `user_id`'s like. Returns the new liked state.
pub fn toggle_like(post: &mut FeedPost, user_id: &str) -> bool {
    if is_liked_by(post, user_id) {
        post.liked_by.retain(|id| id != user_id);
        post.likes = post.likes.saturating_sub(1);
        false
    } else {
        post.liked_by.push(user_id.to_string());
        post.likes += 1;
        true
    }
}

/// Double tap only ever likes. Returns whether anything changed.
pub fn double_tap_like(post: &mut FeedPost, user_id: &str) -> bool {
    if is_liked_by(post, user_id) {
        return false;
    }
    toggle_like(post, user_id)
}

/// Append a comment and bump the counter. Blank text is ignored.
pub fn add_comment(post: &mut FeedPost, author: &Profile, text: &str) -> Option<Comment> {
    if text.trim().is_empty() {
        return None;
    }
    let comment = Comment {
        id: client_id(),
        user_id: author.id.clone(),
        author: author.name.clone(),
        avatar: author.avatar.clone(),
        text: text.to_string(),
        timestamp: Utc::now(),
    };
    post.comments += 1;
    post.comments_list.push(comment.clone());
    Some(comment)
}

pub async fn like_and_sync(post: &mut FeedPost, user_id: &str, facade: &StorageService) -> ClientResult<bool> {
    let liked = toggle_like(post, user_id);
    facade.update_post(post).await?;
    Ok(liked)
}

pub async fn comment_and_sync(
    post: &mut FeedPost,
    author: &Profile,
    text: &str,
    facade: &StorageService,
) -> ClientResult<Option<Comment>> {
    let Some(comment) = add_comment(post, author, text) else { return Ok(None) };
    facade.update_post(post).await?;
    Ok(Some(comment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthorSnapshot;

    fn reel() -> FeedPost {
        FeedPost {
            id: "r1".into(),
            user_id: "u1".into(),
            content: "clip".into(),
            media_items: vec![],
            is_reel: true,
            feeling: None,
            likes: 4,
            liked_by: vec![],
            comments: 0,
            comments_list: vec![],
            shares: 0,
            timestamp: Utc::now(),
            author: AuthorSnapshot::default(),
        }
    }

    #[test]
    fn like_toggles_and_tracks_membership() {
        let mut p = reel();
        assert!(toggle_like(&mut p, "me"));
        assert_eq!(p.likes, 5);
        assert!(is_liked_by(&p, "me"));
        assert!(!toggle_like(&mut p, "me"));
        assert_eq!(p.likes, 4);
        assert!(p.liked_by.is_empty());
    }

    #[test]
    fn double_tap_never_unlikes() {
        let mut p = reel();
        assert!(double_tap_like(&mut p, "me"));
        assert!(!double_tap_like(&mut p, "me"));
        assert_eq!(p.likes, 5);
    }

    #[test]
    fn comments_keep_counter_in_step() {
        let mut p = reel();
        let me = Profile { id: "me".into(), name: "Me".into(), ..Profile::default() };
        assert!(add_comment(&mut p, &me, "  ").is_none());
        let c = add_comment(&mut p, &me, "nice").unwrap();
        assert_eq!(c.author, "Me");
        assert_eq!(p.comments as usize, p.comments_list.len());
    }
}
