use crate::error::ApiErrorBody;
use crate::models::{FeedRow, NewPost, Post, UpsertUser, User};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::get_user,
        crate::routes::upsert_user,
        crate::routes::list_posts,
        crate::routes::create_post,
        crate::routes::list_user_posts,
    ),
    components(schemas(User, UpsertUser, Post, FeedRow, NewPost, ApiErrorBody)),
    tags(
        (name = "users", description = "User operations"),
        (name = "posts", description = "Post operations"),
    )
)]
pub struct ApiDoc;
