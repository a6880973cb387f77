use std::sync::Arc;
use actix_web::{web, HttpResponse};
use tracing::info;

use crate::error::ApiError;
use crate::models::*;
use crate::repo::Repo;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/users")
                    .route(web::post().to(upsert_user)),
            )
            .service(web::resource("/users/{clerk_id}").route(web::get().to(get_user)))
            .service(
                web::resource("/posts")
                    .route(web::get().to(list_posts))
                    .route(web::post().to(create_post)),
            )
            .service(web::resource("/posts/user/{clerk_id}").route(web::get().to(list_user_posts))),
    );
}

#[derive(Clone)]
pub struct AppState { pub repo: Arc<dyn Repo> }

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "message": "VibeSocial API" }))
}

#[utoipa::path(
    get,
    path = "/api/users/{clerk_id}",
    params(("clerk_id" = String, Path, description = "Identity provider user id")),
    responses(
        (status = 200, description = "User row", body = User),
        (status = 404, description = "User not found", body = crate::error::ApiErrorBody)
    )
)]
pub async fn get_user(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let user = data.repo.get_user(&path.into_inner()).await.map_err(ApiError::user_lookup)?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UpsertUser,
    responses(
        (status = 200, description = "User created or updated", body = User)
    )
)]
pub async fn upsert_user(data: web::Data<AppState>, payload: web::Json<UpsertUser>) -> Result<HttpResponse, ApiError> {
    let user = data.repo.upsert_user(payload.into_inner()).await?;
    info!(user_id = user.id, clerk_id = %user.clerk_id, "user upserted");
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "All posts with author name/avatar, newest first", body = [FeedRow])
    )
)]
pub async fn list_posts(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let posts = data.repo.list_posts().await?;
    Ok(HttpResponse::Ok().json(posts))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = NewPost,
    responses(
        (status = 200, description = "Post created", body = Post),
        (status = 404, description = "User not found", body = crate::error::ApiErrorBody)
    )
)]
pub async fn create_post(data: web::Data<AppState>, payload: web::Json<NewPost>) -> Result<HttpResponse, ApiError> {
    let NewPost { clerk_id, content, image } = payload.into_inner();
    let user_id = data.repo.resolve_user_id(&clerk_id).await.map_err(ApiError::user_lookup)?;
    let post = data.repo.create_post(InsertPost { user_id, content, image }).await.map_err(ApiError::user_lookup)?;
    info!(post_id = post.id, user_id, "post created");
    Ok(HttpResponse::Ok().json(post))
}

#[utoipa::path(
    get,
    path = "/api/posts/user/{clerk_id}",
    params(("clerk_id" = String, Path, description = "Identity provider user id")),
    responses(
        (status = 200, description = "The user's posts, newest first", body = [Post]),
        (status = 404, description = "User not found", body = crate::error::ApiErrorBody)
    )
)]
pub async fn list_user_posts(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let user_id = data.repo.resolve_user_id(&path.into_inner()).await.map_err(ApiError::user_lookup)?;
    let posts = data.repo.list_user_posts(user_id).await?;
    Ok(HttpResponse::Ok().json(posts))
}
