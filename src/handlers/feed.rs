use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use garde::Validate;
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::feed::{FeedItem, FeedPatch, NewFeedItem},
    state::AppState,
};

/// The request payload for a new feed post.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedItemRequest {
    #[garde(length(min = 1, max = 5000))]
    pub content: String,
    #[serde(default)]
    #[garde(url)]
    pub image_url: Option<String>,
}

/// Lists the public feed, newest first.
#[axum::debug_handler]
pub async fn list_feed(State(state): State<AppState>) -> Result<Json<Vec<FeedItem>>> {
    Ok(Json(state.store.list_feed().await?))
}

/// Publishes a feed post.
#[axum::debug_handler]
pub async fn create_feed_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateFeedItemRequest>,
) -> Result<Response> {
    payload.validate()?;
    let item = state
        .store
        .create_feed_item(NewFeedItem {
            content: payload.content,
            image_url: payload.image_url,
        })
        .await?;
    tracing::info!("📰 Feed item {} published", item.id);
    Ok((StatusCode::CREATED, Json(item)).into_response())
}

/// Edits a feed post.
#[axum::debug_handler]
pub async fn update_feed_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
    Json(patch): Json<FeedPatch>,
) -> Result<Json<FeedItem>> {
    patch.validate()?;
    let item = state
        .store
        .update_feed_item(item_id, patch)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(item))
}

/// Removes a feed post.
#[axum::debug_handler]
pub async fn delete_feed_item(
    State(state): State<AppState>,
    Path(item_id): Path<i64>,
) -> Result<StatusCode> {
    if !state.store.delete_feed_item(item_id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
