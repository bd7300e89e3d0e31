use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::patch::nullable;

/// A post on the public content feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeedItem {
    pub content: String,
    pub image_url: Option<String>,
}

/// Partial update of a feed post. `"imageUrl": null` removes the image.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedPatch {
    #[garde(length(min = 1, max = 5000))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[garde(url)]
    pub image_url: Option<Option<String>>,
}
