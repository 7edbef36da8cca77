use http::StatusCode;
use serde::{Deserialize, Serialize};

use super::{json, query, ApiResponse};
use crate::error::AppError;
use crate::gallery::list_images;
use crate::FestivalState;

#[derive(Deserialize)]
struct GalleryQuery {
    folder: Option<String>,
}

#[derive(Serialize)]
struct Images {
    images: Vec<String>,
}

pub async fn list(state: &FestivalState, raw_query: Option<&str>) -> Result<ApiResponse, AppError> {
    let GalleryQuery { folder } = query(raw_query)?;
    let images = list_images(&state.config.public_dir, folder.as_deref()).await?;
    json(StatusCode::OK, &Images { images })
}
