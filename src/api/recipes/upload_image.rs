use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::media;
use crate::schema::recipes;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

const IMAGE_FIELD: &str = "image";

fn is_image_field(name: Option<&str>) -> bool {
    name == Some(IMAGE_FIELD)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadImageResponse {
    pub id: Uuid,
    /// Path of the stored image, relative to the media root
    pub image: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadImageRequest {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/recipes/{id}/image",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body(content_type = "multipart/form-data", content = UploadImageRequest),
    responses(
        (status = 200, description = "Image uploaded successfully", body = UploadImageResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_image(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "No file provided".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!("Multipart read error: {}", e);
            return (
                e.status(),
                Json(ErrorResponse {
                    error: format!("Failed to read multipart data: {}", e.body_text()),
                }),
            )
                .into_response();
        }
    };

    if !is_image_field(field.name()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Expected a multipart field named '{}'", IMAGE_FIELD),
            }),
        )
            .into_response();
    }

    let data = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Field read error: {}", e);
            return (
                e.status(),
                Json(ErrorResponse {
                    error: format!("Failed to read file data: {}", e.body_text()),
                }),
            )
                .into_response();
        }
    };

    if data.len() > media::MAX_FILE_SIZE {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("File too large. Maximum size is {} bytes", media::MAX_FILE_SIZE),
            }),
        )
            .into_response();
    }

    let format = match media::validate_image(&data) {
        Ok(f) => f,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    };

    let mut conn = get_conn!(pool);

    let old_image: Option<String> = match recipes::table
        .filter(recipes::id.eq(id))
        .filter(recipes::user_id.eq(user.id))
        .select(recipes::image_path)
        .first(&mut conn)
    {
        Ok(path) => path,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    let media_root = media::media_root();
    let relative = media::image_file_path(format);

    if let Err(e) = media::store_image(&media_root, &relative, &data) {
        tracing::error!("Failed to store image: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to store image".to_string(),
            }),
        )
            .into_response();
    }

    match diesel::update(recipes::table.find(id))
        .set((
            recipes::image_path.eq(&relative),
            recipes::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Failed to update recipe image: {}", e);
            media::remove_image(&media_root, &relative);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    // Replaced images are cleaned up after the new path is committed
    if let Some(ref old) = old_image {
        media::remove_image(&media_root, old);
    }

    (
        StatusCode::OK,
        Json(UploadImageResponse {
            id,
            image: relative,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_the_image_field_is_accepted() {
        assert!(is_image_field(Some("image")));
        assert!(!is_image_field(Some("file")));
        assert!(!is_image_field(Some("Image")));
        assert!(!is_image_field(None));
    }
}
