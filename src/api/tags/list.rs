use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{recipe_tags, tags};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTagsParams {
    /// When 1, only tags attached to at least one recipe are returned
    pub assigned_only: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagItem {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagsListResponse {
    pub tags: Vec<TagItem>,
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    params(ListTagsParams),
    responses(
        (status = 200, description = "List of user's tags", body = TagsListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListTagsParams>,
) -> impl IntoResponse {
    let assigned_only = params.assigned_only.unwrap_or(0) != 0;

    let mut conn = get_conn!(pool);

    let mut query = tags::table.filter(tags::user_id.eq(user.id)).into_boxed();

    if assigned_only {
        // Tags are user-scoped, so membership in the junction table already
        // restricts to the requester's own recipes. The subquery de-duplicates.
        let assigned = recipe_tags::table.select(recipe_tags::tag_id);
        query = query.filter(tags::id.eq_any(assigned));
    }

    let rows: Vec<(Uuid, String)> = match query
        .select((tags::id, tags::name))
        .order(tags::name.desc())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch tags: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch tags".to_string(),
                }),
            )
                .into_response();
        }
    };

    let response = TagsListResponse {
        tags: rows
            .into_iter()
            .map(|(id, name)| TagItem { id, name })
            .collect(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
