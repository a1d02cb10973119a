use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::RecipeChanges;
use crate::schema::recipes;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::detail::{load_recipe_detail, RecipeDetail};
use super::price::parse_price;
use super::relations::{
    attach_ingredients, attach_tags, clear_ingredients, clear_tags, has_blank_name,
    RelationDescriptor,
};

/// Partial update. Absent fields are untouched. A present `tags` or
/// `ingredients` list (including `[]`) replaces that relation set wholesale.
/// Unknown fields, such as an attempted owner change, are silently ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    /// Fixed-point decimal as a string (e.g. "5.99")
    pub price: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub tags: Option<Vec<RelationDescriptor>>,
    pub ingredients: Option<Vec<RelationDescriptor>>,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    if let Some(ref title) = request.title {
        if title.trim().is_empty() {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Title cannot be empty".to_string(),
                }),
            )
                .into_response();
        }
    }

    if let Some(time_minutes) = request.time_minutes {
        if time_minutes < 0 {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "time_minutes cannot be negative".to_string(),
                }),
            )
                .into_response();
        }
    }

    let price = match request.price.as_deref().map(parse_price).transpose() {
        Ok(p) => p,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })).into_response()
        }
    };

    if request.tags.as_deref().is_some_and(has_blank_name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Tag name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    if request.ingredients.as_deref().is_some_and(has_blank_name) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Ingredient name cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    let mut conn = get_conn!(pool);

    // Field updates and relation reconciliation happen in one transaction
    let result: Result<bool, diesel::result::Error> = conn.transaction(|conn| {
        let owned: Option<Uuid> = recipes::table
            .filter(recipes::id.eq(id))
            .filter(recipes::user_id.eq(user.id))
            .select(recipes::id)
            .first(conn)
            .optional()?;

        if owned.is_none() {
            return Ok(false);
        }

        let changes = RecipeChanges {
            title: request.title.as_deref().map(str::trim),
            time_minutes: request.time_minutes,
            price,
            link: request.link.as_deref(),
            description: request.description.as_deref(),
            steps: request.steps.as_deref(),
        };

        diesel::update(recipes::table.find(id))
            .set((changes, recipes::updated_at.eq(Utc::now())))
            .execute(conn)?;

        // A present list replaces the whole set: detach, then re-attach
        if let Some(ref tags) = request.tags {
            clear_tags(conn, id)?;
            attach_tags(conn, user.id, id, tags)?;
        }

        if let Some(ref ingredients) = request.ingredients {
            clear_ingredients(conn, id)?;
            attach_ingredients(conn, user.id, id, ingredients)?;
        }

        Ok(true)
    });

    match result {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    match load_recipe_detail(&mut conn, user.id, id) {
        Ok(Some(detail)) => (StatusCode::OK, Json(detail)).into_response(),
        Ok(None) | Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to fetch updated recipe".to_string(),
            }),
        )
            .into_response(),
    }
}
