use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::{ingredients, recipe_ingredients};
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
pub struct ListIngredientsParams {
    /// When 1, only ingredients attached to at least one recipe are returned
    pub assigned_only: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientItem {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientsListResponse {
    pub ingredients: Vec<IngredientItem>,
}

#[utoipa::path(
    get,
    path = "/api/ingredients",
    tag = "ingredients",
    params(ListIngredientsParams),
    responses(
        (status = 200, description = "List of user's ingredients", body = IngredientsListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_ingredients(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListIngredientsParams>,
) -> impl IntoResponse {
    let assigned_only = params.assigned_only.unwrap_or(0) != 0;

    let mut conn = get_conn!(pool);

    let mut query = ingredients::table
        .filter(ingredients::user_id.eq(user.id))
        .into_boxed();

    if assigned_only {
        let assigned = recipe_ingredients::table.select(recipe_ingredients::ingredient_id);
        query = query.filter(ingredients::id.eq_any(assigned));
    }

    let rows: Vec<(Uuid, String)> = match query
        .select((ingredients::id, ingredients::name))
        .order(ingredients::name.desc())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch ingredients: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch ingredients".to_string(),
                }),
            )
                .into_response();
        }
    };

    let response = IngredientsListResponse {
        ingredients: rows
            .into_iter()
            .map(|(id, name)| IngredientItem { id, name })
            .collect(),
    };

    (StatusCode::OK, Json(response)).into_response()
}
