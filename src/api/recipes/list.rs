use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
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

use super::relations::{ingredients_for_recipes, tags_for_recipes, RelationItem};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// Comma-separated tag IDs; keeps recipes with at least one of them
    pub tags: Option<String>,
    /// Comma-separated ingredient IDs; keeps recipes with at least one of them
    pub ingredients: Option<String>,
}

/// Recipe as returned in list responses: no description/steps/image.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    /// Fixed-point decimal as a string (e.g. "5.99")
    pub price: String,
    pub link: Option<String>,
    pub tags: Vec<RelationItem>,
    pub ingredients: Vec<RelationItem>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ListRecipesResponse {
    pub recipes: Vec<RecipeSummary>,
}

/// Parse a comma-separated list of UUIDs, as used by the tags/ingredients
/// filter params. Empty segments are skipped; a malformed ID is an error.
fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, String> {
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = Uuid::parse_str(part).map_err(|_| format!("Invalid ID: {}", part))?;
        ids.push(id);
    }
    Ok(ids)
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "List of user's recipes", body = ListRecipesResponse),
        (status = 400, description = "Invalid filter parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let tag_ids = match params.tags.as_deref().map(parse_id_list).transpose() {
        Ok(ids) => ids,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })).into_response()
        }
    };

    let ingredient_ids = match params.ingredients.as_deref().map(parse_id_list).transpose() {
        Ok(ids) => ids,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e })).into_response()
        }
    };

    let mut conn = get_conn!(pool);

    let mut query = recipes::table
        .filter(recipes::user_id.eq(user.id))
        .into_boxed();

    // Membership tests via subqueries keep the result free of join duplicates
    if let Some(tag_ids) = tag_ids.filter(|ids| !ids.is_empty()) {
        let matching = recipe_tags::table
            .filter(recipe_tags::tag_id.eq_any(tag_ids))
            .select(recipe_tags::recipe_id);
        query = query.filter(recipes::id.eq_any(matching));
    }

    if let Some(ingredient_ids) = ingredient_ids.filter(|ids| !ids.is_empty()) {
        let matching = recipe_ingredients::table
            .filter(recipe_ingredients::ingredient_id.eq_any(ingredient_ids))
            .select(recipe_ingredients::recipe_id);
        query = query.filter(recipes::id.eq_any(matching));
    }

    let rows: Vec<Recipe> = match query
        .select(Recipe::as_select())
        .order(recipes::created_at.desc())
        .load(&mut conn)
    {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let (mut tags_by_recipe, mut ingredients_by_recipe) =
        match tags_for_recipes(&mut conn, &ids)
            .and_then(|t| ingredients_for_recipes(&mut conn, &ids).map(|i| (t, i)))
        {
            Ok(maps) => maps,
            Err(e) => {
                tracing::error!("Failed to fetch recipe relations: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to fetch recipes".to_string(),
                    }),
                )
                    .into_response();
            }
        };

    let recipes = rows
        .into_iter()
        .map(|r| RecipeSummary {
            id: r.id,
            title: r.title,
            time_minutes: r.time_minutes,
            price: r.price.to_string(),
            link: r.link,
            tags: tags_by_recipe.remove(&r.id).unwrap_or_default(),
            ingredients: ingredients_by_recipe.remove(&r.id).unwrap_or_default(),
        })
        .collect();

    (StatusCode::OK, Json(ListRecipesResponse { recipes })).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id_list(&id.to_string()).unwrap(), vec![id]);
    }

    #[test]
    fn test_parse_multiple_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!("{},{}", a, b);
        assert_eq!(parse_id_list(&raw).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_empty_segments() {
        let a = Uuid::new_v4();
        let raw = format!(" {} , ,", a);
        assert_eq!(parse_id_list(&raw).unwrap(), vec![a]);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(parse_id_list("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_id() {
        assert!(parse_id_list("not-a-uuid").is_err());
        let a = Uuid::new_v4();
        assert!(parse_id_list(&format!("{},oops", a)).is_err());
    }
}
