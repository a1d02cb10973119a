use crate::models::Recipe;
use crate::schema::recipes;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::relations::{ingredients_for_recipe, tags_for_recipe, RelationItem};

/// Full recipe representation returned by create, get, and update.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    /// Fixed-point decimal, serialized as a string (e.g. "5.99")
    pub price: String,
    pub link: Option<String>,
    pub tags: Vec<RelationItem>,
    pub ingredients: Vec<RelationItem>,
    pub description: Option<String>,
    pub steps: Option<String>,
    /// Path of the uploaded image, relative to the media root
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Load a recipe owned by the user with its relation sets.
/// Returns `Ok(None)` when the recipe is missing or owned by someone else.
pub fn load_recipe_detail(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
) -> QueryResult<Option<RecipeDetail>> {
    let recipe: Recipe = match recipes::table
        .filter(recipes::id.eq(recipe_id))
        .filter(recipes::user_id.eq(user_id))
        .select(Recipe::as_select())
        .first(conn)
    {
        Ok(r) => r,
        Err(diesel::NotFound) => return Ok(None),
        Err(e) => return Err(e),
    };

    let tags = tags_for_recipe(conn, recipe.id)?;
    let ingredients = ingredients_for_recipe(conn, recipe.id)?;

    Ok(Some(RecipeDetail {
        id: recipe.id,
        title: recipe.title,
        time_minutes: recipe.time_minutes,
        price: recipe.price.to_string(),
        link: recipe.link,
        tags,
        ingredients,
        description: recipe.description,
        steps: recipe.steps,
        image: recipe.image_path,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::relations::{attach_ingredients, attach_tags, RelationDescriptor};
    use super::*;
    use crate::test_support::{create_recipe, create_user, test_conn};

    #[test]
    fn test_detail_hidden_from_other_users() {
        let Some(mut conn) = test_conn() else {
            return;
        };
        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            let owner = create_user(conn, "owner@example.com");
            let other = create_user(conn, "other@example.com");
            let recipe_id = create_recipe(conn, owner, "Private dish");

            assert!(load_recipe_detail(conn, owner, recipe_id)?.is_some());
            assert!(load_recipe_detail(conn, other, recipe_id)?.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_detail_carries_relation_sets() {
        let Some(mut conn) = test_conn() else {
            return;
        };
        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            let owner = create_user(conn, "owner@example.com");
            let recipe_id = create_recipe(conn, owner, "Pasta");

            let tags = vec![
                RelationDescriptor {
                    name: "Dinner".to_string(),
                },
                RelationDescriptor {
                    name: "Comfort".to_string(),
                },
            ];
            let ingredients = vec![RelationDescriptor {
                name: "Tomato".to_string(),
            }];
            attach_tags(conn, owner, recipe_id, &tags)?;
            attach_ingredients(conn, owner, recipe_id, &ingredients)?;

            let detail = load_recipe_detail(conn, owner, recipe_id)?.unwrap();
            let tag_names: Vec<&str> = detail.tags.iter().map(|t| t.name.as_str()).collect();
            assert_eq!(tag_names, vec!["Comfort", "Dinner"]);
            assert_eq!(detail.ingredients.len(), 1);
            assert_eq!(detail.ingredients[0].name, "Tomato");
            assert_eq!(detail.price, "12.50");
            Ok(())
        });
    }
}
