//! Tag/ingredient reconciliation for recipes.
//!
//! Submitted relations are plain name descriptors. Each one is resolved with
//! get-or-create semantics scoped to the owning user, then attached to the
//! recipe. On update, a present field (even an empty list) replaces the whole
//! set: detach everything, then re-attach the submitted names.

use crate::models::{NewIngredient, NewRecipeIngredient, NewRecipeTag, NewTag};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, tags};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// A submitted tag or ingredient: looked up by name, created if absent.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RelationDescriptor {
    pub name: String,
}

/// A tag or ingredient as returned in recipe responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RelationItem {
    pub id: Uuid,
    pub name: String,
}

/// True if any submitted name is empty or whitespace-only. Handlers reject
/// such requests with 400 before touching the database.
pub fn has_blank_name(descriptors: &[RelationDescriptor]) -> bool {
    descriptors.iter().any(|d| d.name.trim().is_empty())
}

/// Get-or-create each named tag for the user and attach it to the recipe.
pub fn attach_tags(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
    descriptors: &[RelationDescriptor],
) -> QueryResult<()> {
    for descriptor in descriptors {
        let name = descriptor.name.trim();

        let existing: Option<Uuid> = tags::table
            .filter(tags::user_id.eq(user_id))
            .filter(tags::name.eq(name))
            .select(tags::id)
            .first(conn)
            .optional()?;

        let tag_id = match existing {
            Some(id) => id,
            None => diesel::insert_into(tags::table)
                .values(NewTag { user_id, name })
                .returning(tags::id)
                .get_result(conn)?,
        };

        // Attaching the same tag twice is a no-op
        diesel::insert_into(recipe_tags::table)
            .values(NewRecipeTag { recipe_id, tag_id })
            .on_conflict_do_nothing()
            .execute(conn)?;
    }

    Ok(())
}

/// Get-or-create each named ingredient for the user and attach it to the recipe.
pub fn attach_ingredients(
    conn: &mut PgConnection,
    user_id: Uuid,
    recipe_id: Uuid,
    descriptors: &[RelationDescriptor],
) -> QueryResult<()> {
    for descriptor in descriptors {
        let name = descriptor.name.trim();

        let existing: Option<Uuid> = ingredients::table
            .filter(ingredients::user_id.eq(user_id))
            .filter(ingredients::name.eq(name))
            .select(ingredients::id)
            .first(conn)
            .optional()?;

        let ingredient_id = match existing {
            Some(id) => id,
            None => diesel::insert_into(ingredients::table)
                .values(NewIngredient { user_id, name })
                .returning(ingredients::id)
                .get_result(conn)?,
        };

        diesel::insert_into(recipe_ingredients::table)
            .values(NewRecipeIngredient {
                recipe_id,
                ingredient_id,
            })
            .on_conflict_do_nothing()
            .execute(conn)?;
    }

    Ok(())
}

/// Detach all tags from the recipe. The tag rows themselves are kept.
pub fn clear_tags(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<()> {
    diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
        .execute(conn)?;
    Ok(())
}

/// Detach all ingredients from the recipe. The ingredient rows are kept.
pub fn clear_ingredients(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<()> {
    diesel::delete(
        recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
    )
    .execute(conn)?;
    Ok(())
}

/// Tags attached to a single recipe, ordered by name.
pub fn tags_for_recipe(conn: &mut PgConnection, recipe_id: Uuid) -> QueryResult<Vec<RelationItem>> {
    let rows: Vec<(Uuid, String)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq(recipe_id))
        .select((tags::id, tags::name))
        .order(tags::name.asc())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| RelationItem { id, name })
        .collect())
}

/// Ingredients attached to a single recipe, ordered by name.
pub fn ingredients_for_recipe(
    conn: &mut PgConnection,
    recipe_id: Uuid,
) -> QueryResult<Vec<RelationItem>> {
    let rows: Vec<(Uuid, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe_id))
        .select((ingredients::id, ingredients::name))
        .order(ingredients::name.asc())
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|(id, name)| RelationItem { id, name })
        .collect())
}

/// Batch-load tags for a set of recipes, keyed by recipe id.
pub fn tags_for_recipes(
    conn: &mut PgConnection,
    recipe_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, Vec<RelationItem>>> {
    let rows: Vec<(Uuid, Uuid, String)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids))
        .select((recipe_tags::recipe_id, tags::id, tags::name))
        .order(tags::name.asc())
        .load(conn)?;

    let mut map: HashMap<Uuid, Vec<RelationItem>> = HashMap::new();
    for (recipe_id, id, name) in rows {
        map.entry(recipe_id)
            .or_default()
            .push(RelationItem { id, name });
    }
    Ok(map)
}

/// Batch-load ingredients for a set of recipes, keyed by recipe id.
pub fn ingredients_for_recipes(
    conn: &mut PgConnection,
    recipe_ids: &[Uuid],
) -> QueryResult<HashMap<Uuid, Vec<RelationItem>>> {
    let rows: Vec<(Uuid, Uuid, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .select((recipe_ingredients::recipe_id, ingredients::id, ingredients::name))
        .order(ingredients::name.asc())
        .load(conn)?;

    let mut map: HashMap<Uuid, Vec<RelationItem>> = HashMap::new();
    for (recipe_id, id, name) in rows {
        map.entry(recipe_id)
            .or_default()
            .push(RelationItem { id, name });
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_recipe, create_user, test_conn};

    fn named(names: &[&str]) -> Vec<RelationDescriptor> {
        names
            .iter()
            .map(|n| RelationDescriptor {
                name: n.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_has_blank_name() {
        assert!(!has_blank_name(&[]));
        assert!(!has_blank_name(&named(&["Indian", "Dinner"])));
        assert!(has_blank_name(&named(&["Indian", ""])));
        assert!(has_blank_name(&named(&["   "])));
    }

    #[test]
    fn test_attach_tags_reuses_existing_rows() {
        let Some(mut conn) = test_conn() else {
            return;
        };
        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            let user_id = create_user(conn, "owner@example.com");
            let curry = create_recipe(conn, user_id, "Curry");
            let dal = create_recipe(conn, user_id, "Dal");

            attach_tags(conn, user_id, curry, &named(&["Indian"]))?;
            attach_tags(conn, user_id, dal, &named(&["Indian"]))?;

            let tag_rows: i64 = tags::table
                .filter(tags::user_id.eq(user_id))
                .filter(tags::name.eq("Indian"))
                .count()
                .get_result(conn)?;
            assert_eq!(tag_rows, 1);

            assert_eq!(tags_for_recipe(conn, curry)?.len(), 1);
            assert_eq!(tags_for_recipe(conn, dal)?.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn test_attach_same_tag_twice_is_noop() {
        let Some(mut conn) = test_conn() else {
            return;
        };
        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            let user_id = create_user(conn, "owner@example.com");
            let recipe_id = create_recipe(conn, user_id, "Stew");

            attach_tags(conn, user_id, recipe_id, &named(&["Dinner"]))?;
            attach_tags(conn, user_id, recipe_id, &named(&["Dinner"]))?;

            assert_eq!(tags_for_recipe(conn, recipe_id)?.len(), 1);
            Ok(())
        });
    }

    #[test]
    fn test_clear_tags_detaches_but_keeps_rows() {
        let Some(mut conn) = test_conn() else {
            return;
        };
        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            let user_id = create_user(conn, "owner@example.com");
            let recipe_id = create_recipe(conn, user_id, "Soup");

            attach_tags(conn, user_id, recipe_id, &named(&["Vegan", "Quick"]))?;
            clear_tags(conn, recipe_id)?;
            // Re-attaching an empty submission leaves the set empty
            attach_tags(conn, user_id, recipe_id, &[])?;

            assert!(tags_for_recipe(conn, recipe_id)?.is_empty());

            let tag_rows: i64 = tags::table
                .filter(tags::user_id.eq(user_id))
                .count()
                .get_result(conn)?;
            assert_eq!(tag_rows, 2);
            Ok(())
        });
    }

    #[test]
    fn test_ingredient_get_or_create_is_scoped_to_user() {
        let Some(mut conn) = test_conn() else {
            return;
        };
        conn.test_transaction::<_, diesel::result::Error, _>(|conn| {
            let alice = create_user(conn, "alice@example.com");
            let bob = create_user(conn, "bob@example.com");
            let alice_recipe = create_recipe(conn, alice, "Omelette");
            let bob_recipe = create_recipe(conn, bob, "Scramble");

            attach_ingredients(conn, alice, alice_recipe, &named(&["Eggs"]))?;
            attach_ingredients(conn, bob, bob_recipe, &named(&["Eggs"]))?;

            let rows: i64 = ingredients::table
                .filter(ingredients::name.eq("Eggs"))
                .count()
                .get_result(conn)?;
            assert_eq!(rows, 2);

            let alice_items = ingredients_for_recipe(conn, alice_recipe)?;
            let bob_items = ingredients_for_recipe(conn, bob_recipe)?;
            assert_eq!(alice_items.len(), 1);
            assert_eq!(bob_items.len(), 1);
            assert_ne!(alice_items[0].id, bob_items[0].id);
            Ok(())
        });
    }
}
