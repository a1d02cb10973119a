//! Helpers for tests that exercise a real PostgreSQL database.
//!
//! Set `TEST_DATABASE_URL` to run them; when it is unset the tests return
//! early and pass. Each test wraps its work in `test_transaction` so nothing
//! is left behind.

use crate::models::{NewRecipe, NewUser};
use crate::schema::{recipes, users};
use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use std::str::FromStr;
use uuid::Uuid;

pub fn test_conn() -> Option<PgConnection> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let mut conn =
        PgConnection::establish(&url).expect("Failed to connect to test database");
    conn.run_pending_migrations(crate::db::MIGRATIONS)
        .expect("Failed to run migrations on test database");
    Some(conn)
}

pub fn create_user(conn: &mut PgConnection, email: &str) -> Uuid {
    diesel::insert_into(users::table)
        .values(NewUser {
            email,
            name: "Test User",
            password_hash: "unused",
        })
        .returning(users::id)
        .get_result(conn)
        .expect("Failed to insert test user")
}

pub fn create_recipe(conn: &mut PgConnection, user_id: Uuid, title: &str) -> Uuid {
    let price = BigDecimal::from_str("12.50").unwrap();
    diesel::insert_into(recipes::table)
        .values(NewRecipe {
            user_id,
            title,
            time_minutes: 20,
            price: &price,
            link: None,
            description: None,
            steps: None,
        })
        .returning(recipes::id)
        .get_result(conn)
        .expect("Failed to insert test recipe")
}
