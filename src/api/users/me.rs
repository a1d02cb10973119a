use crate::api::ErrorResponse;
use crate::auth::{hash_password, validate_password, AuthUser};
use crate::db::DbPool;
use crate::email::normalize_email;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user's profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(AuthUser(user): AuthUser) -> impl IntoResponse {
    (StatusCode::OK, Json(UserResponse::from(user)))
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = "users",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_me(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<UpdateMeRequest>,
) -> impl IntoResponse {
    let email = match req.email {
        Some(ref raw) => match normalize_email(raw) {
            Some(e) => Some(e),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "A valid email address is required".to_string(),
                    }),
                )
                    .into_response()
            }
        },
        None => None,
    };

    // Same password policy as signup
    let password_hash = match req.password {
        Some(ref password) => {
            if let Err(e) = validate_password(password) {
                return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: e }))
                    .into_response();
            }
            match hash_password(password) {
                Ok(h) => Some(h),
                Err(e) => {
                    tracing::error!("Failed to hash password: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: "Failed to hash password".to_string(),
                        }),
                    )
                        .into_response();
                }
            }
        }
        None => None,
    };

    #[derive(AsChangeset)]
    #[diesel(table_name = users)]
    struct UserChanges {
        email: Option<String>,
        name: Option<String>,
        password_hash: Option<String>,
    }

    let changes = UserChanges {
        email,
        name: req.name,
        password_hash,
    };

    let mut conn = get_conn!(pool);

    let updated: User = match diesel::update(users::table.find(user.id))
        .set((changes, users::updated_at.eq(Utc::now())))
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Email already registered".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to update user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update user".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(UserResponse::from(updated))).into_response()
}
