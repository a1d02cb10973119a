pub mod create;
pub mod delete;
pub mod detail;
pub mod get;
pub mod list;
pub mod price;
pub mod relations;
pub mod update;
pub mod upload_image;

use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .put(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/image",
            post(upload_image::upload_image)
                .layer(DefaultBodyLimit::max(crate::media::MAX_FILE_SIZE + 1024)),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        upload_image::upload_image,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        list::ListRecipesResponse,
        list::RecipeSummary,
        update::UpdateRecipeRequest,
        upload_image::UploadImageRequest,
        upload_image::UploadImageResponse,
        detail::RecipeDetail,
        relations::RelationDescriptor,
        relations::RelationItem,
    ))
)]
pub struct ApiDoc;
