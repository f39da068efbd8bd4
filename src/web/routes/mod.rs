use crate::{
    Config,
    web::{AppState, doc::ApiDoc},
};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod courses;
pub mod lessons;
pub mod registrations;
pub mod students;

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .nest("/api/v1/auth", auth::routes(state.clone()))
        .nest("/api/v1/registrations", registrations::routes(state.clone()))
        .nest("/api/v1/students", students::routes(state.clone()))
        .nest("/api/v1/courses", courses::routes(state.clone()))
        .nest("/api/v1/lessons", lessons::routes(state.clone()))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/v1/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}
