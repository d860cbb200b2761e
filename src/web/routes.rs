use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/shared/{token}", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - JSON API used by the UI
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Model-backed SQL operations
            .route("/sql/generate", post(handlers::sql::generate_sql))
            .route("/sql/transform", post(handlers::sql::transform_sql))
            .route("/sql/explain", post(handlers::sql::explain_sql))
            .route("/sql/format", post(handlers::sql::format_sql_handler))
            // Query history
            .route("/queries", get(handlers::queries::list_queries))
            .route("/queries/favorites", get(handlers::queries::list_favorites))
            .route(
                "/queries/{id}",
                get(handlers::queries::get_query).delete(handlers::queries::delete_query),
            )
            .route("/queries/{id}/favorite", patch(handlers::queries::update_favorite))
            .route("/queries/{id}/share", post(handlers::queries::share_query))
            // Share links
            .route(
                "/shared/{token}",
                get(handlers::shared::get_shared_query)
                    .delete(handlers::shared::revoke_shared_query),
            )
            // Schema management
            .route(
                "/schemas",
                get(handlers::schemas::list_schemas).post(handlers::schemas::create_schema),
            )
            .route(
                "/schemas/{id}",
                get(handlers::schemas::get_schema).delete(handlers::schemas::delete_schema),
            )
            .route("/schemas/{id}/analysis", get(handlers::schemas::analyze_schema_handler))
            .route("/schemas/{id}/ddl", get(handlers::schemas::schema_ddl))
            // System status
            .route("/status", get(handlers::status::system_status)),
    )
}
