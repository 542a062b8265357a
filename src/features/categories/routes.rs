use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/departments/{department_id}/category-tree",
            get(handlers::get_category_tree),
        )
        .route(
            "/api/departments/{department_id}/category-tree/label",
            get(handlers::get_selected_label),
        )
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/api/categories/parent-candidates",
            get(handlers::list_parent_candidates),
        )
        .route(
            "/api/categories/{id}",
            patch(handlers::update_category).delete(handlers::delete_category),
        )
        .with_state(service)
}
