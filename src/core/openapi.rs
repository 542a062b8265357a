use utoipa::{Modify, OpenApi};

use crate::features::categories::services::{CatalogSort, QuickFilter};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Category selector
        categories_handlers::get_category_tree,
        categories_handlers::get_selected_label,
        // Catalog manager
        categories_handlers::list_categories,
        categories_handlers::list_parent_candidates,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
    ),
    components(
        schemas(
            Meta,
            // Category selector
            categories_dtos::TreeViewMode,
            categories_dtos::CategoryTreeDto,
            categories_dtos::VisibleRowDto,
            categories_dtos::FlattenedCategoryDto,
            categories_dtos::TreeSummaryDto,
            categories_dtos::TreeViewDto,
            categories_dtos::SelectedLabelDto,
            ApiResponse<categories_dtos::TreeViewDto>,
            ApiResponse<categories_dtos::SelectedLabelDto>,
            // Catalog manager
            QuickFilter,
            CatalogSort,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CatalogSummaryDto,
            categories_dtos::CatalogPageDto,
            categories_dtos::ParentOptionDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<categories_dtos::CatalogPageDto>,
            ApiResponse<Vec<categories_dtos::ParentOptionDto>>,
        )
    ),
    tags(
        (name = "categories", description = "Procurement categories per department"),
    ),
    info(
        title = "Procurement Categories API",
        version = "0.1.0",
        description = "Category tree, search and catalog management for procurement",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
