use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::categories::dtos::{
    CatalogPageDto, CatalogQueryParams, CategoryResponseDto, CreateCategoryDto,
    ParentCandidatesQuery, ParentOptionDto, SelectedLabelDto, SelectedLabelQuery, TreeViewDto,
    TreeViewQuery, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, Meta};
use crate::shared::validation::describe_errors;

/// Category tree of a department for the selector
///
/// Without `search` returns the nested tree and the rows visible under
/// `expanded`. With `search` returns the flat matches with their paths.
#[utoipa::path(
    get,
    path = "/api/departments/{department_id}/category-tree",
    params(
        ("department_id" = Uuid, Path, description = "Department ID"),
        TreeViewQuery
    ),
    responses(
        (status = 200, description = "Tree view", body = ApiResponse<TreeViewDto>),
        (status = 502, description = "Procurement backend unavailable")
    ),
    tag = "categories"
)]
pub async fn get_category_tree(
    State(service): State<Arc<CategoryService>>,
    Path(department_id): Path<Uuid>,
    Query(query): Query<TreeViewQuery>,
) -> Result<Json<ApiResponse<TreeViewDto>>> {
    let view = service.tree_view(department_id, &query).await?;
    let meta = Meta::total(view.summary.total as i64);
    Ok(Json(ApiResponse::success(Some(view), None, Some(meta))))
}

/// Label of the selected category, `null` if it is not in the tree
#[utoipa::path(
    get,
    path = "/api/departments/{department_id}/category-tree/label",
    params(
        ("department_id" = Uuid, Path, description = "Department ID"),
        SelectedLabelQuery
    ),
    responses(
        (status = 200, description = "Resolved label", body = ApiResponse<SelectedLabelDto>),
        (status = 502, description = "Procurement backend unavailable")
    ),
    tag = "categories"
)]
pub async fn get_selected_label(
    State(service): State<Arc<CategoryService>>,
    Path(department_id): Path<Uuid>,
    Query(query): Query<SelectedLabelQuery>,
) -> Result<Json<ApiResponse<SelectedLabelDto>>> {
    let raw = query.selected_id.unwrap_or_default();
    let label = service.selected_label(department_id, &raw).await?;
    Ok(Json(ApiResponse::success(Some(label), None, None)))
}

/// List categories, one page at a time
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CatalogQueryParams),
    responses(
        (status = 200, description = "Catalog page", body = ApiResponse<CatalogPageDto>),
        (status = 502, description = "Procurement backend unavailable")
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Query(params): Query<CatalogQueryParams>,
) -> Result<Json<ApiResponse<CatalogPageDto>>> {
    let (page, meta) = service.catalog_page(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(page),
        None,
        Some(Meta::paginated(
            meta.total,
            meta.page,
            meta.limit,
            meta.total_pages,
        )),
    )))
}

/// Legal parents for a new or edited category
#[utoipa::path(
    get,
    path = "/api/categories/parent-candidates",
    params(ParentCandidatesQuery),
    responses(
        (status = 200, description = "Parent options, \"no parent\" first", body = ApiResponse<Vec<ParentOptionDto>>),
        (status = 502, description = "Procurement backend unavailable")
    ),
    tag = "categories"
)]
pub async fn list_parent_candidates(
    State(service): State<Arc<CategoryService>>,
    Query(query): Query<ParentCandidatesQuery>,
) -> Result<Json<ApiResponse<Vec<ParentOptionDto>>>> {
    let options = service
        .parent_candidates(query.department_id, query.exclude_id)
        .await?;
    let total = options.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(options),
        None,
        Some(Meta::total(total)),
    )))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Rejected by the procurement backend")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(describe_errors(&e)))?;

    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// Update a category
///
/// `department_id` cannot change. Send it along with `parent_id` so the move
/// can be checked for cycles.
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Parent would create a cycle"),
        (status = 502, description = "Rejected by the procurement backend")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(describe_errors(&e)))?;
    dto.ensure_name_not_blank()?;

    let category = service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated".to_string()),
        None,
    )))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 502, description = "Rejected by the procurement backend")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted".to_string()),
        None,
    )))
}
