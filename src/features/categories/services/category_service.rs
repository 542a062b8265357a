use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::CatalogConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::dtos::{
    CatalogPageDto, CatalogQueryParams, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto,
    FlattenedCategoryDto, ParentOptionDto, SelectedLabelDto, TreeViewDto, TreeViewMode,
    TreeViewQuery, UpdateCategoryDto, VisibleRowDto,
};
use crate::features::categories::models::{Category, CategoryListQuery, PageMeta};
use crate::features::categories::services::{
    apply_quick_view, ensure_acyclic, ensure_parent_in_department, parent_candidates,
    run_search, visible_rows, CatalogSummary, ExpansionState, SearchOutcome, Selection,
    TreeIndex,
};
use crate::shared::constants::SELECTION_PLACEHOLDER;

/// Service for category operations.
///
/// Stateless: every call fetches fresh data from the procurement backend.
/// The per-view state lives in `TreeSelector` and `CatalogManager`.
pub struct CategoryService {
    api: Arc<dyn CategoryApi>,
    catalog: CatalogConfig,
}

impl CategoryService {
    pub fn new(api: Arc<dyn CategoryApi>, catalog: CatalogConfig) -> Self {
        Self { api, catalog }
    }

    /// Tree, search results or "no matches" for one department
    pub async fn tree_view(&self, department_id: Uuid, query: &TreeViewQuery) -> Result<TreeViewDto> {
        let tree = self.api.get_category_tree(department_id).await?;
        let index = TreeIndex::build(&tree)?;
        let summary = index.summary().into();

        let view = match run_search(index.entries(), query.search.as_deref().unwrap_or_default()) {
            SearchOutcome::Tree if index.is_empty() => TreeViewDto {
                mode: TreeViewMode::Empty,
                tree: Vec::new(),
                rows: Vec::new(),
                matches: Vec::new(),
                summary,
            },
            SearchOutcome::Tree => {
                let expansion: ExpansionState = query.expanded_ids().into_iter().collect();
                TreeViewDto {
                    mode: TreeViewMode::Tree,
                    tree: CategoryTreeDto::build_tree(&tree),
                    rows: visible_rows(&tree, &expansion)
                        .iter()
                        .map(VisibleRowDto::from)
                        .collect(),
                    matches: Vec::new(),
                    summary,
                }
            }
            SearchOutcome::Matches(found) => TreeViewDto {
                mode: TreeViewMode::Search,
                tree: Vec::new(),
                rows: Vec::new(),
                matches: found.into_iter().map(FlattenedCategoryDto::from).collect(),
                summary,
            },
            SearchOutcome::NoMatches => TreeViewDto {
                mode: TreeViewMode::NoMatches,
                tree: Vec::new(),
                rows: Vec::new(),
                matches: Vec::new(),
                summary,
            },
        };

        Ok(view)
    }

    /// Resolves a selected id against the department tree. Unknown ids are
    /// not an error; they resolve to no label.
    pub async fn selected_label(&self, department_id: Uuid, raw: &str) -> Result<SelectedLabelDto> {
        let tree = self.api.get_category_tree(department_id).await?;
        let index = TreeIndex::build(&tree)?;
        let selection = Selection::from_raw(raw);

        Ok(SelectedLabelDto {
            selected_id: selection.selected_id(),
            label: selection.label(&index).map(str::to_string),
            display_label: selection
                .display_label(&index, SELECTION_PLACEHOLDER)
                .to_string(),
        })
    }

    /// One catalog page with the quick filter and sort applied to it
    pub async fn catalog_page(&self, params: &CatalogQueryParams) -> Result<(CatalogPageDto, PageMeta)> {
        let query = CategoryListQuery {
            department_id: params.department_id,
            page: Some(params.page.max(1)),
            limit: Some(self.catalog.page_size),
            search: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        let page = self.api.get_all_categories(&query).await?;

        let summary = CatalogSummary::from_page(&page.data).into();
        let items = apply_quick_view(&page.data, params.quick_filter, params.sort)
            .into_iter()
            .map(CategoryResponseDto::from)
            .collect();

        Ok((CatalogPageDto { items, summary }, page.meta))
    }

    /// Every category of the department, fetched with the candidate limit
    async fn department_universe(&self, department_id: Uuid) -> Result<Vec<Category>> {
        let page = self
            .api
            .get_all_categories(&CategoryListQuery {
                department_id: Some(department_id),
                page: Some(1),
                limit: Some(self.catalog.candidate_fetch_limit),
                search: None,
            })
            .await?;

        if page.meta.total > i64::from(self.catalog.candidate_fetch_limit) {
            tracing::warn!(
                "Department {} has {} categories, parent candidates truncated to {}",
                department_id,
                page.meta.total,
                self.catalog.candidate_fetch_limit
            );
        }

        Ok(page
            .data
            .into_iter()
            .filter(|c| c.department_id == department_id)
            .collect())
    }

    /// Every category of the department, paging through the full listing.
    /// Parent and cycle checks need the complete set, not the capped page.
    async fn department_categories(&self, department_id: Uuid) -> Result<Vec<Category>> {
        let limit = self.catalog.candidate_fetch_limit.max(1);
        let mut categories = Vec::new();
        let mut page_no = 1;

        loop {
            let page = self
                .api
                .get_all_categories(&CategoryListQuery {
                    department_id: Some(department_id),
                    page: Some(page_no),
                    limit: Some(limit),
                    search: None,
                })
                .await?;

            let fetched = page.data.len();
            categories.extend(
                page.data
                    .into_iter()
                    .filter(|c| c.department_id == department_id),
            );
            if fetched == 0 || page_no >= page.meta.total_pages {
                break;
            }
            page_no += 1;
        }

        tracing::debug!(
            "Loaded {} categories of department {} in {} page(s)",
            categories.len(),
            department_id,
            page_no
        );
        Ok(categories)
    }

    pub async fn parent_candidates(
        &self,
        department_id: Uuid,
        exclude_id: Option<Uuid>,
    ) -> Result<Vec<ParentOptionDto>> {
        let categories = self.department_universe(department_id).await?;

        Ok(parent_candidates(&categories, department_id, exclude_id)
            .into_iter()
            .map(ParentOptionDto::from)
            .collect())
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        if let Some(parent_id) = dto.parent_id {
            let categories = self.department_categories(dto.department_id).await?;
            ensure_parent_in_department(&categories, dto.department_id, parent_id)?;
        }

        let category = self.api.create_category(dto.into()).await?;
        tracing::info!("Created category {} ({})", category.id, category.name);

        Ok(category.into())
    }

    /// Moving a category under a new parent requires `department_id` so the
    /// ancestor chain can be checked for cycles before the call goes out.
    pub async fn update(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        if dto.is_empty() {
            return Err(AppError::BadRequest("No changes provided".to_string()));
        }

        if let Some(Some(parent_id)) = dto.parent_id {
            let department_id = dto.department_id.ok_or_else(|| {
                AppError::Validation("department_id: is required when changing the parent".to_string())
            })?;
            let categories = self.department_categories(department_id).await?;

            if !categories.iter().any(|c| c.id == id) {
                return Err(AppError::Validation(
                    "department_id: does not match the category's department".to_string(),
                ));
            }
            ensure_parent_in_department(&categories, department_id, parent_id)?;
            ensure_acyclic(&categories, id, Some(parent_id))?;
        }

        let category = self.api.update_category(id, dto.into()).await?;
        tracing::info!("Updated category {} ({})", category.id, category.name);

        Ok(category.into())
    }

    /// Pass-through; what happens to children is up to the backend
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        self.api.delete_category(id).await?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::clients::InMemoryCategoryApi;
    use crate::features::categories::services::{CatalogSort, QuickFilter};
    use crate::shared::test_helpers::{hardware_categories, HardwareIds};

    fn service() -> (HardwareIds, Arc<InMemoryCategoryApi>, CategoryService) {
        let (ids, categories) = hardware_categories();
        let api = Arc::new(InMemoryCategoryApi::with_categories(categories));
        let service = CategoryService::new(api.clone(), CatalogConfig::default());
        (ids, api, service)
    }

    fn search(text: &str) -> TreeViewQuery {
        TreeViewQuery {
            search: Some(text.to_string()),
            expanded: None,
        }
    }

    #[tokio::test]
    async fn test_tree_view_modes() {
        let (ids, _, service) = service();

        let tree = service
            .tree_view(ids.department, &TreeViewQuery::default())
            .await
            .unwrap();
        assert_eq!(tree.mode, TreeViewMode::Tree);
        assert_eq!(tree.rows.len(), 1);
        assert_eq!(tree.summary.total, 5);
        assert_eq!(tree.summary.max_depth, 2);

        let found = service.tree_view(ids.department, &search("mon")).await.unwrap();
        assert_eq!(found.mode, TreeViewMode::Search);
        let names: Vec<_> = found.matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Monitors", "4K", "Ultrawide"]);

        let none = service.tree_view(ids.department, &search("chairs")).await.unwrap();
        assert_eq!(none.mode, TreeViewMode::NoMatches);

        let empty = service
            .tree_view(Uuid::now_v7(), &search("chairs"))
            .await
            .unwrap();
        assert_eq!(empty.mode, TreeViewMode::Empty);
    }

    #[tokio::test]
    async fn test_tree_view_rows_follow_expansion() {
        let (ids, _, service) = service();
        let query = TreeViewQuery {
            search: None,
            expanded: Some(format!("{},{}", ids.hardware, ids.monitors)),
        };

        let view = service.tree_view(ids.department, &query).await.unwrap();

        let names: Vec<_> = view.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Hardware", "Laptops", "Monitors", "4K", "Ultrawide"]);
        assert_eq!(view.rows[3].depth, 2);
    }

    #[tokio::test]
    async fn test_selected_label_unknown_id_is_not_an_error() {
        let (ids, _, service) = service();

        let known = service
            .selected_label(ids.department, &ids.ultrawide.to_string())
            .await
            .unwrap();
        assert_eq!(known.label.as_deref(), Some("Ultrawide"));

        let unknown = service
            .selected_label(ids.department, &Uuid::now_v7().to_string())
            .await
            .unwrap();
        assert_eq!(unknown.label, None);
        assert_eq!(unknown.display_label, SELECTION_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_catalog_page_applies_quick_view_to_page_only() {
        let (ids, _, service) = service();
        let params = CatalogQueryParams {
            department_id: Some(ids.department),
            page: 1,
            search: None,
            quick_filter: QuickFilter::TopLevel,
            sort: CatalogSort::NameAsc,
        };

        let (page, meta) = service.catalog_page(&params).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, ids.hardware);
        assert_eq!(page.summary.total_on_page, 5);
        assert_eq!(page.summary.sub_categories, 4);
        assert_eq!(meta.total, 5);
    }

    #[tokio::test]
    async fn test_update_rejects_descendant_as_parent() {
        let (ids, api, service) = service();
        let dto = UpdateCategoryDto {
            parent_id: Some(Some(ids.four_k)),
            department_id: Some(ids.department),
            ..Default::default()
        };

        let result = service.update(ids.hardware, dto).await;

        assert!(matches!(result, Err(AppError::CycleDetected(_))));
        let hardware = api
            .snapshot()
            .await
            .into_iter()
            .find(|c| c.id == ids.hardware)
            .unwrap();
        assert_eq!(hardware.parent_id, None);
    }

    #[tokio::test]
    async fn test_update_parent_requires_department_scope() {
        let (ids, _, service) = service();

        let missing = UpdateCategoryDto {
            parent_id: Some(Some(ids.laptops)),
            ..Default::default()
        };
        assert!(matches!(
            service.update(ids.four_k, missing).await,
            Err(AppError::Validation(_))
        ));

        let wrong = UpdateCategoryDto {
            parent_id: Some(Some(ids.laptops)),
            department_id: Some(Uuid::now_v7()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(ids.four_k, wrong).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_checks_departments_larger_than_candidate_limit() {
        let (ids, categories) = hardware_categories();
        let api = Arc::new(InMemoryCategoryApi::with_categories(categories));
        let service = CategoryService::new(
            api.clone(),
            CatalogConfig {
                page_size: 10,
                candidate_fetch_limit: 2,
            },
        );

        // Ultrawide sits on the last page of the department listing
        let moved = UpdateCategoryDto {
            parent_id: Some(Some(ids.laptops)),
            department_id: Some(ids.department),
            ..Default::default()
        };
        let updated = service.update(ids.ultrawide, moved).await.unwrap();
        assert_eq!(updated.parent_id, Some(ids.laptops));

        let cyclic = UpdateCategoryDto {
            parent_id: Some(Some(ids.four_k)),
            department_id: Some(ids.department),
            ..Default::default()
        };
        assert!(matches!(
            service.update(ids.hardware, cyclic).await,
            Err(AppError::CycleDetected(_))
        ));
    }

    #[tokio::test]
    async fn test_update_moves_to_top_level() {
        let (ids, _, service) = service();
        let dto = UpdateCategoryDto {
            parent_id: Some(None),
            ..Default::default()
        };

        let updated = service.update(ids.monitors, dto).await.unwrap();

        assert_eq!(updated.parent_id, None);
    }

    #[tokio::test]
    async fn test_create_rejects_parent_from_other_department() {
        let (ids, _, service) = service();
        let dto = CreateCategoryDto {
            name: "Chairs".to_string(),
            description: None,
            department_id: Uuid::now_v7(),
            parent_id: Some(ids.hardware),
        };

        assert!(matches!(
            service.create(dto).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_parent_candidates_exclude_subtree() {
        let (ids, _, service) = service();

        let options = service
            .parent_candidates(ids.department, Some(ids.monitors))
            .await
            .unwrap();

        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels[0], crate::shared::constants::NO_PARENT_LABEL);
        assert_eq!(&labels[1..], &["Hardware", "Laptops"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let (ids, api, service) = service();
        api.fail_next_call().await;

        let result = service.tree_view(ids.department, &TreeViewQuery::default()).await;

        assert!(matches!(result, Err(AppError::FetchFailed(_))));
    }
}
