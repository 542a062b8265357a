use uuid::Uuid;
use validator::Validate;

use crate::core::config::CatalogConfig;
use crate::core::error::{AppError, Result};
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::dtos::{CreateCategoryDto, UpdateCategoryDto};
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryListQuery, CategoryPage, NewCategory, PageMeta,
};
use crate::features::categories::services::{
    apply_quick_view, ensure_acyclic, ensure_parent_in_department, parent_candidates,
    CatalogSort, CatalogSummary, LoadOutcome, ParentOption, QuickFilter, RequestSequence,
    RequestTicket,
};
use crate::shared::validation::describe_errors;

const DELETE_FAILED_MESSAGE: &str = "Failed to delete category";

/// Server-side scope of the catalog list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogScope {
    pub department_id: Option<Uuid>,
    pub search: Option<String>,
    /// 1-indexed
    pub page: u32,
}

impl Default for CatalogScope {
    fn default() -> Self {
        Self {
            department_id: None,
            search: None,
            page: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Category),
}

/// Validated payload ready to be sent to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    Create(NewCategory),
    Update { id: Uuid, changes: CategoryChanges },
}

/// Create/edit dialog of the catalog manager
#[derive(Debug)]
pub struct CategoryForm {
    mode: FormMode,
    pub name: String,
    pub description: String,
    department_id: Option<Uuid>,
    parent_id: Option<Uuid>,
    candidate_source: Vec<Category>,
    candidates: Vec<ParentOption>,
    candidate_requests: RequestSequence,
    error: Option<String>,
}

impl CategoryForm {
    pub fn for_create(department_id: Option<Uuid>) -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            description: String::new(),
            department_id,
            parent_id: None,
            candidate_source: Vec::new(),
            candidates: Vec::new(),
            candidate_requests: RequestSequence::new(),
            error: None,
        }
    }

    pub fn for_edit(category: &Category) -> Self {
        Self {
            mode: FormMode::Edit(category.clone()),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
            department_id: Some(category.department_id),
            parent_id: category.parent_id,
            candidate_source: Vec::new(),
            candidates: Vec::new(),
            candidate_requests: RequestSequence::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    fn editing_id(&self) -> Option<Uuid> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit(category) => Some(category.id),
        }
    }

    pub fn department_id(&self) -> Option<Uuid> {
        self.department_id
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    pub fn candidates(&self) -> &[ParentOption] {
        &self.candidates
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Changes the department and drops the chosen parent together with the
    /// candidate list of the old department. In-flight candidate fetches
    /// become stale.
    pub fn set_department(&mut self, department_id: Option<Uuid>) {
        if self.department_id == department_id {
            return;
        }
        self.department_id = department_id;
        self.parent_id = None;
        self.candidate_source.clear();
        self.candidates.clear();
        self.candidate_requests.issue();
    }

    /// Only the sentinel or an id from the current candidate list is accepted
    pub fn choose_parent(&mut self, parent_id: Option<Uuid>) -> Result<()> {
        if let Some(id) = parent_id {
            if !self.candidates.iter().any(|o| o.id() == Some(id)) {
                return Err(AppError::Validation(
                    "Selected parent is not a valid candidate for this category".to_string(),
                ));
            }
        }
        self.parent_id = parent_id;
        Ok(())
    }

    pub fn begin_candidates(&mut self, limit: u32) -> Option<(RequestTicket, CategoryListQuery)> {
        let department_id = self.department_id?;
        let query = CategoryListQuery {
            department_id: Some(department_id),
            page: Some(1),
            limit: Some(limit),
            search: None,
        };
        Some((self.candidate_requests.issue(), query))
    }

    pub fn complete_candidates(&mut self, ticket: RequestTicket, result: Result<CategoryPage>) -> LoadOutcome {
        if !self.candidate_requests.is_current(ticket) {
            return LoadOutcome::Stale;
        }
        let Some(department_id) = self.department_id else {
            return LoadOutcome::Stale;
        };

        match result {
            Ok(page) => {
                let source: Vec<Category> = page
                    .data
                    .into_iter()
                    .filter(|c| c.department_id == department_id)
                    .collect();
                self.candidates = parent_candidates(&source, department_id, self.editing_id());
                self.candidate_source = source;

                // The candidate page is capped, so an existing parent may be
                // missing from it. It stays until the user picks another one.
                if let Some(parent_id) = self.parent_id {
                    if !self.candidates.iter().any(|o| o.id() == Some(parent_id)) {
                        tracing::debug!("Parent {} not among loaded candidates", parent_id);
                    }
                }
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to load parent candidates: {}", e);
                self.error = Some(e.user_message());
                LoadOutcome::Failed
            }
        }
    }

    /// Validates the form without touching the network
    pub fn submission(&self) -> Result<FormSubmission> {
        let department_id = self
            .department_id
            .ok_or_else(|| AppError::Validation("department: is required".to_string()))?;
        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());

        match &self.mode {
            FormMode::Create => {
                let dto = CreateCategoryDto {
                    name: self.name.clone(),
                    description,
                    department_id,
                    parent_id: self.parent_id,
                };
                dto.validate()
                    .map_err(|e| AppError::Validation(describe_errors(&e)))?;
                if let Some(parent_id) = dto.parent_id {
                    ensure_parent_in_department(&self.candidate_source, department_id, parent_id)?;
                }
                Ok(FormSubmission::Create(dto.into()))
            }
            FormMode::Edit(original) => {
                if department_id != original.department_id {
                    return Err(AppError::Validation(
                        "department: cannot be changed after creation".to_string(),
                    ));
                }

                let name = self.name.trim();
                let dto = UpdateCategoryDto {
                    name: (name != original.name).then(|| self.name.clone()),
                    description: (description != original.description)
                        .then(|| description.clone().unwrap_or_default()),
                    parent_id: (self.parent_id != original.parent_id).then_some(self.parent_id),
                    department_id: Some(department_id),
                };
                dto.validate()
                    .map_err(|e| AppError::Validation(describe_errors(&e)))?;
                dto.ensure_name_not_blank()?;

                if let Some(Some(parent_id)) = dto.parent_id {
                    ensure_parent_in_department(&self.candidate_source, department_id, parent_id)?;
                    ensure_acyclic(&self.candidate_source, original.id, Some(parent_id))?;
                }

                Ok(FormSubmission::Update {
                    id: original.id,
                    changes: dto.into(),
                })
            }
        }
    }
}

/// State of the flat, paginated catalog management view
#[derive(Debug)]
pub struct CatalogManager {
    page_size: u32,
    candidate_limit: u32,
    scope: CatalogScope,
    page: Option<CategoryPage>,
    quick_filter: QuickFilter,
    sort: CatalogSort,
    requests: RequestSequence,
    loading: bool,
    error: Option<String>,
    form: Option<CategoryForm>,
}

impl CatalogManager {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            page_size: config.page_size,
            candidate_limit: config.candidate_fetch_limit,
            scope: CatalogScope::default(),
            page: None,
            quick_filter: QuickFilter::default(),
            sort: CatalogSort::default(),
            requests: RequestSequence::new(),
            loading: false,
            error: None,
            form: None,
        }
    }

    pub fn scope(&self) -> &CatalogScope {
        &self.scope
    }

    pub fn set_department(&mut self, department_id: Option<Uuid>) {
        self.scope.department_id = department_id;
        self.scope.page = 1;
    }

    pub fn set_search(&mut self, raw: &str) {
        self.scope.search = Some(raw.trim().to_string()).filter(|s| !s.is_empty());
        self.scope.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.scope.page = page.max(1);
    }

    pub fn set_quick_filter(&mut self, filter: QuickFilter) {
        self.quick_filter = filter;
    }

    pub fn set_sort(&mut self, sort: CatalogSort) {
        self.sort = sort;
    }

    pub fn list_query(&self) -> CategoryListQuery {
        CategoryListQuery {
            department_id: self.scope.department_id,
            page: Some(self.scope.page),
            limit: Some(self.page_size),
            search: self.scope.search.clone(),
        }
    }

    pub fn begin_fetch(&mut self) -> (RequestTicket, CategoryListQuery) {
        self.loading = true;
        (self.requests.issue(), self.list_query())
    }

    pub fn complete_fetch(&mut self, ticket: RequestTicket, result: Result<CategoryPage>) -> LoadOutcome {
        if !self.requests.is_current(ticket) {
            tracing::debug!("Discarding stale catalog page (request {})", ticket.value());
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                self.page = Some(page);
                self.error = None;
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Failed to load catalog page {:?}: {}", self.scope, e);
                self.error = Some(e.user_message());
                LoadOutcome::Failed
            }
        }
    }

    /// Re-fetches the current page in full
    pub async fn refresh(&mut self, api: &dyn CategoryApi) -> LoadOutcome {
        let (ticket, query) = self.begin_fetch();
        let result = api.get_all_categories(&query).await;
        self.complete_fetch(ticket, result)
    }

    /// Loaded page after quick filter and sort
    pub fn rows(&self) -> Vec<Category> {
        self.page
            .as_ref()
            .map(|p| apply_quick_view(&p.data, self.quick_filter, self.sort))
            .unwrap_or_default()
    }

    pub fn summary(&self) -> CatalogSummary {
        self.page
            .as_ref()
            .map(|p| CatalogSummary::from_page(&p.data))
            .unwrap_or_default()
    }

    pub fn page_meta(&self) -> Option<&PageMeta> {
        self.page.as_ref().map(|p| &p.meta)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_create(&mut self) {
        self.form = Some(CategoryForm::for_create(self.scope.department_id));
    }

    pub fn open_edit(&mut self, category: &Category) {
        self.form = Some(CategoryForm::for_edit(category));
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn form(&self) -> Option<&CategoryForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut CategoryForm> {
        self.form.as_mut()
    }

    /// Fetches the parent candidate universe for the open form's department.
    /// Returns `None` when no form is open or it has no department yet.
    pub async fn load_form_candidates(&mut self, api: &dyn CategoryApi) -> Option<LoadOutcome> {
        let limit = self.candidate_limit;
        let form = self.form.as_mut()?;
        let (ticket, query) = form.begin_candidates(limit)?;
        let result = api.get_all_categories(&query).await;
        Some(form.complete_candidates(ticket, result))
    }

    /// Validates and sends the open form. On success the form closes and the
    /// current page is reloaded; on failure the form stays open as it was.
    pub async fn submit(&mut self, api: &dyn CategoryApi) -> Result<Category> {
        let form = self
            .form
            .as_mut()
            .ok_or_else(|| AppError::BadRequest("No category form is open".to_string()))?;

        let submission = match form.submission() {
            Ok(submission) => submission,
            Err(e) => {
                form.error = Some(e.user_message());
                return Err(e);
            }
        };

        let result = match submission {
            FormSubmission::Create(input) => api.create_category(input).await,
            FormSubmission::Update { id, changes } => api.update_category(id, changes).await,
        };

        match result {
            Ok(category) => {
                tracing::info!("Saved category {} ({})", category.id, category.name);
                self.form = None;
                self.refresh(api).await;
                Ok(category)
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }

    /// Passes the delete through, then reloads the current page
    pub async fn delete(&mut self, api: &dyn CategoryApi, id: Uuid) -> Result<()> {
        match api.delete_category(id).await {
            Ok(()) => {
                tracing::info!("Deleted category {}", id);
                self.refresh(api).await;
                Ok(())
            }
            Err(e) => {
                self.error = Some(match e {
                    AppError::MutationFailed(_) => DELETE_FAILED_MESSAGE.to_string(),
                    _ => e.user_message(),
                });
                Err(e)
            }
        }
    }
}
