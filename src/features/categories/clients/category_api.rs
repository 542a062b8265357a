use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryListQuery, CategoryPage, CategoryTree, NewCategory,
};

/// Category endpoints of the procurement backend.
///
/// Reads fail with `AppError::FetchFailed`, writes with `AppError::MutationFailed`
/// (or `NotFound` for an unknown id).
#[async_trait]
pub trait CategoryApi: Send + Sync {
    /// Nested tree of one department
    async fn get_category_tree(&self, department_id: Uuid) -> Result<CategoryTree>;

    /// Flat paginated projection, filtered server-side by department and search
    async fn get_all_categories(&self, query: &CategoryListQuery) -> Result<CategoryPage>;

    async fn create_category(&self, input: NewCategory) -> Result<Category>;

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Category>;

    /// Children are not touched here; whatever the backend does with them stands.
    async fn delete_category(&self, id: Uuid) -> Result<()>;
}
