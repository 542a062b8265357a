use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::models::{
    Category, CategoryChanges, CategoryListQuery, CategoryNode, CategoryPage, CategoryTree,
    NewCategory, PageMeta,
};

const DEFAULT_LIMIT: u32 = 10;

#[derive(Default)]
struct Store {
    categories: Vec<Category>,
    fail_next: bool,
}

/// In-process stand-in for the procurement backend.
///
/// Keeps categories in insertion order, builds trees from parent links and
/// paginates the same way the REST backend does.
#[derive(Default)]
pub struct InMemoryCategoryApi {
    store: RwLock<Store>,
}

impl InMemoryCategoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            store: RwLock::new(Store {
                categories,
                fail_next: false,
            }),
        }
    }

    /// Small procurement taxonomy over two departments, for local runs
    pub fn seeded() -> Self {
        let it = Uuid::now_v7();
        let facilities = Uuid::now_v7();
        let mut categories = Vec::new();

        let mut add = |name: &str, department_id: Uuid, parent_id: Option<Uuid>| {
            let id = Uuid::now_v7();
            categories.push(Category {
                id,
                name: name.to_string(),
                description: None,
                department_id,
                parent_id,
                updated_at: Utc::now(),
            });
            id
        };

        let hardware = add("Hardware", it, None);
        add("Laptops", it, Some(hardware));
        let monitors = add("Monitors", it, Some(hardware));
        add("4K", it, Some(monitors));
        add("Ultrawide", it, Some(monitors));
        let software = add("Software", it, None);
        add("Licenses", it, Some(software));

        let operations = add("Operations", facilities, None);
        add("Office Supplies", facilities, Some(operations));
        add("Cleaning", facilities, Some(operations));

        tracing::info!(
            "Seeded in-memory category store (departments: {}, {})",
            it,
            facilities
        );

        Self::with_categories(categories)
    }

    /// Makes the next call of any kind fail
    pub async fn fail_next_call(&self) {
        self.store.write().await.fail_next = true;
    }

    pub async fn snapshot(&self) -> Vec<Category> {
        self.store.read().await.categories.clone()
    }

    async fn check_failure(&self, error: impl FnOnce() -> AppError) -> Result<()> {
        let mut store = self.store.write().await;
        if store.fail_next {
            store.fail_next = false;
            return Err(error());
        }
        Ok(())
    }

    /// Roots are top-level categories and those whose parent is not in the
    /// department (e.g. after the parent was deleted).
    fn build_tree(department: &[&Category]) -> CategoryTree {
        let ids: HashSet<Uuid> = department.iter().map(|c| c.id).collect();

        department
            .iter()
            .filter(|c| c.parent_id.is_none_or(|p| !ids.contains(&p)))
            .map(|root| Self::build_node(root, department))
            .collect()
    }

    fn build_node(category: &Category, department: &[&Category]) -> CategoryNode {
        let children = department
            .iter()
            .filter(|c| c.parent_id == Some(category.id))
            .map(|child| Self::build_node(child, department))
            .collect();

        CategoryNode::with_children(category.clone(), children)
    }

    fn check_parent(categories: &[Category], department_id: Uuid, parent_id: Uuid) -> Result<()> {
        match categories.iter().find(|c| c.id == parent_id) {
            Some(parent) if parent.department_id == department_id => Ok(()),
            Some(_) => Err(AppError::MutationFailed(
                "Parent category belongs to another department".to_string(),
            )),
            None => Err(AppError::MutationFailed(
                "Parent category does not exist".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CategoryApi for InMemoryCategoryApi {
    async fn get_category_tree(&self, department_id: Uuid) -> Result<CategoryTree> {
        self.check_failure(|| AppError::FetchFailed("simulated tree failure".to_string()))
            .await?;

        let store = self.store.read().await;
        let department: Vec<&Category> = store
            .categories
            .iter()
            .filter(|c| c.department_id == department_id)
            .collect();

        Ok(Self::build_tree(&department))
    }

    async fn get_all_categories(&self, query: &CategoryListQuery) -> Result<CategoryPage> {
        self.check_failure(|| AppError::FetchFailed("simulated page failure".to_string()))
            .await?;

        let store = self.store.read().await;
        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let matching: Vec<&Category> = store
            .categories
            .iter()
            .filter(|c| query.department_id.is_none_or(|d| c.department_id == d))
            .filter(|c| match &needle {
                Some(n) => {
                    c.name.to_lowercase().contains(n)
                        || c.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(n))
                }
                None => true,
            })
            .collect();

        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);
        let total = matching.len();
        let total_pages = total.div_ceil(limit as usize) as u32;
        let data = matching
            .into_iter()
            .skip((page as usize - 1) * limit as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(CategoryPage {
            data,
            meta: PageMeta {
                total: total as i64,
                page,
                limit,
                total_pages,
            },
        })
    }

    async fn create_category(&self, input: NewCategory) -> Result<Category> {
        self.check_failure(|| AppError::MutationFailed("simulated create failure".to_string()))
            .await?;

        let mut store = self.store.write().await;
        if let Some(parent_id) = input.parent_id {
            Self::check_parent(&store.categories, input.department_id, parent_id)?;
        }

        let category = Category {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            department_id: input.department_id,
            parent_id: input.parent_id,
            updated_at: Utc::now(),
        };
        store.categories.push(category.clone());

        Ok(category)
    }

    async fn update_category(&self, id: Uuid, changes: CategoryChanges) -> Result<Category> {
        self.check_failure(|| AppError::MutationFailed("simulated update failure".to_string()))
            .await?;

        let mut store = self.store.write().await;
        let department_id = store
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.department_id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(Some(parent_id)) = changes.parent_id {
            if parent_id == id {
                return Err(AppError::MutationFailed(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            Self::check_parent(&store.categories, department_id, parent_id)?;
        }

        let category = store
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(description) = changes.description {
            category.description = Some(description);
        }
        if let Some(parent_id) = changes.parent_id {
            category.parent_id = parent_id;
        }
        category.updated_at = Utc::now();

        Ok(category.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        self.check_failure(|| AppError::MutationFailed("simulated delete failure".to_string()))
            .await?;

        let mut store = self.store.write().await;
        let before = store.categories.len();
        store.categories.retain(|c| c.id != id);

        if store.categories.len() == before {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        Ok(())
    }
}
