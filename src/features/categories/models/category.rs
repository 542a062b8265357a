use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category as returned by the procurement backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub department_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Node of the nested tree representation. `children` only exists here,
/// never on the flat paginated projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn leaf(category: Category) -> Self {
        Self {
            category,
            children: Vec::new(),
        }
    }

    pub fn with_children(category: Category, children: Vec<CategoryNode>) -> Self {
        Self { category, children }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Roots of one department's category tree, in backend order
pub type CategoryTree = Vec<CategoryNode>;

/// One entry of the pre-order linearization of a tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedCategory {
    pub category: Category,
    /// Distance from the root, roots are 0
    pub depth: usize,
    pub has_children: bool,
    /// Ancestor names from the root down, followed by the own name
    pub path: Vec<String>,
}

impl FlattenedCategory {
    pub fn id(&self) -> Uuid {
        self.category.id
    }

    pub fn name(&self) -> &str {
        &self.category.name
    }
}
