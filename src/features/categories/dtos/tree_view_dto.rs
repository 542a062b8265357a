use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::categories::dtos::CategoryTreeDto;
use crate::features::categories::models::FlattenedCategory;
use crate::features::categories::services::{TreeSummary, VisibleRow};

// Query params for the tree selector
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct TreeViewQuery {
    /// Free-text filter over names and ancestor names
    pub search: Option<String>,

    /// Comma-separated ids of expanded nodes
    pub expanded: Option<String>,
}

impl TreeViewQuery {
    /// Unparsable ids are skipped
    pub fn expanded_ids(&self) -> Vec<Uuid> {
        self.expanded
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|s| Uuid::parse_str(s.trim()).ok())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct SelectedLabelQuery {
    /// Raw selected value held by the form; blank means nothing selected
    pub selected_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TreeViewMode {
    /// The department has no categories
    Empty,
    Tree,
    Search,
    /// A search is active and nothing matched
    NoMatches,
}

/// Search hit with its ancestry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FlattenedCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub depth: usize,
    pub has_children: bool,
    /// Root-to-self names
    pub path: Vec<String>,
}

impl From<&FlattenedCategory> for FlattenedCategoryDto {
    fn from(entry: &FlattenedCategory) -> Self {
        Self {
            id: entry.id(),
            name: entry.name().to_string(),
            parent_id: entry.category.parent_id,
            depth: entry.depth,
            has_children: entry.has_children,
            path: entry.path.clone(),
        }
    }
}

/// Row of the collapsed/expanded tree as rendered
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VisibleRowDto {
    pub id: Uuid,
    pub name: String,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

impl From<&VisibleRow<'_>> for VisibleRowDto {
    fn from(row: &VisibleRow<'_>) -> Self {
        Self {
            id: row.node.category.id,
            name: row.node.category.name.clone(),
            depth: row.depth,
            has_children: row.has_children,
            expanded: row.expanded,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct TreeSummaryDto {
    pub total: usize,
    pub roots: usize,
    pub leaves: usize,
    pub max_depth: usize,
}

impl From<TreeSummary> for TreeSummaryDto {
    fn from(s: TreeSummary) -> Self {
        Self {
            total: s.total,
            roots: s.roots,
            leaves: s.leaves,
            max_depth: s.max_depth,
        }
    }
}

/// What the category selector shows for one department
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TreeViewDto {
    pub mode: TreeViewMode,
    /// Full nested tree, set in `tree` mode
    pub tree: Vec<CategoryTreeDto>,
    /// Rows visible under the requested expansion, set in `tree` mode
    pub rows: Vec<VisibleRowDto>,
    /// Set in `search` mode, pre-order
    pub matches: Vec<FlattenedCategoryDto>,
    pub summary: TreeSummaryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectedLabelDto {
    pub selected_id: Option<Uuid>,
    /// `null` when nothing is selected or the id is not in the tree
    pub label: Option<String>,
    /// Label or placeholder, ready to render
    pub display_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expanded_ids_skips_garbage() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let query = TreeViewQuery {
            search: None,
            expanded: Some(format!("{}, nope,{},", a, b)),
        };

        assert_eq!(query.expanded_ids(), vec![a, b]);
        assert!(TreeViewQuery::default().expanded_ids().is_empty());
    }
}
