use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::categories::services::{CatalogSort, CatalogSummary, ParentOption, QuickFilter};
use crate::shared::constants::NO_PARENT_LABEL;

fn default_page() -> u32 {
    1
}

// Query params for the catalog list
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct CatalogQueryParams {
    /// Department scope, all departments when omitted
    pub department_id: Option<Uuid>,

    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: u32,

    /// Server-side search in name or description
    pub search: Option<String>,

    /// Narrows the loaded page only
    #[serde(default)]
    pub quick_filter: QuickFilter,

    /// Orders the loaded page only (default: most recently updated first)
    #[serde(default)]
    pub sort: CatalogSort,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct CatalogSummaryDto {
    pub total_on_page: usize,
    pub top_level: usize,
    pub sub_categories: usize,
}

impl From<CatalogSummary> for CatalogSummaryDto {
    fn from(s: CatalogSummary) -> Self {
        Self {
            total_on_page: s.total_on_page,
            top_level: s.top_level,
            sub_categories: s.sub_categories,
        }
    }
}

/// One page of the catalog after quick filter and sort
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogPageDto {
    pub items: Vec<CategoryResponseDto>,
    /// Counted over the fetched page, before the quick filter
    pub summary: CatalogSummaryDto,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
pub struct ParentCandidatesQuery {
    pub department_id: Uuid,

    /// Category being edited; it and its descendants are left out
    pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ParentOptionDto {
    /// `null` for the "no parent" option
    pub id: Option<Uuid>,
    pub label: String,
}

impl From<ParentOption> for ParentOptionDto {
    fn from(option: ParentOption) -> Self {
        match option {
            ParentOption::None => Self {
                id: None,
                label: NO_PARENT_LABEL.to_string(),
            },
            ParentOption::Category { id, name } => Self {
                id: Some(id),
                label: name,
            },
        }
    }
}
