use serde::Deserialize;
use utoipa::ToSchema;

use crate::features::categories::models::Category;

/// Client-side narrowing of the loaded page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuickFilter {
    #[default]
    All,
    TopLevel,
    SubCategory,
}

impl QuickFilter {
    pub fn accepts(self, category: &Category) -> bool {
        match self {
            QuickFilter::All => true,
            QuickFilter::TopLevel => category.is_top_level(),
            QuickFilter::SubCategory => !category.is_top_level(),
        }
    }
}

/// Client-side ordering of the loaded page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    /// Most recently updated first
    #[default]
    Recent,
    NameAsc,
    NameDesc,
}

/// Applies the quick filter and sort to the current page only.
///
/// Never reaches into other pages: it can only narrow what is loaded.
pub fn apply_quick_view(page: &[Category], filter: QuickFilter, sort: CatalogSort) -> Vec<Category> {
    let mut rows: Vec<Category> = page.iter().filter(|c| filter.accepts(c)).cloned().collect();

    match sort {
        CatalogSort::Recent => rows.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }),
        CatalogSort::NameAsc => {
            rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
        CatalogSort::NameDesc => {
            rows.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase()))
        }
    }

    rows
}

/// Counters shown above the catalog table, over the loaded page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub total_on_page: usize,
    pub top_level: usize,
    pub sub_categories: usize,
}

impl CatalogSummary {
    pub fn from_page(page: &[Category]) -> Self {
        let top_level = page.iter().filter(|c| c.is_top_level()).count();
        Self {
            total_on_page: page.len(),
            top_level,
            sub_categories: page.len() - top_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use crate::shared::test_helpers::category;

    fn page() -> Vec<Category> {
        let dept = Uuid::now_v7();
        let now = Utc::now();
        let mut office = category("office", dept, None);
        office.updated_at = now - Duration::hours(3);
        let mut chairs = category("Chairs", dept, Some(office.id));
        chairs.updated_at = now;
        let mut desks = category("Desks", dept, Some(office.id));
        desks.updated_at = now - Duration::hours(1);
        let mut it = category("IT", dept, None);
        it.updated_at = now - Duration::hours(2);
        vec![office, chairs, desks, it]
    }

    fn names(rows: &[Category]) -> Vec<&str> {
        rows.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_recent_sort_is_default() {
        let rows = apply_quick_view(&page(), QuickFilter::default(), CatalogSort::default());
        assert_eq!(names(&rows), vec!["Chairs", "Desks", "IT", "office"]);
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let rows = apply_quick_view(&page(), QuickFilter::All, CatalogSort::NameAsc);
        assert_eq!(names(&rows), vec!["Chairs", "Desks", "IT", "office"]);

        let rows = apply_quick_view(&page(), QuickFilter::All, CatalogSort::NameDesc);
        assert_eq!(names(&rows), vec!["office", "IT", "Desks", "Chairs"]);
    }

    #[test]
    fn test_quick_filters_only_narrow_loaded_page() {
        let loaded = page();

        let top = apply_quick_view(&loaded, QuickFilter::TopLevel, CatalogSort::NameAsc);
        assert_eq!(names(&top), vec!["IT", "office"]);

        let sub = apply_quick_view(&loaded, QuickFilter::SubCategory, CatalogSort::NameAsc);
        assert_eq!(names(&sub), vec!["Chairs", "Desks"]);

        assert!(top.len() + sub.len() == loaded.len());
    }

    #[test]
    fn test_summary_counts() {
        assert_eq!(
            CatalogSummary::from_page(&page()),
            CatalogSummary {
                total_on_page: 4,
                top_level: 2,
                sub_categories: 2,
            }
        );
        assert_eq!(CatalogSummary::from_page(&[]), CatalogSummary::default());
    }
}
