pub mod catalog_dto;
pub mod category_dto;
pub mod tree_view_dto;

pub use catalog_dto::{
    CatalogPageDto, CatalogQueryParams, CatalogSummaryDto, ParentCandidatesQuery, ParentOptionDto,
};
pub use category_dto::{CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, UpdateCategoryDto};
pub use tree_view_dto::{
    FlattenedCategoryDto, SelectedLabelDto, SelectedLabelQuery, TreeSummaryDto, TreeViewDto,
    TreeViewMode, TreeViewQuery, VisibleRowDto,
};
