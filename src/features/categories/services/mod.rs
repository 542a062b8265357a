mod catalog_manager;
mod catalog_view;
mod category_service;
mod expansion;
mod parent_candidates;
mod request_sequence;
mod search;
mod selection;
mod tree_index;
mod tree_selector;

pub use catalog_manager::{CatalogManager, CatalogScope, CategoryForm, FormMode, FormSubmission};
pub use catalog_view::{apply_quick_view, CatalogSort, CatalogSummary, QuickFilter};
pub use category_service::CategoryService;
pub use expansion::{visible_rows, ExpansionState, VisibleRow};
pub use parent_candidates::{
    descendants_of, ensure_acyclic, ensure_parent_in_department, parent_candidates, ParentOption,
};
pub use request_sequence::{RequestSequence, RequestTicket};
pub use search::{run_search, search, SearchOutcome, SearchQuery};
pub use selection::Selection;
pub use tree_index::{flatten, TreeIndex, TreeSummary};
pub use tree_selector::{LoadOutcome, TreeSelector, TreeView};
