use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::clients::CategoryApi;
use crate::features::categories::models::{CategoryTree, FlattenedCategory};
use crate::features::categories::services::{
    run_search, visible_rows, ExpansionState, RequestSequence, RequestTicket, SearchOutcome,
    Selection, TreeIndex, VisibleRow,
};
use crate::shared::constants::SELECTION_PLACEHOLDER;

/// Result of handing a fetch response back to a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// Superseded by a later request; the response was dropped
    Stale,
    /// The fetch failed; previous data is kept
    Failed,
}

/// What the selector popover renders
#[derive(Debug, PartialEq, Eq)]
pub enum TreeView<'a> {
    /// Nothing loaded for the department
    Empty,
    Tree(Vec<VisibleRow<'a>>),
    SearchResults(Vec<&'a FlattenedCategory>),
    /// A query is active and matched nothing
    NoMatches,
}

/// State of one hierarchical category picker, scoped to a department.
///
/// The selected id is a value owned by the enclosing form; this type only
/// mirrors it and resolves its label.
#[derive(Debug, Default)]
pub struct TreeSelector {
    department_id: Option<Uuid>,
    tree: CategoryTree,
    index: TreeIndex,
    expansion: ExpansionState,
    search: String,
    open: bool,
    selection: Selection,
    loading: bool,
    error: Option<String>,
    requests: RequestSequence,
}

impl TreeSelector {
    pub fn new(selected: impl Into<String>) -> Self {
        Self {
            selection: Selection::from_raw(selected),
            ..Self::default()
        }
    }

    /// Starts a fetch for `department_id`.
    ///
    /// Switching department drops the other department's tree, collapses
    /// everything and clears the search.
    pub fn begin_load(&mut self, department_id: Uuid) -> RequestTicket {
        if self.department_id != Some(department_id) {
            self.tree.clear();
            self.index = TreeIndex::default();
            self.expansion.clear();
            self.search.clear();
            self.error = None;
        }
        self.department_id = Some(department_id);
        self.loading = true;
        self.requests.issue()
    }

    pub fn complete_load(&mut self, ticket: RequestTicket, result: Result<CategoryTree>) -> LoadOutcome {
        if !self.requests.is_current(ticket) {
            tracing::debug!(
                "Discarding stale category tree response (request {})",
                ticket.value()
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result.and_then(|tree| TreeIndex::build(&tree).map(|index| (tree, index))) {
            Ok((tree, index)) => {
                tracing::debug!(
                    "Loaded category tree for department {:?}: {} categories",
                    self.department_id,
                    index.len()
                );
                self.tree = tree;
                self.index = index;
                self.error = None;
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load category tree for department {:?}: {}",
                    self.department_id,
                    e
                );
                self.error = Some(e.user_message());
                LoadOutcome::Failed
            }
        }
    }

    pub async fn load(&mut self, api: &dyn CategoryApi, department_id: Uuid) -> LoadOutcome {
        let ticket = self.begin_load(department_id);
        let result = api.get_category_tree(department_id).await;
        self.complete_load(ticket, result)
    }

    pub fn set_search(&mut self, raw: impl Into<String>) {
        self.search = raw.into();
    }

    pub fn search_query(&self) -> &str {
        &self.search
    }

    /// Expands or collapses a branch. Leaves and unknown ids are ignored.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        match self.index.get(id) {
            Some(entry) if entry.has_children => {
                self.expansion.toggle(id);
                true
            }
            _ => false,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Picks a category: closes the popover and clears the search
    pub fn select(&mut self, id: impl Into<String>) {
        self.selection = Selection::from_raw(id);
        self.open = false;
        self.search.clear();
    }

    /// Mirrors a selection change made by the owning form
    pub fn sync_selection(&mut self, raw: impl Into<String>) {
        self.selection = Selection::from_raw(raw);
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.selection.label(&self.index)
    }

    pub fn display_label(&self) -> &str {
        self.selection.display_label(&self.index, SELECTION_PLACEHOLDER)
    }

    pub fn view(&self) -> TreeView<'_> {
        if self.index.is_empty() {
            return TreeView::Empty;
        }

        match run_search(self.index.entries(), &self.search) {
            SearchOutcome::Tree => TreeView::Tree(visible_rows(&self.tree, &self.expansion)),
            SearchOutcome::Matches(found) => TreeView::SearchResults(found),
            SearchOutcome::NoMatches => TreeView::NoMatches,
        }
    }

    pub fn department_id(&self) -> Option<Uuid> {
        self.department_id
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn expansion(&self) -> &ExpansionState {
        &self.expansion
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::categories::clients::InMemoryCategoryApi;
    use crate::shared::test_helpers::{hardware_categories, hardware_tree, leaf};

    fn row_names(view: &TreeView<'_>) -> Vec<String> {
        match view {
            TreeView::Tree(rows) => rows.iter().map(|r| r.node.category.name.clone()).collect(),
            other => panic!("expected tree view, got {:?}", other),
        }
    }

    fn loaded_selector() -> (crate::shared::test_helpers::HardwareIds, TreeSelector) {
        let (ids, tree) = hardware_tree();
        let mut selector = TreeSelector::new("");
        let ticket = selector.begin_load(ids.department);
        assert_eq!(selector.complete_load(ticket, Ok(tree)), LoadOutcome::Applied);
        (ids, selector)
    }

    #[test]
    fn test_scenario_search_then_clear_restores_collapsed_tree() {
        let (ids, mut selector) = loaded_selector();
        selector.toggle(ids.hardware);

        selector.set_search("wide");
        match selector.view() {
            TreeView::SearchResults(found) => {
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].id(), ids.ultrawide);
                assert_eq!(found[0].path, vec!["Hardware", "Monitors", "Ultrawide"]);
            }
            other => panic!("expected search results, got {:?}", other),
        }

        selector.set_search("");
        let view = selector.view();
        assert_eq!(row_names(&view), vec!["Hardware", "Laptops", "Monitors"]);
        assert!(!selector.expansion().is_expanded(ids.monitors));
        assert_eq!(selector.index().len(), 5);
    }

    #[test]
    fn test_search_without_hits_differs_from_nothing_loaded() {
        let (_, mut selector) = loaded_selector();
        selector.set_search("furniture");
        assert_eq!(selector.view(), TreeView::NoMatches);

        let mut empty = TreeSelector::new("");
        let ticket = empty.begin_load(uuid::Uuid::now_v7());
        empty.complete_load(ticket, Ok(Vec::new()));
        empty.set_search("furniture");
        assert_eq!(empty.view(), TreeView::Empty);
    }

    #[test]
    fn test_toggle_ignores_leaves_and_unknown_ids() {
        let (ids, mut selector) = loaded_selector();

        assert!(!selector.toggle(ids.laptops));
        assert!(!selector.toggle(uuid::Uuid::now_v7()));
        assert!(selector.expansion().is_empty());

        assert!(selector.toggle(ids.monitors));
        assert!(selector.expansion().is_expanded(ids.monitors));
    }

    #[test]
    fn test_select_closes_popover_and_clears_search() {
        let (ids, mut selector) = loaded_selector();
        selector.open();
        selector.set_search("4k");

        selector.select(ids.four_k.to_string());

        assert!(!selector.is_open());
        assert_eq!(selector.search_query(), "");
        assert_eq!(selector.selected_label(), Some("4K"));
    }

    #[test]
    fn test_unknown_selection_shows_placeholder() {
        let (_, mut selector) = loaded_selector();
        selector.sync_selection(uuid::Uuid::now_v7().to_string());

        assert_eq!(selector.selected_label(), None);
        assert_eq!(selector.display_label(), SELECTION_PLACEHOLDER);
    }

    #[test]
    fn test_stale_response_for_previous_department_is_discarded() {
        let (ids, tree) = hardware_tree();
        let other_department = uuid::Uuid::now_v7();
        let mut selector = TreeSelector::new("");

        let first = selector.begin_load(other_department);
        let second = selector.begin_load(ids.department);

        assert_eq!(selector.complete_load(second, Ok(tree)), LoadOutcome::Applied);
        assert_eq!(
            selector.complete_load(first, Ok(vec![leaf("Stale")])),
            LoadOutcome::Stale
        );
        assert_eq!(selector.index().len(), 5);
        assert_eq!(selector.department_id(), Some(ids.department));
    }

    #[test]
    fn test_failed_refetch_keeps_last_good_tree() {
        let (ids, mut selector) = loaded_selector();

        let ticket = selector.begin_load(ids.department);
        let outcome =
            selector.complete_load(ticket, Err(AppError::FetchFailed("boom".to_string())));

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(selector.index().len(), 5);
        assert_eq!(selector.error(), Some("Failed to load categories"));
        assert!(!selector.is_loading());
    }

    #[test]
    fn test_department_change_resets_expansion_and_search() {
        let (ids, mut selector) = loaded_selector();
        selector.toggle(ids.hardware);
        selector.set_search("lap");

        selector.begin_load(uuid::Uuid::now_v7());

        assert!(selector.expansion().is_empty());
        assert_eq!(selector.search_query(), "");
        assert_eq!(selector.view(), TreeView::Empty);
    }

    #[test]
    fn test_same_department_reload_keeps_expansion() {
        let (ids, tree) = hardware_tree();
        let mut selector = TreeSelector::new("");
        let ticket = selector.begin_load(ids.department);
        selector.complete_load(ticket, Ok(tree.clone()));
        selector.toggle(ids.hardware);

        let ticket = selector.begin_load(ids.department);
        selector.complete_load(ticket, Ok(tree));

        assert!(selector.expansion().is_expanded(ids.hardware));
        assert_eq!(
            row_names(&selector.view()),
            vec!["Hardware", "Laptops", "Monitors"]
        );
    }

    #[tokio::test]
    async fn test_load_through_api() {
        let (ids, categories) = hardware_categories();
        let api = InMemoryCategoryApi::with_categories(categories);
        let mut selector = TreeSelector::new(ids.monitors.to_string());

        let outcome = selector.load(&api, ids.department).await;

        assert_eq!(outcome, LoadOutcome::Applied);
        assert_eq!(selector.display_label(), "Monitors");
        assert_eq!(row_names(&selector.view()), vec!["Hardware"]);
    }
}
