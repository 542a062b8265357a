use std::collections::HashSet;

use uuid::Uuid;

use crate::features::categories::models::CategoryNode;

/// Ids of tree nodes whose children are currently shown.
///
/// Starts empty (everything collapsed). `toggle` is a plain membership flip
/// and accepts any id, including leaves; hiding the chevron on leaves is up
/// to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<Uuid>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `id` is expanded afterwards
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded.contains(&id)
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    pub fn expanded_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.expanded.iter().copied()
    }
}

impl FromIterator<Uuid> for ExpansionState {
    fn from_iter<I: IntoIterator<Item = Uuid>>(ids: I) -> Self {
        Self {
            expanded: ids.into_iter().collect(),
        }
    }
}

/// A row of the nested tree as currently rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRow<'a> {
    pub node: &'a CategoryNode,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Roots plus the children of expanded nodes, pre-order
pub fn visible_rows<'a>(tree: &'a [CategoryNode], state: &ExpansionState) -> Vec<VisibleRow<'a>> {
    let mut rows = Vec::new();
    let mut stack: Vec<(&CategoryNode, usize)> = tree.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        let expanded = state.is_expanded(node.category.id);
        rows.push(VisibleRow {
            node,
            depth,
            has_children: node.has_children(),
            expanded,
        });

        if expanded {
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::hardware_tree;

    fn row_names<'a>(rows: &[VisibleRow<'a>]) -> Vec<&'a str> {
        rows.iter().map(|r| r.node.category.name.as_str()).collect()
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut state = ExpansionState::new();
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        state.toggle(a);
        let before = state.clone();

        assert!(state.toggle(b));
        assert!(!state.toggle(b));
        assert_eq!(state, before);

        assert!(!state.toggle(a));
        assert!(state.is_empty());
    }

    #[test]
    fn test_toggle_on_leaf_id_is_plain_flip() {
        let (ids, tree) = hardware_tree();
        let mut state = ExpansionState::new();

        assert!(state.toggle(ids.laptops));
        // A leaf stays a leaf: nothing extra becomes visible
        assert_eq!(
            row_names(&visible_rows(&tree, &state)),
            vec!["Hardware"]
        );
        assert!(!state.toggle(ids.laptops));
    }

    #[test]
    fn test_visible_rows_follow_expansion() {
        let (ids, tree) = hardware_tree();
        let mut state = ExpansionState::new();

        assert_eq!(row_names(&visible_rows(&tree, &state)), vec!["Hardware"]);

        state.toggle(ids.hardware);
        let rows = visible_rows(&tree, &state);
        assert_eq!(row_names(&rows), vec!["Hardware", "Laptops", "Monitors"]);
        assert!(rows[0].expanded);
        assert!(rows[2].has_children);
        assert!(!rows[2].expanded);

        state.toggle(ids.monitors);
        let rows = visible_rows(&tree, &state);
        assert_eq!(
            row_names(&rows),
            vec!["Hardware", "Laptops", "Monitors", "4K", "Ultrawide"]
        );
        assert_eq!(rows[4].depth, 2);
    }

    #[test]
    fn test_expanded_child_under_collapsed_parent_stays_hidden() {
        let (ids, tree) = hardware_tree();
        let mut state = ExpansionState::new();
        state.toggle(ids.monitors);

        assert_eq!(row_names(&visible_rows(&tree, &state)), vec!["Hardware"]);
        assert!(state.is_expanded(ids.monitors));
    }
}
