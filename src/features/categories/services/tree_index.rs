use std::collections::HashMap;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{CategoryNode, FlattenedCategory};

/// Pre-order linearization of a category tree.
///
/// Output order equals input order at every level. A category id seen twice
/// (the only way a cycle can show up in an owned tree) fails with
/// `AppError::CycleDetected`.
pub fn flatten(tree: &[CategoryNode]) -> Result<Vec<FlattenedCategory>> {
    flatten_indexed(tree).map(|(entries, _)| entries)
}

/// Flattens and records `id -> position` in the same pass
fn flatten_indexed(tree: &[CategoryNode]) -> Result<(Vec<FlattenedCategory>, HashMap<Uuid, usize>)> {
    let mut entries = Vec::new();
    let mut positions: HashMap<Uuid, usize> = HashMap::new();

    // (node, depth, ancestor names)
    let mut stack: Vec<(&CategoryNode, usize, Vec<String>)> =
        tree.iter().rev().map(|root| (root, 0, Vec::new())).collect();

    while let Some((node, depth, mut path)) = stack.pop() {
        let id = node.category.id;
        if positions.insert(id, entries.len()).is_some() {
            tracing::warn!("Category {} appears twice in tree, refusing to flatten", id);
            return Err(AppError::CycleDetected(id));
        }

        path.push(node.category.name.clone());

        for child in node.children.iter().rev() {
            stack.push((child, depth + 1, path.clone()));
        }

        entries.push(FlattenedCategory {
            category: node.category.clone(),
            depth,
            has_children: node.has_children(),
            path,
        });
    }

    Ok((entries, positions))
}

/// Derived counters over one flatten pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub total: usize,
    pub roots: usize,
    pub leaves: usize,
    pub max_depth: usize,
}

/// Flattened entries of one tree plus an id lookup.
///
/// Only valid for the tree it was built from; rebuild it whenever the
/// source tree changes.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    entries: Vec<FlattenedCategory>,
    positions: HashMap<Uuid, usize>,
}

impl TreeIndex {
    pub fn build(tree: &[CategoryNode]) -> Result<Self> {
        let (entries, positions) = flatten_indexed(tree)?;
        Ok(Self { entries, positions })
    }

    pub fn entries(&self) -> &[FlattenedCategory] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&FlattenedCategory> {
        self.positions.get(&id).map(|&i| &self.entries[i])
    }

    pub fn label(&self, id: Uuid) -> Option<&str> {
        self.get(id).map(|entry| entry.name())
    }

    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            total: self.entries.len(),
            roots: self.entries.iter().filter(|e| e.depth == 0).count(),
            leaves: self.entries.iter().filter(|e| !e.has_children).count(),
            max_depth: self.entries.iter().map(|e| e.depth).max().unwrap_or(0),
        }
    }
}
