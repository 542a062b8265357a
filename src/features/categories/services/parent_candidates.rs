use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::Category;

/// One choice in the parent picker of the category editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentOption {
    /// Top level, always offered first
    None,
    Category { id: Uuid, name: String },
}

impl ParentOption {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            ParentOption::None => None,
            ParentOption::Category { id, .. } => Some(*id),
        }
    }
}

/// Every category reachable below `root` through parent links (not `root` itself)
pub fn descendants_of(categories: &[Category], root: Uuid) -> HashSet<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for category in categories {
        if let Some(parent_id) = category.parent_id {
            children.entry(parent_id).or_default().push(category.id);
        }
    }

    let mut found = HashSet::new();
    let mut pending = vec![root];
    while let Some(current) = pending.pop() {
        for &child in children.get(&current).into_iter().flatten() {
            if child != root && found.insert(child) {
                pending.push(child);
            }
        }
    }
    found
}

/// Legal parents for a category of `department_id`.
///
/// Starts with the "no parent" sentinel, then every loaded category of that
/// department sorted by name, minus the edited category and its descendants.
pub fn parent_candidates(
    categories: &[Category],
    department_id: Uuid,
    editing: Option<Uuid>,
) -> Vec<ParentOption> {
    let excluded = match editing {
        Some(id) => {
            let mut set = descendants_of(categories, id);
            set.insert(id);
            set
        }
        None => HashSet::new(),
    };

    let mut eligible: Vec<&Category> = categories
        .iter()
        .filter(|c| c.department_id == department_id && !excluded.contains(&c.id))
        .collect();
    eligible.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });

    std::iter::once(ParentOption::None)
        .chain(eligible.into_iter().map(|c| ParentOption::Category {
            id: c.id,
            name: c.name.clone(),
        }))
        .collect()
}

/// Rejects a parent assignment that would make `id` its own ancestor.
///
/// Walks the ancestor chain of `new_parent` through the loaded categories; an
/// ancestor that is not loaded ends the walk. A pre-existing loop in the
/// chain is reported as well.
pub fn ensure_acyclic(categories: &[Category], id: Uuid, new_parent: Option<Uuid>) -> Result<()> {
    let parents: HashMap<Uuid, Option<Uuid>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();

    let mut seen = HashSet::new();
    let mut current = new_parent;
    while let Some(ancestor) = current {
        if ancestor == id || !seen.insert(ancestor) {
            tracing::warn!(
                "Rejected parent {:?} for category {}: cycle at {}",
                new_parent,
                id,
                ancestor
            );
            return Err(AppError::CycleDetected(ancestor));
        }
        current = parents.get(&ancestor).copied().flatten();
    }
    Ok(())
}

/// A parent must exist among the loaded categories of the same department
pub fn ensure_parent_in_department(
    categories: &[Category],
    department_id: Uuid,
    parent_id: Uuid,
) -> Result<()> {
    match categories.iter().find(|c| c.id == parent_id) {
        Some(parent) if parent.department_id == department_id => Ok(()),
        Some(_) => Err(AppError::Validation(
            "Parent category must belong to the same department".to_string(),
        )),
        None => Err(AppError::Validation(format!(
            "Parent category {} not found in department",
            parent_id
        ))),
    }
}
