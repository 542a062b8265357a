use crate::features::categories::models::FlattenedCategory;

/// Normalized free-text query over the flattened index.
///
/// Matching is case-insensitive substring containment against the name or
/// any path segment. Not fuzzy, not tokenized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    needle: String,
}

impl SearchQuery {
    /// Blank input means "no filtering" and yields `None`
    pub fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            needle: text.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, entry: &FlattenedCategory) -> bool {
        entry.name().to_lowercase().contains(&self.needle)
            || entry
                .path
                .iter()
                .any(|segment| segment.to_lowercase().contains(&self.needle))
    }
}

/// All matching entries, in traversal order, no limit
pub fn search<'a>(entries: &'a [FlattenedCategory], query: &SearchQuery) -> Vec<&'a FlattenedCategory> {
    entries.iter().filter(|entry| query.matches(entry)).collect()
}

/// What the selector should show for a given query
#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// No query: show the nested tree
    Tree,
    Matches(Vec<&'a FlattenedCategory>),
    /// A query is active and nothing matched
    NoMatches,
}

pub fn run_search<'a>(entries: &'a [FlattenedCategory], raw: &str) -> SearchOutcome<'a> {
    let Some(query) = SearchQuery::parse(raw) else {
        return SearchOutcome::Tree;
    };

    let matches = search(entries, &query);
    tracing::debug!(
        "Category search '{}' matched {} of {} entries",
        query.as_str(),
        matches.len(),
        entries.len()
    );

    if matches.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(matches)
    }
}
