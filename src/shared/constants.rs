// =============================================================================
// DISPLAY CONSTANTS
// =============================================================================

/// Label of the "no parent" option offered before every parent candidate list
pub const NO_PARENT_LABEL: &str = "No parent (top level)";

/// Label shown by the tree selector when nothing resolvable is selected
pub const SELECTION_PLACEHOLDER: &str = "Select a category";
