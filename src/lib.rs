//! Category view service for the procurement front-end.
//!
//! Serves the department category tree, search over it, parent candidates
//! and the paginated catalog, on top of the procurement REST backend. The
//! per-view state machines (`TreeSelector`, `CatalogManager`) are exported
//! for front-end hosts that keep view state server-side.

pub mod core;
pub mod features;
pub mod shared;
