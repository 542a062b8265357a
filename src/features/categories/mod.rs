//! Procurement categories.
//!
//! Read models over the procurement backend's category endpoints, plus the
//! per-view state used by the category selector and the catalog manager.
//!
//! | Method | Path                                                | Handler                  |
//! |--------|-----------------------------------------------------|--------------------------|
//! | GET    | `/api/departments/{department_id}/category-tree`       | `get_category_tree`      |
//! | GET    | `/api/departments/{department_id}/category-tree/label` | `get_selected_label`     |
//! | GET    | `/api/categories`                                   | `list_categories`        |
//! | GET    | `/api/categories/parent-candidates`                 | `list_parent_candidates` |
//! | POST   | `/api/categories`                                   | `create_category`        |
//! | PATCH  | `/api/categories/{id}`                              | `update_category`        |
//! | DELETE | `/api/categories/{id}`                              | `delete_category`        |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
