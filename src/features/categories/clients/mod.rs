mod category_api;
mod http;
mod in_memory;

pub use category_api::CategoryApi;
pub use http::HttpCategoryApi;
pub use in_memory::InMemoryCategoryApi;
