mod category;
mod page;

pub use category::*;
pub use page::*;
