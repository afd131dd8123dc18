mod category;

pub use category::{Category, CategorySummary, CATEGORY_COLUMNS};
