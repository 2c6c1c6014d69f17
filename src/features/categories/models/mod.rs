mod category;

pub use category::{Category, CategoryChanges, CategorySummary, NewCategory};
