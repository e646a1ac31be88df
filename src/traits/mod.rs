mod catalog;
mod engine;

pub use catalog::CatalogSearch;
pub use engine::MapEngine;
