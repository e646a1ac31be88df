pub mod catalog;
pub mod geometry;
pub mod slot;
