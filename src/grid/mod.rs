//! The MGRS grid overlay: archive loading and click selection.

pub mod loader;
pub mod selector;

use crate::models::geometry::Bounds;
use axum::body::Bytes;
use serde::Serialize;

/// Feature property holding the tile identifier
pub const CELL_ID_PROPERTY: &str = "Name";

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub id: Option<String>,
    pub polygons: Vec<Polygon>,
    pub bounds: Bounds,
}

/// A loaded grid: parsed cells plus the GeoJSON text the page renders
#[derive(Debug, Clone)]
pub struct Grid {
    pub cells: Vec<GridCell>,
    pub geojson: Bytes,
}

/// The outcome of a click on the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellSelection {
    pub cell_id: String,
    pub bounds: Bounds,
}

pub use loader::load_grid;
pub use selector::GridSelector;
