use super::{CELL_ID_PROPERTY, CellSelection, Grid, GridCell, Polygon};
use crate::error::{Error, Result};
use axum::body::Bytes;

/// Click hit-testing over the loaded grid
#[derive(Debug, Clone)]
pub struct GridSelector {
    grid: Grid,
}

impl GridSelector {
    pub fn new(grid: Grid) -> Self {
        GridSelector { grid }
    }

    pub fn len(&self) -> usize {
        self.grid.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.cells.is_empty()
    }

    pub fn geojson(&self) -> Bytes {
        self.grid.geojson.clone()
    }

    /// First cell, in dataset order, that contains the point. Longitudes
    /// from wrapped world copies are folded back into [-180, 180).
    pub fn hit(&self, lon: f64, lat: f64) -> Option<&GridCell> {
        let lon = wrap_longitude(lon);
        self.grid
            .cells
            .iter()
            .filter(|c| c.bounds.contains(lon, lat))
            .find(|c| c.polygons.iter().any(|p| polygon_contains(p, lon, lat)))
    }

    /// Resolve a click to a cell id and its bounds. `Ok(None)` when the
    /// click misses every cell.
    pub fn select(&self, lon: f64, lat: f64) -> Result<Option<CellSelection>> {
        let Some(cell) = self.hit(lon, lat) else {
            return Ok(None);
        };
        let cell_id = cell.id.clone().ok_or_else(|| Error::MissingCellId {
            property: CELL_ID_PROPERTY.to_string(),
        })?;
        Ok(Some(CellSelection {
            cell_id,
            bounds: cell.bounds,
        }))
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

fn polygon_contains(polygon: &Polygon, x: f64, y: f64) -> bool {
    ring_contains(&polygon.exterior, x, y) && !polygon.holes.iter().any(|h| ring_contains(h, x, y))
}

// even-odd ray casting
fn ring_contains(ring: &[(f64, f64)], x: f64, y: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
