use crate::error::EngineError;
use crate::layers::commands::{FitOptions, MapLayer, MapSource};
use crate::models::geometry::Bounds;
use serde_json::Value;

/// The subset of the MapLibre API the viewer drives
pub trait MapEngine {
    fn add_source(&mut self, id: &str, source: MapSource) -> Result<(), EngineError>;
    fn remove_source(&mut self, id: &str) -> Result<(), EngineError>;
    fn has_source(&self, id: &str) -> bool;

    fn add_layer(&mut self, layer: MapLayer) -> Result<(), EngineError>;
    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError>;
    fn has_layer(&self, id: &str) -> bool;

    fn set_paint_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), EngineError>;
    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), EngineError>;

    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions);
}
