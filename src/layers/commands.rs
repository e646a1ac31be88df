//! Serializable map-engine commands.
//!
//! The server never talks to MapLibre directly. [`CommandRecorder`] keeps
//! track of which sources and layers exist on the page and queues the calls
//! the page has to replay, in order.

use crate::error::EngineError;
use crate::models::geometry::Bounds;
use crate::traits::MapEngine;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MapSource {
    Raster {
        tiles: Vec<String>,
        #[serde(rename = "tileSize")]
        tile_size: u32,
        attribution: String,
    },
    GeoJson {
        data: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Raster,
    Fill,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerKind,
    pub source: String,
    pub paint: Map<String, Value>,
    pub layout: Map<String, Value>,
}

impl MapLayer {
    pub fn new(id: impl Into<String>, kind: LayerKind, source: impl Into<String>) -> Self {
        MapLayer {
            id: id.into(),
            kind,
            source: source.into(),
            paint: Map::new(),
            layout: Map::new(),
        }
    }

    pub fn paint(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.paint.insert(name.to_string(), value.into());
        self
    }

    pub fn layout(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.layout.insert(name.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitOptions {
    pub padding: u32,
    pub duration: u32,
    #[serde(rename = "maxZoom", skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum MapCommand {
    AddSource { id: String, source: MapSource },
    RemoveSource { id: String },
    AddLayer { layer: MapLayer },
    RemoveLayer { id: String },
    SetPaintProperty { layer: String, name: String, value: Value },
    SetLayoutProperty { layer: String, name: String, value: Value },
    FitBounds { bounds: [[f64; 2]; 2], options: FitOptions },
}

#[derive(Debug, Default)]
pub struct CommandRecorder {
    sources: HashSet<String>,
    layers: HashSet<String>,
    pending: Vec<MapCommand>,
    #[cfg(test)]
    pub(crate) reject_sources: bool,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over everything queued since the last drain
    pub fn drain(&mut self) -> Vec<MapCommand> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[MapCommand] {
        &self.pending
    }
}

impl MapEngine for CommandRecorder {
    fn add_source(&mut self, id: &str, source: MapSource) -> Result<(), EngineError> {
        #[cfg(test)]
        if self.reject_sources {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }
        if !self.sources.insert(id.to_string()) {
            return Err(EngineError::DuplicateSource(id.to_string()));
        }
        self.pending.push(MapCommand::AddSource {
            id: id.to_string(),
            source,
        });
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.sources.remove(id) {
            return Err(EngineError::MissingSource(id.to_string()));
        }
        self.pending.push(MapCommand::RemoveSource { id: id.to_string() });
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains(id)
    }

    fn add_layer(&mut self, layer: MapLayer) -> Result<(), EngineError> {
        if !self.sources.contains(&layer.source) {
            return Err(EngineError::MissingSource(layer.source.clone()));
        }
        if !self.layers.insert(layer.id.clone()) {
            return Err(EngineError::DuplicateLayer(layer.id.clone()));
        }
        self.pending.push(MapCommand::AddLayer { layer });
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), EngineError> {
        if !self.layers.remove(id) {
            return Err(EngineError::MissingLayer(id.to_string()));
        }
        self.pending.push(MapCommand::RemoveLayer { id: id.to_string() });
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains(id)
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), EngineError> {
        if !self.layers.contains(layer) {
            return Err(EngineError::MissingLayer(layer.to_string()));
        }
        self.pending.push(MapCommand::SetPaintProperty {
            layer: layer.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), EngineError> {
        if !self.layers.contains(layer) {
            return Err(EngineError::MissingLayer(layer.to_string()));
        }
        self.pending.push(MapCommand::SetLayoutProperty {
            layer: layer.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Bounds, options: FitOptions) {
        self.pending.push(MapCommand::FitBounds {
            bounds: bounds.corners(),
            options,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raster() -> MapSource {
        MapSource::Raster {
            tiles: vec!["https://example.com/{z}/{x}/{y}.png".to_string()],
            tile_size: 256,
            attribution: String::new(),
        }
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let mut rec = CommandRecorder::new();
        rec.add_source("a", raster()).unwrap();
        assert_eq!(
            rec.add_source("a", raster()),
            Err(EngineError::DuplicateSource("a".to_string()))
        );
        assert_eq!(rec.drain().len(), 1);
    }

    #[test]
    fn test_layer_needs_source() {
        let mut rec = CommandRecorder::new();
        let layer = MapLayer::new("l", LayerKind::Raster, "missing");
        assert_eq!(
            rec.add_layer(layer),
            Err(EngineError::MissingSource("missing".to_string()))
        );
        assert!(rec.pending().is_empty());
    }

    #[test]
    fn test_property_on_missing_layer() {
        let mut rec = CommandRecorder::new();
        assert!(rec.set_paint_property("nope", "raster-opacity", json!(0.5)).is_err());
        assert!(rec.set_layout_property("nope", "visibility", json!("none")).is_err());
    }

    #[test]
    fn test_command_wire_format() {
        let mut rec = CommandRecorder::new();
        rec.add_source("src", raster()).unwrap();
        rec.add_layer(
            MapLayer::new("src", LayerKind::Raster, "src")
                .paint("raster-opacity", 0.5)
                .layout("visibility", "none"),
        )
        .unwrap();
        rec.fit_bounds(
            Bounds::from((1.0, 2.0, 3.0, 4.0)),
            FitOptions {
                padding: 50,
                duration: 1000,
                max_zoom: Some(13.0),
            },
        );

        let wire = serde_json::to_value(rec.drain()).unwrap();
        assert_eq!(
            wire,
            json!([
                {
                    "op": "addSource",
                    "id": "src",
                    "source": {
                        "type": "raster",
                        "tiles": ["https://example.com/{z}/{x}/{y}.png"],
                        "tileSize": 256,
                        "attribution": ""
                    }
                },
                {
                    "op": "addLayer",
                    "layer": {
                        "id": "src",
                        "type": "raster",
                        "source": "src",
                        "paint": {"raster-opacity": 0.5},
                        "layout": {"visibility": "none"}
                    }
                },
                {
                    "op": "fitBounds",
                    "bounds": [[1.0, 2.0], [3.0, 4.0]],
                    "options": {"padding": 50, "duration": 1000, "maxZoom": 13.0}
                }
            ])
        );
        assert!(rec.pending().is_empty());
    }
}
