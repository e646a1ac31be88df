use crate::error::EngineError;
use crate::layers::commands::{FitOptions, LayerKind, MapLayer, MapSource};
use crate::models::geometry::Bounds;
use crate::models::slot::{LayerHandle, LayerSlot};
use crate::traits::MapEngine;
use serde_json::json;

pub const GRID_SOURCE: &str = "s2-grid";
pub const GRID_FILL_LAYER: &str = "s2-grid-fill";
pub const GRID_LINE_LAYER: &str = "s2-grid-line";

const GRID_COLOUR: &str = "#088";
const IMAGERY_ATTRIBUTION: &str = "Sentinel-2 imagery from <a href=\"https://planetarycomputer.microsoft.com/\">Planetary Computer</a>";

/// Keeps MapLibre in step with the slot store
#[derive(Debug, Clone)]
pub struct LayerRenderer {
    tile_template: String,
    tile_size: u32,
}

impl LayerRenderer {
    /// `tile_template` carries `{item}` for the item id and the usual
    /// `{z}/{x}/{y}` placeholders, which are left for the map engine.
    pub fn new(tile_template: impl Into<String>, tile_size: u32) -> Self {
        LayerRenderer {
            tile_template: tile_template.into(),
            tile_size,
        }
    }

    pub fn tile_url(&self, item_id: &str) -> String {
        self.tile_template.replace("{item}", &encode_component(item_id))
    }

    /// Drop `previous` from the map and add the slot's current layer with its
    /// opacity and visibility applied.
    pub fn render<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        slot: &LayerSlot,
        previous: Option<&LayerHandle>,
    ) -> Result<(), EngineError> {
        if let Some(previous) = previous {
            self.remove(engine, previous);
        }

        let (Some(handle), Some(item_id)) = (&slot.handle, &slot.item_id) else {
            return Ok(());
        };
        // the same handle may be rendered again on replay
        self.remove(engine, handle);

        engine.add_source(
            handle.as_str(),
            MapSource::Raster {
                tiles: vec![self.tile_url(item_id)],
                tile_size: self.tile_size,
                attribution: IMAGERY_ATTRIBUTION.to_string(),
            },
        )?;
        engine.add_layer(
            MapLayer::new(handle.as_str(), LayerKind::Raster, handle.as_str())
                .paint("raster-opacity", slot.opacity)
                .layout("visibility", slot.visibility()),
        )
    }

    /// Remove a slot's layer and source, each only if the map has it
    pub fn remove<E: MapEngine + ?Sized>(&self, engine: &mut E, handle: &LayerHandle) {
        let id = handle.as_str();
        if engine.has_layer(id) {
            let _ = engine.remove_layer(id);
        }
        if engine.has_source(id) {
            let _ = engine.remove_source(id);
        }
    }

    pub fn sync_visibility<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        slot: &LayerSlot,
    ) -> Result<(), EngineError> {
        match &slot.handle {
            Some(handle) => {
                engine.set_layout_property(handle.as_str(), "visibility", json!(slot.visibility()))
            }
            None => Ok(()),
        }
    }

    pub fn sync_opacity<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        slot: &LayerSlot,
    ) -> Result<(), EngineError> {
        match &slot.handle {
            Some(handle) => {
                engine.set_paint_property(handle.as_str(), "raster-opacity", json!(slot.opacity))
            }
            None => Ok(()),
        }
    }

    pub fn frame<E: MapEngine + ?Sized>(&self, engine: &mut E, bounds: Bounds, options: FitOptions) {
        engine.fit_bounds(bounds, options);
    }

    /// Grid overlay: a faint fill for click hits and a thin outline
    pub fn add_grid_layers<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        data_url: &str,
    ) -> Result<(), EngineError> {
        if engine.has_source(GRID_SOURCE) {
            return Ok(());
        }
        engine.add_source(
            GRID_SOURCE,
            MapSource::GeoJson {
                data: data_url.to_string(),
            },
        )?;
        engine.add_layer(
            MapLayer::new(GRID_FILL_LAYER, LayerKind::Fill, GRID_SOURCE)
                .paint("fill-color", GRID_COLOUR)
                .paint("fill-opacity", 0.1),
        )?;
        engine.add_layer(
            MapLayer::new(GRID_LINE_LAYER, LayerKind::Line, GRID_SOURCE)
                .paint("line-color", GRID_COLOUR)
                .paint("line-width", 0.5)
                .paint("line-opacity", 0.8),
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
