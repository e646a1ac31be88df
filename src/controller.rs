//! The viewer state machine.
//!
//! The page posts explicit [`Action`]s; the [`Viewer`] mutates its stores and
//! queues map commands. Searches are split into a [`SearchTicket`] and a
//! completion so the network call never runs under the viewer lock, and a
//! generation counter lets a newer search supersede one still in flight.

use crate::catalog::SearchQuery;
use crate::config::Config;
use crate::error::Result;
use crate::grid::{CellSelection, Grid, GridSelector};
use crate::layers::{CommandRecorder, FitOptions, LayerRenderer, LayerSlotStore, MapCommand};
use crate::models::catalog::{DEFAULT_MAX_CLOUD_COVER, SearchFilters, SearchResultPage};
use crate::models::geometry::Bounds;
use crate::models::slot::{SlotId, Window};
use crate::presenter::{ResultsPresenter, ResultsView};
use crate::prefs::{Preferences, PreferencesStore};
use crate::traits::CatalogSearch;
use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Where the page fetches the grid GeoJSON from
pub const GRID_DATA_URL: &str = "/grid";
pub const GRID_ERROR_MESSAGE: &str = "Error loading S2 grid data";
pub const GRID_ERROR_HIDE_AFTER_MS: u64 = 3000;

/// Framing for a clicked cell
pub const CELL_FIT: FitOptions = FitOptions {
    padding: 50,
    duration: 1000,
    max_zoom: Some(13.0),
};

/// Framing for an item shown in the current slot
pub const ITEM_FIT: FitOptions = FitOptions {
    padding: 50,
    duration: 1000,
    max_zoom: None,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SelectCell { lon: f64, lat: f64 },
    SetFilters { filters: SearchFilters },
    LoadMore,
    ViewItem { item_id: String },
    ToggleWindow { window: Window, item_id: String },
    SetVisible { slot: SlotId, visible: bool },
    SetOpacity { slot: SlotId, opacity: f64 },
    ToggleMapControls,
    ToggleFilters,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GridStatus {
    Loading,
    Ready { cells: usize },
    Failed { message: String, hide_after_ms: u64 },
}

/// A search waiting to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct SearchTicket {
    pub generation: u64,
    pub reset: bool,
    pub query: SearchQuery,
}

#[derive(Debug, PartialEq)]
pub enum Dispatch {
    Done,
    Search(SearchTicket),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerControl {
    pub slot: SlotId,
    pub label: &'static str,
    pub visible: bool,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub grid: GridStatus,
    pub selection: Option<CellSelection>,
    pub filters: SearchFilters,
    pub results: ResultsView,
    pub layer_controls: Vec<LayerControl>,
    pub controls_visible: bool,
    pub controls_minimized: bool,
    pub window_a: Option<String>,
    pub window_b: Option<String>,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub commands: Vec<MapCommand>,
    pub state: ViewState,
}

pub struct Viewer {
    slots: LayerSlotStore,
    renderer: LayerRenderer,
    engine: CommandRecorder,
    grid: Option<GridSelector>,
    grid_status: GridStatus,
    presenter: ResultsPresenter,
    prefs: PreferencesStore,
    filters: SearchFilters,
    selection: Option<CellSelection>,
    generation: u64,
    controls_minimized: bool,
}

impl Viewer {
    pub fn new(config: &Config, prefs: PreferencesStore) -> Self {
        let controls_minimized = prefs.get().map_controls_minimized;
        Viewer {
            slots: LayerSlotStore::new(),
            renderer: LayerRenderer::new(config.tile_template.clone(), config.tile_size),
            engine: CommandRecorder::new(),
            grid: None,
            grid_status: GridStatus::Loading,
            presenter: ResultsPresenter::new(),
            prefs,
            filters: SearchFilters {
                max_cloud_cover: config.max_cloud_cover,
                ..SearchFilters::default()
            },
            selection: None,
            generation: 0,
            controls_minimized,
        }
    }

    pub fn slots(&self) -> &LayerSlotStore {
        &self.slots
    }

    pub fn presenter(&self) -> &ResultsPresenter {
        &self.presenter
    }

    pub fn grid_geojson(&self) -> Option<Bytes> {
        self.grid.as_ref().map(GridSelector::geojson)
    }

    /// Install the startup grid load outcome
    pub fn grid_loaded(&mut self, result: Result<Grid>) {
        match result {
            Ok(grid) => {
                let selector = GridSelector::new(grid);
                if selector.is_empty() {
                    tracing::warn!("grid has no polygon cells, clicks will not select anything");
                }
                self.grid_status = GridStatus::Ready {
                    cells: selector.len(),
                };
                self.grid = Some(selector);
                if let Err(e) = self
                    .renderer
                    .add_grid_layers(&mut self.engine, GRID_DATA_URL)
                {
                    tracing::error!("failed to add grid layers: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("error loading grid data: {}", e);
                self.grid_status = GridStatus::Failed {
                    message: GRID_ERROR_MESSAGE.to_string(),
                    hide_after_ms: GRID_ERROR_HIDE_AFTER_MS,
                };
            }
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Dispatch {
        tracing::debug!(?action, "dispatch");
        match action {
            Action::SelectCell { lon, lat } => self.select_cell(lon, lat),
            Action::SetFilters { mut filters } => {
                if !filters.max_cloud_cover.is_finite() {
                    filters.max_cloud_cover = DEFAULT_MAX_CLOUD_COVER;
                }
                self.filters = filters;
                if self.selection.is_some() {
                    self.start_search(true)
                } else {
                    Dispatch::Done
                }
            }
            Action::LoadMore => {
                if self.selection.is_some() && self.presenter.load_more_enabled() {
                    self.start_search(false)
                } else {
                    Dispatch::Done
                }
            }
            Action::ViewItem { item_id } => {
                let bounds = self.presenter.item(&item_id).and_then(|i| i.bbox);
                if self.assign(SlotId::Current, &item_id, bounds) {
                    self.presenter.set_viewing(Some(item_id));
                }
                Dispatch::Done
            }
            Action::ToggleWindow { window, item_id } => {
                self.toggle_window(window, &item_id);
                Dispatch::Done
            }
            Action::SetVisible { slot, visible } => {
                self.slots.set_visible(slot, visible);
                if let Err(e) = self
                    .renderer
                    .sync_visibility(&mut self.engine, self.slots.get(slot))
                {
                    tracing::warn!("visibility of {}: {}", slot, e);
                }
                Dispatch::Done
            }
            Action::SetOpacity { slot, opacity } => {
                self.slots.set_opacity(slot, opacity);
                if let Err(e) = self
                    .renderer
                    .sync_opacity(&mut self.engine, self.slots.get(slot))
                {
                    tracing::warn!("opacity of {}: {}", slot, e);
                }
                Dispatch::Done
            }
            Action::ToggleMapControls => {
                self.controls_minimized = self.prefs.toggle_map_controls();
                Dispatch::Done
            }
            Action::ToggleFilters => {
                self.prefs.toggle_filters();
                Dispatch::Done
            }
        }
    }

    /// Apply a finished search. Returns false when a newer search has
    /// superseded the ticket and the result was dropped.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchResultPage>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                generation = ticket.generation,
                latest = self.generation,
                "dropping stale search response"
            );
            return false;
        }
        match result {
            Ok(page) => {
                tracing::info!(
                    cell = %ticket.query.cell_id,
                    items = page.items.len(),
                    more = page.continuation_token.is_some(),
                    "search complete"
                );
                self.presenter.present(page, ticket.reset);
            }
            Err(e) => {
                tracing::warn!(cell = %ticket.query.cell_id, "error searching STAC API: {}", e);
                self.presenter.fail(&e.to_string());
            }
        }
        true
    }

    /// Commands queued since the last update, with the current view state
    pub fn update(&mut self) -> Update {
        Update {
            commands: self.engine.drain(),
            state: self.state(),
        }
    }

    /// Rebuild the map from scratch, for a freshly loaded page
    pub fn replay(&mut self) -> Update {
        self.engine = CommandRecorder::new();
        if self.grid.is_some() {
            if let Err(e) = self
                .renderer
                .add_grid_layers(&mut self.engine, GRID_DATA_URL)
            {
                tracing::error!("failed to add grid layers: {}", e);
            }
        }
        for slot in self.slots.active_slots() {
            if let Err(e) = self.renderer.render(&mut self.engine, slot, None) {
                tracing::error!("failed to replay {} layer: {}", slot.slot, e);
            }
        }
        self.update()
    }

    pub fn state(&self) -> ViewState {
        let layer_controls = self
            .slots
            .active_slots()
            .map(|s| LayerControl {
                slot: s.slot,
                label: s.slot.label(),
                visible: s.visible,
                opacity: s.opacity,
            })
            .collect();

        ViewState {
            grid: self.grid_status.clone(),
            selection: self.selection.clone(),
            filters: self.filters.clone(),
            results: self.presenter.view(&self.slots),
            layer_controls,
            controls_visible: self.slots.any_active(),
            controls_minimized: self.controls_minimized,
            window_a: self.slots.item_for(SlotId::WindowA).map(str::to_string),
            window_b: self.slots.item_for(SlotId::WindowB).map(str::to_string),
            preferences: self.prefs.get(),
        }
    }

    fn select_cell(&mut self, lon: f64, lat: f64) -> Dispatch {
        let Some(grid) = &self.grid else {
            return Dispatch::Done;
        };
        let selection = match grid.select(lon, lat) {
            Ok(Some(selection)) => selection,
            Ok(None) => return Dispatch::Done,
            Err(e) => {
                tracing::warn!(lon, lat, "cannot select cell: {}", e);
                self.presenter.set_status(format!("Cannot search this cell: {}", e));
                return Dispatch::Done;
            }
        };

        tracing::info!(cell = %selection.cell_id, "selected grid cell");
        self.renderer
            .frame(&mut self.engine, selection.bounds, CELL_FIT);
        self.selection = Some(selection);
        self.start_search(true)
    }

    fn start_search(&mut self, reset: bool) -> Dispatch {
        let Some(selection) = &self.selection else {
            return Dispatch::Done;
        };
        let cell_id = selection.cell_id.clone();

        let token = if reset {
            self.generation += 1;
            None
        } else {
            self.presenter.token().map(str::to_string)
        };
        self.presenter.begin(&cell_id, reset);

        Dispatch::Search(SearchTicket {
            generation: self.generation,
            reset,
            query: SearchQuery::new(cell_id, self.filters.clone()).with_token(token),
        })
    }

    fn toggle_window(&mut self, window: Window, item_id: &str) {
        let slot = window.slot();
        if self.slots.item_for(slot) == Some(item_id) {
            if let Some(handle) = self.slots.clear(slot) {
                self.renderer.remove(&mut self.engine, &handle);
            }
            self.presenter
                .set_status(format!("Removed {} from {} layer", item_id, slot));
            return;
        }
        let was_visible = self.slots.get(slot).visible;
        self.slots.set_visible(slot, true);
        if !self.assign(slot, item_id, None) {
            self.slots.set_visible(slot, was_visible);
        }
    }

    /// Put `item_id` on `slot` and render it. On failure the slot is rolled
    /// back to inactive so store and map agree.
    fn assign(&mut self, slot: SlotId, item_id: &str, bounds: Option<Bounds>) -> bool {
        let previous = self.slots.assign(slot, item_id);
        let rendered = self
            .renderer
            .render(&mut self.engine, self.slots.get(slot), previous.as_ref());

        match rendered {
            Ok(()) => {
                if slot == SlotId::Current {
                    if let Some(bounds) = bounds {
                        self.renderer.frame(&mut self.engine, bounds, ITEM_FIT);
                    }
                }
                self.controls_minimized = false;
                self.presenter
                    .set_status(format!("Added {} to {} layer", item_id, slot));
                true
            }
            Err(e) => {
                tracing::error!("error adding {} layer: {}", slot, e);
                if let Some(handle) = self.slots.clear(slot) {
                    self.renderer.remove(&mut self.engine, &handle);
                }
                self.presenter
                    .set_status(format!("Error loading {} layer: {}", slot, e));
                false
            }
        }
    }
}

/// Run one action to completion, performing any search it triggers outside
/// the lock.
pub async fn drive(viewer: &Mutex<Viewer>, catalog: &dyn CatalogSearch, action: Action) -> Update {
    let dispatch = viewer.lock().await.dispatch(action);
    if let Dispatch::Search(ticket) = dispatch {
        let result = catalog.search(&ticket.query).await;
        viewer.lock().await.complete_search(ticket, result);
    }
    viewer.lock().await.update()
}
