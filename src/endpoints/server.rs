use crate::catalog::StacClient;
use crate::config::Config;
use crate::controller::Viewer;
use crate::endpoints::handlers::{
    action_handler, grid_handler, state_handler, updates_handler, webmap_handler,
};
use crate::grid::load_grid;
use crate::prefs::PreferencesStore;
use crate::traits::CatalogSearch;
use crate::utils::status::print_config_summary;
use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct AppState {
    pub viewer: Mutex<Viewer>,
    pub catalog: Arc<dyn CatalogSearch>,
    pub basemap_template: String,
}

pub struct ViewerServer {
    config: Config,
    state: Arc<AppState>,
}

impl ViewerServer {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = StacClient::new(
            &config.stac_url,
            config.collection.clone(),
            config.page_size,
            config.request_timeout,
        )?;
        let prefs = PreferencesStore::load(&config.preferences_path);
        Ok(Self::with_catalog(config, Arc::new(catalog), prefs))
    }

    pub fn with_catalog(
        config: Config,
        catalog: Arc<dyn CatalogSearch>,
        prefs: PreferencesStore,
    ) -> Self {
        let state = AppState {
            viewer: Mutex::new(Viewer::new(&config, prefs)),
            catalog,
            basemap_template: config.basemap_template.clone(),
        };
        Self {
            config,
            state: Arc::new(state),
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.state.clone()
    }

    pub fn router(state: Arc<AppState>) -> Router {
        Router::new()
            .route("/", get(webmap_handler))
            .route("/map", get(webmap_handler))
            .route("/grid", get(grid_handler))
            .route("/api/state", get(state_handler))
            .route("/api/updates", get(updates_handler))
            .route("/api/actions", post(action_handler))
            .with_state(state)
    }

    /// Load the grid in the background, then serve until shut down
    pub async fn start(self) -> anyhow::Result<()> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.config.request_timeout)
            .build()?;
        let source = self.config.grid.clone();
        let state = self.state.clone();
        tokio::spawn(async move {
            let result = load_grid(&source, &client).await;
            state.viewer.lock().await.grid_loaded(result);
        });

        let app = Self::router(self.state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = tokio::net::TcpListener::bind(addr).await?;

        print_config_summary(&self.config);
        println!(
            r#"
    🚀 StacYolo serving on {}

    🗺️ Pick a grid cell and compare scenes
       → http://{}/map

    📦 Grid overlay (GeoJSON, once loaded)
       → http://{}/grid
            "#,
            addr, addr, addr
        );

        axum::serve(listener, app).await?;

        Ok(())
    }
}
