use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GRID_URL: &str = "https://data.source.coop/cholmes/s2-grid/s2-grid.geojson.zip";
pub const DEFAULT_STAC_URL: &str = "https://planetarycomputer.microsoft.com/api/stac/v1/search";
pub const DEFAULT_COLLECTION: &str = "sentinel-2-l2a";
pub const DEFAULT_TILE_TEMPLATE: &str = "https://planetarycomputer.microsoft.com/api/data/v1/item/tiles/WebMercatorQuad/{z}/{x}/{y}@1x?collection=sentinel-2-l2a&item={item}&assets=visual&asset_bidx=visual%7C1%2C2%2C3&nodata=0&format=png";
pub const DEFAULT_BASEMAP_TEMPLATE: &str = "https://tiles.maps.eox.at/wmts?layer=s2cloudless-2024_3857&style=default&tilematrixset=GoogleMapsCompatible&Service=WMTS&Request=GetTile&Version=1.0.0&Format=image%2Fjpeg&TileMatrix={z}&TileCol={x}&TileRow={y}";

#[derive(Debug, Clone, PartialEq)]
pub enum GridSource {
    Url(String),
    Local(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub grid: GridSource,
    pub stac_url: String,
    pub collection: String,
    pub page_size: u32,
    pub max_cloud_cover: f64,
    pub tile_template: String,
    pub basemap_template: String,
    pub tile_size: u32,
    pub preferences_path: PathBuf,
    pub request_timeout: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            grid: GridSource::Url(DEFAULT_GRID_URL.to_string()),
            stac_url: DEFAULT_STAC_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            page_size: 20,
            max_cloud_cover: crate::models::catalog::DEFAULT_MAX_CLOUD_COVER,
            tile_template: DEFAULT_TILE_TEMPLATE.to_string(),
            basemap_template: DEFAULT_BASEMAP_TEMPLATE.to_string(),
            tile_size: 256,
            preferences_path: PathBuf::from("stacyolo-prefs.json"),
            request_timeout: Duration::from_secs(30),
            port: 8000,
        }
    }
}

/// Pick Sentinel-2 scenes on a grid and compare them side by side
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Port to serve the map on
    #[arg(short, long, env = "STACYOLO_PORT", default_value_t = 8000)]
    pub port: u16,

    /// Zipped GeoJSON grid to download at startup
    #[arg(long, env = "STACYOLO_GRID_URL", conflicts_with = "grid_file")]
    pub grid_url: Option<String>,

    /// Local copy of the zipped GeoJSON grid
    #[arg(long, env = "STACYOLO_GRID_FILE")]
    pub grid_file: Option<PathBuf>,

    /// STAC item search endpoint
    #[arg(long, env = "STACYOLO_STAC_URL", default_value = DEFAULT_STAC_URL)]
    pub stac_url: String,

    #[arg(long, env = "STACYOLO_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Results per page
    #[arg(long, env = "STACYOLO_PAGE_SIZE", default_value_t = 20)]
    pub page_size: u32,

    /// Initial cloud cover threshold in percent
    #[arg(long, env = "STACYOLO_MAX_CLOUD_COVER", default_value_t = 10.0)]
    pub max_cloud_cover: f64,

    /// Where the UI preferences are kept
    #[arg(long, env = "STACYOLO_PREFS", default_value = "stacyolo-prefs.json")]
    pub prefs: PathBuf,

    /// Timeout for catalog and grid requests, in seconds
    #[arg(long, env = "STACYOLO_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let grid = match (cli.grid_file, cli.grid_url) {
            (Some(path), _) => GridSource::Local(path),
            (None, Some(url)) => GridSource::Url(url),
            (None, None) => GridSource::Url(DEFAULT_GRID_URL.to_string()),
        };
        Config {
            grid,
            stac_url: cli.stac_url,
            collection: cli.collection,
            page_size: cli.page_size.max(1),
            max_cloud_cover: cli.max_cloud_cover,
            preferences_path: cli.prefs,
            request_timeout: Duration::from_secs(cli.timeout_secs),
            port: cli.port,
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_match_config_defaults() {
        let config = Config::from(Cli::parse_from(["stacyolo"]));
        let default = Config::default();
        assert_eq!(config.grid, default.grid);
        assert_eq!(config.stac_url, default.stac_url);
        assert_eq!(config.page_size, default.page_size);
        assert_eq!(config.max_cloud_cover, default.max_cloud_cover);
        assert_eq!(config.request_timeout, default.request_timeout);
        assert_eq!(config.port, default.port);
    }

    #[test]
    fn test_grid_file_wins() {
        let config = Config::from(Cli::parse_from([
            "stacyolo",
            "--grid-file",
            "grid.zip",
            "--page-size",
            "0",
        ]));
        assert_eq!(config.grid, GridSource::Local(PathBuf::from("grid.zip")));
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_grid_url_and_file_conflict() {
        assert!(
            Cli::try_parse_from(["stacyolo", "--grid-url", "http://x", "--grid-file", "g.zip"])
                .is_err()
        );
    }
}
