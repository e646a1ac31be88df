use super::{CELL_ID_PROPERTY, Grid, GridCell, Polygon};
use crate::config::GridSource;
use crate::error::{Error, Result};
use crate::models::geometry::Bounds;
use axum::body::Bytes;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::{Cursor, Read};
use zip::ZipArchive;

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Ring = Vec<Vec<f64>>;

/// Fetch, unzip and parse the grid
pub async fn load_grid(source: &GridSource, client: &reqwest::Client) -> Result<Grid> {
    let bytes = fetch_archive(source, client).await?;
    let (name, text) = extract_geojson(&bytes)?;
    let cells = parse_cells(&text)?;
    tracing::info!(
        entry = %name,
        cells = cells.len(),
        "loaded grid archive ({:.2} MiB)",
        bytes.len() as f64 / 1024.0 / 1024.0
    );
    Ok(Grid {
        cells,
        geojson: Bytes::from(text),
    })
}

async fn fetch_archive(source: &GridSource, client: &reqwest::Client) -> Result<Vec<u8>> {
    match source {
        GridSource::Local(path) => Ok(tokio::fs::read(path).await?),
        GridSource::Url(url) => {
            let mut response = client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(Error::Status {
                    status: response.status(),
                });
            }

            let pb = match response.content_length() {
                Some(len) => {
                    let pb = ProgressBar::new(len);
                    pb.set_style(
                        ProgressStyle::default_bar()
                            .template("{msg}\n[{bar:40.cyan/blue}] {bytes}/{total_bytes} {percent}%")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("█▇▆▅▄▃▂▁  "),
                    );
                    pb
                }
                None => ProgressBar::new_spinner(),
            };
            pb.set_message(format!("Downloading grid from {}", url));

            let mut bytes = Vec::new();
            while let Some(chunk) = response.chunk().await? {
                bytes.extend_from_slice(&chunk);
                pb.set_position(bytes.len() as u64);
            }
            pb.finish_and_clear();
            Ok(bytes)
        }
    }
}

/// Pick the first `.geojson` entry out of the archive
pub fn extract_geojson(bytes: &[u8]) -> Result<(String, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.is_empty() {
        return Err(Error::EmptyArchive);
    }

    let name = archive
        .file_names()
        .find(|n| n.to_lowercase().ends_with(".geojson"))
        .map(str::to_string)
        .ok_or(Error::NoGeoJson)?;

    let mut file = archive.by_name(&name)?;
    let mut text = String::with_capacity(file.size() as usize);
    file.read_to_string(&mut text)?;
    tracing::debug!("extracted '{}' ({} bytes)", name, text.len());
    Ok((name, text))
}

/// Polygon and MultiPolygon features become cells; anything else is skipped
pub fn parse_cells(text: &str) -> Result<Vec<GridCell>> {
    let collection: FeatureCollection = serde_json::from_str(text)?;
    let mut cells = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for feature in collection.features {
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };
        let polygons = match geometry.kind.as_str() {
            "Polygon" => {
                let rings: Vec<Ring> = serde_json::from_value(geometry.coordinates)?;
                vec![polygon_from_rings(rings)]
            }
            "MultiPolygon" => {
                let parts: Vec<Vec<Ring>> = serde_json::from_value(geometry.coordinates)?;
                parts.into_iter().map(polygon_from_rings).collect()
            }
            _ => {
                skipped += 1;
                continue;
            }
        };

        let all_points = polygons
            .iter()
            .flat_map(|p| p.exterior.iter().chain(p.holes.iter().flatten()))
            .copied();
        let Some(bounds) = Bounds::from_points(all_points) else {
            skipped += 1;
            continue;
        };

        let id = feature
            .properties
            .as_ref()
            .and_then(|p| p.get(CELL_ID_PROPERTY))
            .and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            });

        cells.push(GridCell {
            id,
            polygons,
            bounds,
        });
    }

    if skipped > 0 {
        tracing::debug!("skipped {} grid features without polygon geometry", skipped);
    }
    Ok(cells)
}

fn polygon_from_rings(rings: Vec<Ring>) -> Polygon {
    let mut rings = rings.into_iter().map(|ring| {
        ring.into_iter()
            .filter(|pos| pos.len() >= 2)
            .map(|pos| (pos[0], pos[1]))
            .collect::<Vec<_>>()
    });
    let exterior = rings.next().unwrap_or_default();
    Polygon {
        exterior,
        holes: rings.collect(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    pub(crate) const GRID_GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"Name": "37PDN"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[38.0, 11.0], [39.0, 11.0], [39.0, 12.0], [38.0, 12.0], [38.0, 11.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"Name": "01CDH"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[179.0, -70.0, 0.0], [180.0, -70.0, 0.0], [180.0, -69.0, 0.0], [179.0, -70.0, 0.0]]],
                        [[[-180.0, -70.0], [-179.5, -70.0], [-180.0, -69.0], [-180.0, -70.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"Name": "ignored"},
                "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                }
            }
        ]
    }"#;

    pub(crate) fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_picks_geojson_entry() {
        let bytes = zip_with(&[("README.txt", "hello"), ("s2-grid.geojson", GRID_GEOJSON)]);
        let (name, text) = extract_geojson(&bytes).unwrap();
        assert_eq!(name, "s2-grid.geojson");
        assert_eq!(text, GRID_GEOJSON);
    }

    #[test]
    fn test_empty_archive() {
        let bytes = zip_with(&[]);
        assert!(matches!(extract_geojson(&bytes), Err(Error::EmptyArchive)));
    }

    #[test]
    fn test_archive_without_geojson() {
        let bytes = zip_with(&[("grid.json", "{}")]);
        let err = extract_geojson(&bytes).unwrap_err();
        assert!(matches!(err, Error::NoGeoJson));
        assert_eq!(err.to_string(), "No GeoJSON file found in the zip archive");
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            extract_geojson(b"definitely not a zip"),
            Err(Error::Zip(_))
        ));
    }

    #[test]
    fn test_parse_cells() {
        let cells = parse_cells(GRID_GEOJSON).unwrap();
        assert_eq!(cells.len(), 3);

        assert_eq!(cells[0].id.as_deref(), Some("37PDN"));
        assert_eq!(cells[0].bounds, Bounds::from((38.0, 11.0, 39.0, 12.0)));

        // multipolygon bounds fold over every part
        assert_eq!(cells[1].polygons.len(), 2);
        assert_eq!(cells[1].bounds, Bounds::from((-180.0, -70.0, 180.0, -69.0)));

        assert!(cells[2].id.is_none());
    }

    #[test]
    fn test_malformed_geojson() {
        assert!(matches!(parse_cells("{not json"), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_load_grid_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s2-grid.geojson.zip");
        std::fs::write(&path, zip_with(&[("s2-grid.geojson", GRID_GEOJSON)])).unwrap();

        let grid = load_grid(&GridSource::Local(path), &reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(grid.cells.len(), 3);
        assert_eq!(&grid.geojson[..], GRID_GEOJSON.as_bytes());
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_load_grid_over_http() {
        let archive = zip_with(&[("s2-grid.geojson", GRID_GEOJSON)]);
        let router = axum::Router::new().route(
            "/s2-grid.geojson.zip",
            axum::routing::get(move || {
                let archive = archive.clone();
                async move { archive }
            }),
        );
        let base = serve(router).await;

        let source = GridSource::Url(format!("{}/s2-grid.geojson.zip", base));
        let grid = load_grid(&source, &reqwest::Client::new()).await.unwrap();
        assert_eq!(grid.cells.len(), 3);
        assert_eq!(grid.cells[0].id.as_deref(), Some("37PDN"));
    }

    #[tokio::test]
    async fn test_load_grid_http_status() {
        let base = serve(axum::Router::new()).await;

        let source = GridSource::Url(format!("{}/missing.zip", base));
        let err = load_grid(&source, &reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Status { status } if status == reqwest::StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_load_grid_body_is_not_a_zip() {
        let router = axum::Router::new().route(
            "/s2-grid.geojson.zip",
            axum::routing::get(|| async { "<html>maintenance</html>" }),
        );
        let base = serve(router).await;

        let source = GridSource::Url(format!("{}/s2-grid.geojson.zip", base));
        let err = load_grid(&source, &reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, Error::Zip(_)));
    }

    #[tokio::test]
    async fn test_load_grid_connection_refused() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = GridSource::Url(format!("http://{}/s2-grid.geojson.zip", addr));
        let err = load_grid(&source, &reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_load_grid_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = GridSource::Local(dir.path().join("nope.zip"));
        let err = load_grid(&source, &reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
