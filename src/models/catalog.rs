use crate::models::geometry::Bounds;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_MAX_CLOUD_COVER: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub datetime: Option<String>,
    pub cloud_cover: Option<f64>,
    pub preview_url: Option<String>,
    pub bbox: Option<Bounds>,
    pub self_link: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResultPage {
    pub items: Vec<CatalogItem>,
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_max_cloud_cover")]
    pub max_cloud_cover: f64,
}

fn default_max_cloud_cover() -> f64 {
    DEFAULT_MAX_CLOUD_COVER
}

impl Default for SearchFilters {
    fn default() -> Self {
        SearchFilters {
            start_date: None,
            end_date: None,
            max_cloud_cover: DEFAULT_MAX_CLOUD_COVER,
        }
    }
}

// Wire shapes of a STAC ItemCollection, only the fields the viewer reads.

#[derive(Debug, Deserialize)]
pub struct StacItemCollection {
    #[serde(default)]
    pub features: Vec<StacItem>,
    #[serde(default)]
    pub links: Vec<StacLink>,
}

#[derive(Debug, Deserialize)]
pub struct StacItem {
    pub id: String,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub properties: StacProperties,
    #[serde(default)]
    pub assets: HashMap<String, StacAsset>,
    #[serde(default)]
    pub links: Vec<StacLink>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StacProperties {
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover", default)]
    pub cloud_cover: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct StacAsset {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StacLink {
    pub rel: String,
    #[serde(default)]
    pub href: Option<String>,
}

pub fn find_link<'a>(links: &'a [StacLink], rel: &str) -> Option<&'a str> {
    links
        .iter()
        .find(|l| l.rel == rel)
        .and_then(|l| l.href.as_deref())
}

impl From<StacItem> for CatalogItem {
    fn from(item: StacItem) -> Self {
        let bbox = item.bbox.as_deref().and_then(Bounds::from_stac_bbox);
        let self_link = find_link(&item.links, "self").map(str::to_string);
        let preview_url = item.assets.get("rendered_preview").map(|a| a.href.clone());

        CatalogItem {
            id: item.id,
            datetime: item.properties.datetime,
            cloud_cover: item.properties.cloud_cover,
            preview_url,
            bbox,
            self_link,
        }
    }
}
