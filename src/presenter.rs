use crate::layers::LayerSlotStore;
use crate::models::catalog::{CatalogItem, SearchResultPage};
use crate::models::geometry::Bounds;
use crate::models::slot::SlotId;
use chrono::DateTime;
use serde::Serialize;

/// One rendered search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub id: String,
    pub date: Option<String>,
    pub cloud_cover: String,
    pub preview_url: Option<String>,
    pub self_link: Option<String>,
    pub bounds: Option<Bounds>,
    pub viewing: bool,
    pub window_a: bool,
    pub window_b: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub items: Vec<ResultRow>,
    pub status: String,
    pub loading: bool,
    pub load_more_enabled: bool,
}

/// The result list, its status line and the "load more" affordance
#[derive(Debug, Default)]
pub struct ResultsPresenter {
    items: Vec<CatalogItem>,
    token: Option<String>,
    status: String,
    loading: bool,
    viewing: Option<String>,
}

impl ResultsPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A search is about to go out. A reset drops the current list, the
    /// continuation token and the "viewing" mark first.
    pub fn begin(&mut self, cell_id: &str, reset: bool) {
        if reset {
            self.items.clear();
            self.token = None;
            self.viewing = None;
            self.status = format!("Searching for Sentinel-2 images in tile {}...", cell_id);
        } else {
            self.status = "Loading more results...".to_string();
        }
        self.loading = true;
    }

    pub fn present(&mut self, page: SearchResultPage, reset: bool) {
        self.loading = false;
        self.token = page.continuation_token;

        if page.items.is_empty() {
            self.status = if reset {
                "No images found for the selected criteria.".to_string()
            } else {
                "No more images available.".to_string()
            };
            self.token = None;
            return;
        }

        let mut status = if reset {
            format!("Found {} Sentinel-2 images:", page.items.len())
        } else {
            format!("Loaded {} more images", page.items.len())
        };
        if self.token.is_some() {
            status.push_str(" (scroll for more)");
        }
        self.status = status;

        if reset {
            self.items = page.items;
        } else {
            self.items.extend(page.items);
        }
    }

    pub fn fail(&mut self, message: &str) {
        self.loading = false;
        self.token = None;
        self.status = format!("Error searching STAC API: {}", message);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn load_more_enabled(&self) -> bool {
        !self.loading && self.token.is_some()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn set_viewing(&mut self, item_id: Option<String>) {
        self.viewing = item_id;
    }

    pub fn view(&self, slots: &LayerSlotStore) -> ResultsView {
        let window_a = slots.item_for(SlotId::WindowA);
        let window_b = slots.item_for(SlotId::WindowB);

        let items = self
            .items
            .iter()
            .map(|item| ResultRow {
                id: item.id.clone(),
                date: item.datetime.as_deref().map(display_date),
                cloud_cover: item
                    .cloud_cover
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                preview_url: item.preview_url.clone(),
                self_link: item.self_link.clone(),
                bounds: item.bbox,
                viewing: self.viewing.as_deref() == Some(item.id.as_str()),
                window_a: window_a == Some(item.id.as_str()),
                window_b: window_b == Some(item.id.as_str()),
            })
            .collect();

        ResultsView {
            items,
            status: self.status.clone(),
            loading: self.loading,
            load_more_enabled: self.load_more_enabled(),
        }
    }
}

fn display_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            datetime: Some("2024-02-01T07:42:29.024000Z".to_string()),
            cloud_cover: None,
            preview_url: None,
            bbox: None,
            self_link: None,
        }
    }

    fn page(ids: &[&str], token: Option<&str>) -> SearchResultPage {
        SearchResultPage {
            items: ids.iter().map(|id| item(id)).collect(),
            continuation_token: token.map(str::to_string),
        }
    }

    #[test]
    fn test_reset_replaces_and_append_extends() {
        let mut p = ResultsPresenter::new();
        p.begin("37PDN", true);
        p.present(page(&["a", "b"], Some("t1")), true);
        assert_eq!(p.status(), "Found 2 Sentinel-2 images: (scroll for more)");
        assert_eq!(p.token(), Some("t1"));

        p.begin("37PDN", false);
        assert_eq!(p.status(), "Loading more results...");
        assert!(!p.load_more_enabled());
        p.present(page(&["c"], None), false);
        assert_eq!(p.status(), "Loaded 1 more images");
        assert_eq!(p.items().len(), 3);
        assert!(!p.load_more_enabled());

        p.begin("31UDQ", true);
        assert!(p.items().is_empty());
        assert_eq!(p.token(), None);
        assert_eq!(p.status(), "Searching for Sentinel-2 images in tile 31UDQ...");
    }

    #[test]
    fn test_missing_token_disables_load_more() {
        let mut p = ResultsPresenter::new();
        p.begin("37PDN", true);
        p.present(page(&["a"], None), true);
        assert_eq!(p.status(), "Found 1 Sentinel-2 images:");
        assert!(!p.load_more_enabled());
        assert!(p.token().is_none());

        p.begin("37PDN", true);
        p.present(page(&["a"], Some("more")), true);
        assert!(p.load_more_enabled());
    }

    #[test]
    fn test_empty_pages() {
        let mut p = ResultsPresenter::new();
        p.begin("37PDN", true);
        p.present(page(&[], Some("odd")), true);
        assert_eq!(p.status(), "No images found for the selected criteria.");
        assert!(!p.load_more_enabled());

        p.present(page(&["a"], Some("t")), true);
        p.begin("37PDN", false);
        p.present(page(&[], None), false);
        assert_eq!(p.status(), "No more images available.");
        assert_eq!(p.items().len(), 1);
    }

    #[test]
    fn test_failure_message() {
        let mut p = ResultsPresenter::new();
        p.begin("37PDN", true);
        p.fail("API request failed: 500 Internal Server Error");
        assert_eq!(
            p.status(),
            "Error searching STAC API: API request failed: 500 Internal Server Error"
        );
        assert!(!p.load_more_enabled());
    }

    #[test]
    fn test_row_marks_follow_slot_state() {
        let mut p = ResultsPresenter::new();
        p.present(page(&["a", "b", "c"], None), true);
        let mut slots = LayerSlotStore::new();
        slots.assign(SlotId::WindowA, "b");
        slots.assign(SlotId::WindowB, "b");
        p.set_viewing(Some("c".to_string()));

        let view = p.view(&slots);
        let marks: Vec<_> = view
            .items
            .iter()
            .map(|r| (r.id.as_str(), r.window_a, r.window_b, r.viewing))
            .collect();
        assert_eq!(
            marks,
            vec![
                ("a", false, false, false),
                ("b", true, true, false),
                ("c", false, false, true)
            ]
        );
        assert_eq!(view.items[0].date.as_deref(), Some("2024-02-01"));
        assert_eq!(view.items[0].cloud_cover, "N/A");
    }

    #[test]
    fn test_reset_drops_viewing_mark() {
        let slots = LayerSlotStore::new();
        let mut p = ResultsPresenter::new();
        p.present(page(&["a", "b"], Some("t1")), true);
        p.set_viewing(Some("a".to_string()));

        // appending keeps it
        p.begin("37PDN", false);
        p.present(page(&["c"], None), false);
        assert!(p.view(&slots).items[0].viewing);

        // a new search lists "a" again, but it was never framed there
        p.begin("37PDN", true);
        p.present(page(&["a", "b"], None), true);
        assert!(p.view(&slots).items.iter().all(|r| !r.viewing));
    }

    #[test]
    fn test_display_date_falls_back_to_raw() {
        assert_eq!(display_date("yesterday"), "yesterday");
        assert_eq!(display_date("2023-12-31T23:59:59+00:00"), "2023-12-31");
    }
}
