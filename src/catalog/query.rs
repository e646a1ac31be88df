use crate::models::catalog::{SearchFilters, StacLink, find_link};
use reqwest::Url;

pub const FILTER_LANG: &str = "cql2-text";

/// One page request against the STAC search endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub cell_id: String,
    pub filters: SearchFilters,
    pub token: Option<String>,
}

impl SearchQuery {
    pub fn new(cell_id: impl Into<String>, filters: SearchFilters) -> Self {
        SearchQuery {
            cell_id: cell_id.into(),
            filters,
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Cloud threshold and tile match, ANDed
    pub fn cql_filter(&self) -> String {
        format!(
            "eo:cloud_cover<{} AND s2:mgrs_tile='{}'",
            self.filters.max_cloud_cover,
            self.cell_id.replace('\'', "''")
        )
    }

    /// Interval for the `datetime` parameter, open ended on a missing side
    pub fn datetime(&self) -> Option<String> {
        let fmt = |d: chrono::NaiveDate| d.format("%Y-%m-%d").to_string();
        match (self.filters.start_date, self.filters.end_date) {
            (Some(start), Some(end)) => Some(format!("{}/{}", fmt(start), fmt(end))),
            (Some(start), None) => Some(format!("{}/..", fmt(start))),
            (None, Some(end)) => Some(format!("../{}", fmt(end))),
            (None, None) => None,
        }
    }

    /// Query parameters in request order; values are not yet URL encoded
    pub fn params(&self, collection: &str, limit: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![("collections", collection.to_string())];
        if let Some(datetime) = self.datetime() {
            params.push(("datetime", datetime));
        }
        params.push(("filter-lang", FILTER_LANG.to_string()));
        params.push(("filter", self.cql_filter()));
        params.push(("limit", limit.to_string()));
        if let Some(token) = &self.token {
            params.push(("token", token.clone()));
        }
        params
    }
}

/// Pull the continuation token out of the `next` link. The href may be
/// relative to the search endpoint.
pub fn next_token(links: &[StacLink], base: &Url) -> Option<String> {
    let href = find_link(links, "next")?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn link(rel: &str, href: &str) -> StacLink {
        StacLink {
            rel: rel.to_string(),
            href: Some(href.to_string()),
        }
    }

    fn base() -> Url {
        Url::parse("https://planetarycomputer.microsoft.com/api/stac/v1/search").unwrap()
    }

    #[test]
    fn test_filter_without_dates() {
        let q = SearchQuery::new("37PDN", SearchFilters::default());
        assert_eq!(q.cql_filter(), "eo:cloud_cover<10 AND s2:mgrs_tile='37PDN'");

        let params = q.params("sentinel-2-l2a", 20);
        assert!(params.iter().all(|(k, _)| *k != "datetime"));
        assert!(params.iter().all(|(k, _)| *k != "token"));
        assert_eq!(
            params,
            vec![
                ("collections", "sentinel-2-l2a".to_string()),
                ("filter-lang", "cql2-text".to_string()),
                ("filter", "eo:cloud_cover<10 AND s2:mgrs_tile='37PDN'".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_fractional_cloud_cover() {
        let filters = SearchFilters {
            max_cloud_cover: 12.5,
            ..SearchFilters::default()
        };
        let q = SearchQuery::new("31UDQ", filters);
        assert_eq!(q.cql_filter(), "eo:cloud_cover<12.5 AND s2:mgrs_tile='31UDQ'");
    }

    #[test]
    fn test_quote_in_cell_id_is_escaped() {
        let q = SearchQuery::new("a'b", SearchFilters::default());
        assert!(q.cql_filter().ends_with("s2:mgrs_tile='a''b'"));
    }

    #[test]
    fn test_datetime_ranges() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1);
        let end = NaiveDate::from_ymd_opt(2024, 3, 31);
        let mk = |start, end| {
            SearchQuery::new(
                "37PDN",
                SearchFilters {
                    start_date: start,
                    end_date: end,
                    max_cloud_cover: 10.0,
                },
            )
        };

        assert_eq!(mk(start, end).datetime().as_deref(), Some("2024-01-01/2024-03-31"));
        assert_eq!(mk(start, None).datetime().as_deref(), Some("2024-01-01/.."));
        assert_eq!(mk(None, end).datetime().as_deref(), Some("../2024-03-31"));
        assert_eq!(mk(None, None).datetime(), None);

        let params = mk(start, None).params("sentinel-2-l2a", 20);
        assert_eq!(params[1], ("datetime", "2024-01-01/..".to_string()));
    }

    #[test]
    fn test_token_goes_last() {
        let q = SearchQuery::new("37PDN", SearchFilters::default())
            .with_token(Some("next:abc".to_string()));
        let params = q.params("sentinel-2-l2a", 20);
        assert_eq!(params.last(), Some(&("token", "next:abc".to_string())));
    }

    #[test]
    fn test_next_token_absolute_link() {
        let links = vec![
            link("self", "https://planetarycomputer.microsoft.com/api/stac/v1/search"),
            link(
                "next",
                "https://planetarycomputer.microsoft.com/api/stac/v1/search?collections=sentinel-2-l2a&token=next%3AS2A_MSIL2A_20240101&limit=20",
            ),
        ];
        assert_eq!(
            next_token(&links, &base()).as_deref(),
            Some("next:S2A_MSIL2A_20240101")
        );
    }

    #[test]
    fn test_next_token_relative_link() {
        let links = vec![link("next", "search?token=abc123")];
        assert_eq!(next_token(&links, &base()).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_no_next_link_means_no_token() {
        let links = vec![link("self", "https://example.com/search")];
        assert_eq!(next_token(&links, &base()), None);
        assert_eq!(next_token(&[], &base()), None);
    }

    #[test]
    fn test_next_link_without_token() {
        let links = vec![link("next", "https://example.com/search?page=2")];
        assert_eq!(next_token(&links, &base()), None);
    }
}
