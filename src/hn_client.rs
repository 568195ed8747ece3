use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::FetchError;
use crate::models::{PageResult, StoryHit};

/// Anything that can hand back one page of search results.
pub trait StorySource: Send + Sync {
    fn fetch_page(&self, term: &str, page: u32) -> Result<PageResult, FetchError>;
}

pub struct AlgoliaClient {
    client: Client,
    api_base: String,
    hits_per_page: u32,
}

// Every field except the id may be null or missing on the wire.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<HitRecord>,
    #[serde(default)]
    page: u32,
}

#[derive(Debug, Deserialize)]
struct HitRecord {
    #[serde(rename = "objectID")]
    object_id: Option<String>,
    title: Option<String>,
    author: Option<String>,
    url: Option<String>,
    num_comments: Option<u32>,
    points: Option<i64>,
}

impl HitRecord {
    fn into_hit(self) -> Option<StoryHit> {
        Some(StoryHit {
            id: self.object_id?,
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            num_comments: self.num_comments.unwrap_or(0),
            points: self.points.unwrap_or(0),
        })
    }
}

impl AlgoliaClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            hits_per_page: config.hits_per_page,
        })
    }

    pub fn search_url(&self, term: &str, page: u32) -> String {
        format!(
            "{}/search?query={}&page={}&hitsPerPage={}",
            self.api_base,
            urlencoding::encode(term),
            page,
            self.hits_per_page
        )
    }

    fn parse_page(body: &str) -> Result<PageResult, FetchError> {
        let response: SearchResponse = serde_json::from_str(body)?;
        let total = response.hits.len();
        let hits: Vec<StoryHit> = response
            .hits
            .into_iter()
            .filter_map(HitRecord::into_hit)
            .collect();

        if hits.len() < total {
            warn!(skipped = total - hits.len(), "dropped hits without an objectID");
        }

        Ok(PageResult {
            hits,
            page: response.page,
        })
    }
}

impl StorySource for AlgoliaClient {
    fn fetch_page(&self, term: &str, page: u32) -> Result<PageResult, FetchError> {
        let url = self.search_url(term, page);
        let response = self.client.get(&url).send()?.error_for_status()?;
        let body = response.text()?;
        let result = Self::parse_page(&body)?;

        info!(term, page = result.page, hits = result.hits.len(), "fetched search page");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_base: &str) -> AlgoliaClient {
        let config = Config {
            api_base: api_base.to_string(),
            hits_per_page: 100,
            ..Config::default()
        };
        AlgoliaClient::new(&config).unwrap()
    }

    #[test]
    fn search_url_encodes_term_and_page_size() {
        let client = client("https://hn.algolia.com/api/v1/");
        assert_eq!(
            client.search_url("rust async&sync", 2),
            "https://hn.algolia.com/api/v1/search?query=rust%20async%26sync&page=2&hitsPerPage=100"
        );
    }

    #[test]
    fn parse_page_fills_defaults_for_nulls() {
        let body = r#"{
            "hits": [
                {"objectID": "1", "title": "Redux 5", "author": "dan", "url": "https://redux.js.org",
                 "num_comments": 12, "points": 250, "created_at": "2024-01-01T00:00:00Z"},
                {"objectID": "2", "title": null, "author": "eve", "url": null,
                 "num_comments": null, "points": -1},
                {"title": "no id"}
            ],
            "page": 3,
            "nbPages": 10
        }"#;

        let page = AlgoliaClient::parse_page(body).unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.hits.len(), 2);

        assert_eq!(page.hits[0].title, "Redux 5");
        assert_eq!(page.hits[0].num_comments, 12);
        assert_eq!(page.hits[0].points, 250);

        assert_eq!(page.hits[1].id, "2");
        assert_eq!(page.hits[1].title, "");
        assert_eq!(page.hits[1].url, "");
        assert_eq!(page.hits[1].num_comments, 0);
        assert_eq!(page.hits[1].points, -1);
    }

    #[test]
    fn parse_page_rejects_garbage() {
        assert!(AlgoliaClient::parse_page("<html>oops</html>").is_err());
    }

    #[test]
    fn unreachable_host_is_a_fetch_error() {
        let client = client("http://127.0.0.1:9");
        assert!(client.fetch_page("redux", 0).is_err());
    }
}
