//! Unsplash photo search
//!
//! Over-fetches landscape, high-content-filter results and re-ranks them so
//! photos whose descriptions mention the query come first.

use async_trait::async_trait;
use serde::Deserialize;

use super::{
    credit_line, normalize_query, overfetch_count, rerank, ImageDescriptor, ImageSearch,
    ImageSearchError,
};
use crate::constants::images;

pub struct UnsplashClient {
    http_client: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl UnsplashClient {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), access_key)
    }

    pub fn with_client(http_client: reqwest::Client, access_key: impl Into<String>) -> Self {
        Self {
            http_client,
            access_key: access_key.into(),
            base_url: images::BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_url(&self, query: &str, per_page: usize) -> Result<reqwest::Url, ImageSearchError> {
        let endpoint = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            images::SEARCH_PATH
        );
        let per_page = per_page.to_string();
        reqwest::Url::parse_with_params(
            &endpoint,
            [
                ("query", query),
                ("per_page", per_page.as_str()),
                ("orientation", images::ORIENTATION),
                ("content_filter", images::CONTENT_FILTER),
            ],
        )
        .map_err(|e| ImageSearchError::Decode(format!("Invalid search URL {}: {}", endpoint, e)))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
    #[serde(default)]
    alt_description: Option<String>,
    #[serde(default)]
    description: Option<String>,
    user: Photographer,
    links: PhotoLinks,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    small: String,
    regular: String,
    thumb: String,
}

#[derive(Debug, Deserialize)]
struct Photographer {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PhotoLinks {
    download: String,
}

impl Photo {
    /// Case-insensitive substring match against alt text or description
    fn mentions(&self, query: &str) -> bool {
        [&self.alt_description, &self.description]
            .into_iter()
            .flatten()
            .any(|text| text.to_lowercase().contains(query))
    }

    fn into_descriptor(self, query: &str) -> ImageDescriptor {
        let alt_text = self
            .alt_description
            .filter(|alt| !alt.is_empty())
            .unwrap_or_else(|| query.to_string());
        ImageDescriptor {
            small_url: self.urls.small,
            regular_url: self.urls.regular,
            thumb_url: self.urls.thumb,
            alt_text,
            credit: credit_line(&self.user.name, images::PROVIDER_NAME),
            download_url: self.links.download,
            topic: query.to_string(),
        }
    }
}

#[async_trait]
impl ImageSearch for UnsplashClient {
    fn provider(&self) -> &'static str {
        images::PROVIDER_NAME
    }

    async fn search(
        &self,
        topic: &str,
        count: usize,
    ) -> Result<Vec<ImageDescriptor>, ImageSearchError> {
        let count = count.max(1);
        let query = normalize_query(topic);
        if query.is_empty() {
            return Err(ImageSearchError::Empty { query });
        }

        log::info!("Searching Unsplash for: '{}'", query);

        let url = self.search_url(&query, overfetch_count(count))?;
        let response = self
            .http_client
            .get(url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ImageSearchError::Status { status, body });
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ImageSearchError::Decode(e.to_string()))?;
        if body.results.is_empty() {
            return Err(ImageSearchError::Empty { query });
        }

        let ranked = rerank(body.results, count, |photo| photo.mentions(&query));
        Ok(ranked
            .into_iter()
            .map(|photo| photo.into_descriptor(&query))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn spawn_provider(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn photo(id: &str, alt: Option<&str>, description: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "urls": {
                "small": format!("https://img/{}/small", id),
                "regular": format!("https://img/{}/regular", id),
                "thumb": format!("https://img/{}/thumb", id),
            },
            "alt_description": alt,
            "description": description,
            "user": { "name": format!("Author {}", id) },
            "links": { "download": format!("https://img/{}/download", id) },
        })
    }

    async fn fake_search(
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some("Client-ID test-key");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "bad key").into_response();
        }
        assert_eq!(params.get("orientation").map(String::as_str), Some("landscape"));
        assert_eq!(params.get("content_filter").map(String::as_str), Some("high"));

        match params.get("query").map(String::as_str) {
            Some("empty") => Json(serde_json::json!({ "results": [] })).into_response(),
            Some(query) => {
                let per_page = params.get("per_page").cloned().unwrap_or_default();
                Json(serde_json::json!({
                    "total": 3,
                    "results": [
                        photo("p1", Some("a red car"), None),
                        photo("p2", None, Some(&format!("Lovely {} at dusk", query.to_uppercase()))),
                        photo("p3", Some(&format!("per_page={}", per_page)), None),
                    ]
                }))
                .into_response()
            }
            None => (StatusCode::BAD_REQUEST, "no query").into_response(),
        }
    }

    async fn client() -> UnsplashClient {
        let base = spawn_provider(Router::new().route("/search/photos", get(fake_search))).await;
        UnsplashClient::new("test-key").with_base_url(base)
    }

    #[test]
    fn test_search_url_params() {
        let client = UnsplashClient::new("k").with_base_url("http://localhost:1/");
        let url = client.search_url("red barn", 10).unwrap();
        assert_eq!(url.path(), "/search/photos");
        let query = url.query().unwrap();
        assert!(query.contains("query=red+barn"));
        assert!(query.contains("per_page=10"));
    }

    #[test]
    fn test_descriptor_alt_falls_back_to_query() {
        let photo: Photo = serde_json::from_value(photo("p9", None, None)).unwrap();
        let descriptor = photo.into_descriptor("lighthouse");
        assert_eq!(descriptor.alt_text, "lighthouse");
        assert_eq!(descriptor.credit, "Photo by Author p9 on Unsplash");
        assert_eq!(descriptor.small_url, "https://img/p9/small");
        assert_eq!(descriptor.topic, "lighthouse");
    }

    #[tokio::test]
    async fn test_search_prefers_matching_description() {
        let client = client().await;
        let images = client.search("Mountains", 1).await.unwrap();
        assert_eq!(images.len(), 1);
        // p2's description mentions the lowercased query
        assert_eq!(images[0].regular_url, "https://img/p2/regular");
        assert_eq!(images[0].topic, "mountains");
    }

    #[tokio::test]
    async fn test_search_overfetches() {
        let client = client().await;
        let images = client.search("sunset", 3).await.unwrap();
        assert_eq!(images.len(), 3);
        assert_eq!(images[2].alt_text, "per_page=10");
    }

    #[tokio::test]
    async fn test_empty_results_are_an_error() {
        let client = client().await;
        let result = client.search("empty", 1).await;
        assert!(matches!(result, Err(ImageSearchError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base = spawn_provider(Router::new().route("/search/photos", get(fake_search))).await;
        let client = UnsplashClient::new("wrong").with_base_url(base);
        let result = client.search("beach", 1).await;
        assert!(matches!(result, Err(ImageSearchError::Status { status: 401, .. })));
    }
}
