//! Article records as returned by the content API, and the fetcher that
//! retrieves one page of them for a date window.

use serde::Deserialize;
use serde_json::Value;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::config::Config;
use crate::TARGET_WEB_REQUEST;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Article identifier: some API versions return a string, older ones a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Ident {
    Text(String),
    Number(serde_json::Number),
}

impl Ident {
    pub fn as_string(&self) -> String {
        match self {
            Ident::Text(text) => text.clone(),
            Ident::Number(number) => number.to_string(),
        }
    }
}

/// Category field: either a nested object carrying a slug or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Object {
        #[serde(default)]
        slug: Option<String>,
    },
    Slug(String),
    Other(Value),
}

/// Entry of the `subcategories` list: structured object or plain string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubcategoryRef {
    Object {
        #[serde(default)]
        slug: Option<String>,
    },
    Text(String),
    Other(Value),
}

/// One article record. Every field is optional; the mapper in
/// [`crate::sitemap`] applies per-field fallback chains.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: Option<Ident>,
    pub slug: Option<String>,
    pub url_slug: Option<String>,
    pub title: Option<String>,
    pub category_slug: Option<String>,
    pub category: Option<CategoryRef>,
    pub subcategory_slug: Option<String>,
    pub subcategories: Vec<SubcategoryRef>,
    pub published_at: Option<String>,
    pub last_published_at: Option<String>,
    pub updated_at: Option<String>,
    pub created_at: Option<String>,
    pub image_url: Option<String>,
    pub featured_image: Option<String>,
    pub thumbnail: Option<String>,
    pub image_caption: Option<String>,
}

/// Response envelope shapes the API is known to produce.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponse {
    Envelope { results: Vec<Article> },
    Data { data: Vec<Article> },
    List(Vec<Article>),
}

/// Normalize a raw response body into a list of articles. Anything that is
/// not one of the known envelope shapes yields an empty list.
pub fn normalize_response(body: &str) -> Vec<Article> {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(ApiResponse::Envelope { results }) => results,
        Ok(ApiResponse::Data { data }) => data,
        Ok(ApiResponse::List(articles)) => articles,
        Err(err) => {
            warn!(target: TARGET_WEB_REQUEST, "Unexpected API response structure: {}", err);
            Vec::new()
        }
    }
}

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

/// Fetch one page of articles published inside `[from_date, to_date]`.
///
/// Network failures, timeouts, and non-success statuses are logged and
/// degrade to an empty list; the sitemap is still generated.
pub async fn fetch_articles(
    client: &reqwest::Client,
    config: &Config,
    from_date: &str,
    to_date: &str,
    page: u32,
) -> Vec<Article> {
    if !is_valid_url(&config.api_base_url) {
        warn!(target: TARGET_WEB_REQUEST, "Invalid API base URL: {}", config.api_base_url);
        return Vec::new();
    }

    debug!(target: TARGET_WEB_REQUEST, "Requesting articles from {} ({} to {}, page {})",
           config.api_base_url, from_date, to_date, page);

    let request = client
        .get(&config.api_base_url)
        .query(&[("from_date", from_date), ("to_date", to_date)])
        .query(&[
            ("page", page.to_string()),
            ("page_size", config.page_size.to_string()),
        ])
        .send();

    match timeout(REQUEST_TIMEOUT, request).await {
        Ok(Ok(response)) if response.status().is_success() => match response.text().await {
            Ok(body) => normalize_response(&body),
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "Failed to read API response body: {}", err);
                Vec::new()
            }
        },
        Ok(Ok(response)) => {
            warn!(target: TARGET_WEB_REQUEST, "Error fetching articles from API: status {}",
                  response.status());
            Vec::new()
        }
        Ok(Err(err)) => {
            warn!(target: TARGET_WEB_REQUEST, "Error fetching articles from API: {}", err);
            Vec::new()
        }
        Err(_) => {
            warn!(target: TARGET_WEB_REQUEST, "API request timed out after {} seconds",
                  REQUEST_TIMEOUT.as_secs());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_results_envelope() {
        let body = r#"{"results": [{"slug": "a"}, {"slug": "b"}]}"#;
        let articles = normalize_response(body);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].slug.as_deref(), Some("a"));
    }

    #[test]
    fn test_normalize_data_envelope() {
        let body = r#"{"data": [{"slug": "a"}]}"#;
        let articles = normalize_response(body);
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn test_normalize_bare_list() {
        let body = r#"[{"slug": "a"}, {"slug": "b"}, {"slug": "c"}]"#;
        let articles = normalize_response(body);
        assert_eq!(articles.len(), 3);
    }

    #[test]
    fn test_normalize_unknown_shape_is_empty() {
        assert!(normalize_response(r#"{"items": []}"#).is_empty());
        assert!(normalize_response(r#""nope""#).is_empty());
        assert!(normalize_response("not json at all").is_empty());
    }

    #[test]
    fn test_article_with_object_category() {
        let body = r#"{"results": [{"category": {"slug": "economy", "name": "Economy"}}]}"#;
        let articles = normalize_response(body);
        match &articles[0].category {
            Some(CategoryRef::Object { slug }) => assert_eq!(slug.as_deref(), Some("economy")),
            other => panic!("expected object category, got {:?}", other),
        }
    }

    #[test]
    fn test_article_with_string_category_and_numeric_id() {
        let body = r#"{"results": [{"category": "economy", "id": 42}]}"#;
        let articles = normalize_response(body);
        match &articles[0].category {
            Some(CategoryRef::Slug(slug)) => assert_eq!(slug, "economy"),
            other => panic!("expected string category, got {:?}", other),
        }
        assert_eq!(articles[0].id.as_ref().map(|i| i.as_string()), Some("42".to_string()));
    }

    #[test]
    fn test_article_with_mixed_subcategories() {
        let body = r#"{"results": [{"subcategories": [{"slug": "general"}, "politics"]}]}"#;
        let articles = normalize_response(body);
        assert_eq!(articles[0].subcategories.len(), 2);
        match &articles[0].subcategories[0] {
            SubcategoryRef::Object { slug } => assert_eq!(slug.as_deref(), Some("general")),
            other => panic!("expected object subcategory, got {:?}", other),
        }
        match &articles[0].subcategories[1] {
            SubcategoryRef::Text(text) => assert_eq!(text, "politics"),
            other => panic!("expected string subcategory, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_article_fields_ignored() {
        let body = r#"{"results": [{"slug": "a", "view_count": 9000, "author": {"name": "x"}}]}"#;
        let articles = normalize_response(body);
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://api.example.com/api/v2/home"));
        assert!(is_valid_url("http://localhost:8000"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("not a url"));
    }
}
