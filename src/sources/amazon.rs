//! Amazon catalog source.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{CatalogConfig, Config, ExtractionConfig, HttpConfig};
use crate::extract::{self, product::parse_product_page};
use crate::models::{Candidate, ProductPage};
use crate::sources::{CatalogSource, SourceError};
use crate::utils::{product_url, FetchOutcome, FetchRequest, HttpClient, RetryConfig};

/// Amazon catalog source, scoped to the book category
///
/// There is no public API, so results are scraped from the search page. The
/// HTTP client (and with it the cookie session) is shared with whoever else
/// holds the `Arc`.
#[derive(Debug, Clone)]
pub struct AmazonSource {
    client: Arc<HttpClient>,
    catalog: CatalogConfig,
    http: HttpConfig,
    retry: RetryConfig,
    extraction: ExtractionConfig,
}

impl AmazonSource {
    /// Create a source around an existing client
    pub fn new(client: Arc<HttpClient>, config: &Config) -> Result<Self, SourceError> {
        let retry = config
            .retry
            .to_retry_config()
            .map_err(|e| SourceError::InvalidRequest(format!("Invalid retry settings: {}", e)))?;

        Ok(Self {
            client,
            catalog: config.catalog.clone(),
            http: config.http.clone(),
            retry,
            extraction: config.extraction.clone(),
        })
    }

    /// Create a source with its own client built from `config.http`
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let client = HttpClient::from_config(&config.http)?;
        Self::new(Arc::new(client), config)
    }

    /// Book-category search request for a title
    fn search_request(&self, title: &str) -> FetchRequest {
        FetchRequest::new(self.catalog.search_url(), self.http.timeout())
            .param("k", title)
            .param("i", &self.catalog.category)
            .param("rh", &self.catalog.node)
            .param("ref", &self.catalog.ref_tag)
    }
}

#[async_trait]
impl CatalogSource for AmazonSource {
    fn name(&self) -> &str {
        "Amazon"
    }

    async fn search(&self, title: &str, max_results: usize) -> Result<Vec<Candidate>, SourceError> {
        tracing::info!("Searching catalog for '{}' (max {})", title, max_results);

        let request = self.search_request(title);
        let html = match self.client.fetch(&request, self.retry).await? {
            FetchOutcome::Document(html) => html,
            FetchOutcome::Throttled { attempts } => {
                tracing::warn!(
                    "Search for '{}' throttled on all {} attempts, no results",
                    title,
                    attempts
                );
                return Ok(Vec::new());
            }
        };

        Ok(extract::extract_candidates(
            self,
            &html,
            self.extraction.mode,
            max_results,
            self.extraction.overfetch_factor,
        )
        .await)
    }

    async fn product_page(&self, url: &str) -> ProductPage {
        let request = FetchRequest::new(url, self.http.product_timeout());

        match self
            .client
            .fetch(&request, RetryConfig::single_attempt())
            .await
        {
            Ok(FetchOutcome::Document(html)) => parse_product_page(&html),
            Ok(FetchOutcome::Throttled { .. }) => {
                tracing::warn!("Product page {} throttled", url);
                ProductPage::unresolved()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch product page {}: {}", url, e);
                ProductPage::unresolved()
            }
        }
    }

    fn product_url(&self, identifier: &str) -> String {
        product_url(&self.catalog.base_url, identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionMode;
    use mockito::Matcher;

    fn test_config(base_url: &str) -> Config {
        let mut config = Config::default();
        config.catalog.base_url = base_url.to_string();
        config.retry.base_delay_secs = 0.01;
        config
    }

    #[test]
    fn test_search_request_is_book_scoped() {
        let source = AmazonSource::from_config(&Config::default()).unwrap();
        let request = source.search_request("リーダブルコード");

        assert_eq!(request.url, "https://www.amazon.co.jp/s");
        assert_eq!(
            request.query,
            vec![
                ("k".to_string(), "リーダブルコード".to_string()),
                ("i".to_string(), "stripbooks".to_string()),
                ("rh".to_string(), "n:465392".to_string()),
                ("ref".to_string(), "sr_pg_1".to_string()),
            ]
        );
    }

    #[test]
    fn test_product_url() {
        let source = AmazonSource::from_config(&Config::default()).unwrap();
        assert_eq!(
            source.product_url("4873115655"),
            "https://www.amazon.co.jp/dp/4873115655"
        );
    }

    #[tokio::test]
    async fn test_search_parses_result_cards() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"<html><body>
            <div data-component-type="s-search-result" data-asin="4873115655">
              <h2><a href="/dp/4873115655"><span>リーダブルコード</span></a></h2>
              <img class="s-image" src="https://m.media-amazon.com/images/I/51MgH8Jmr3L._AC_UY218_.jpg">
            </div>
        </body></html>"#;
        let mock = server
            .mock("GET", "/s")
            .match_query(Matcher::UrlEncoded("k".into(), "リーダブルコード".into()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let source = AmazonSource::from_config(&test_config(&server.url())).unwrap();
        let candidates = source.search("リーダブルコード", 5).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "4873115655");
        assert_eq!(candidates[0].link, format!("{}/dp/4873115655", server.url()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_throttled_is_empty() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/s")
            .match_query(Matcher::Any)
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let source = AmazonSource::from_config(&test_config(&server.url())).unwrap();
        let candidates = source.search("anything", 5).await.unwrap();

        assert!(candidates.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_forbidden_is_fatal() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/s")
            .match_query(Matcher::Any)
            .with_status(403)
            .expect(1)
            .create_async()
            .await;

        let source = AmazonSource::from_config(&test_config(&server.url())).unwrap();
        let result = source.search("anything", 5).await;

        assert!(matches!(result, Err(SourceError::HttpStatus(403))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_product_page_failure_is_swallowed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/dp/B0MISSING0")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let source = AmazonSource::from_config(&test_config(&server.url())).unwrap();
        let page = source.product_page(&source.product_url("B0MISSING0")).await;

        assert_eq!(page, ProductPage::unresolved());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_regex_mode_search() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/s")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"<a href="/dp/B0REGEX001">x</a>"#)
            .create_async()
            .await;
        let product = server
            .mock("GET", "/dp/B0REGEX001")
            .with_status(200)
            .with_body(
                r#"<meta property="og:title" content="Regex Mode Book">
                   <meta property="og:image" content="https://m.media-amazon.com/images/I/regex.jpg">"#,
            )
            .create_async()
            .await;

        let mut config = test_config(&server.url());
        config.extraction.mode = ExtractionMode::Regex;
        let source = AmazonSource::from_config(&config).unwrap();

        let candidates = source.search("regex", 1).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Regex Mode Book");
        assert_eq!(
            candidates[0].thumbnail_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/regex.jpg")
        );
        search.assert_async().await;
        product.assert_async().await;
    }
}
