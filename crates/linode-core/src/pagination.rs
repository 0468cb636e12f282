//! Generic pagination over list endpoints.
//!
//! A list response type opts in by implementing [`PageShape`]. [`fetch_all`]
//! then walks the pages sequentially, in server order, and returns the
//! concatenated items. Any failed page aborts the whole listing; items from
//! earlier pages are discarded.

use crate::client::{ApiRequest, LinodeClient};
use crate::context::RequestContext;
use crate::endpoint::Endpoints;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Page size requested when the caller does not choose one.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Smallest page size the provider accepts.
pub const MIN_PAGE_SIZE: u32 = 25;

/// Largest page size the provider accepts.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Header carrying a JSON filter expression for list endpoints.
pub const FILTER_HEADER: &str = "x-filter";

/// Pagination metadata carried by every list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page number of this response (1-based)
    #[serde(default)]
    pub page: u32,
    /// Total number of pages
    #[serde(default)]
    pub pages: u32,
    /// Total number of results across all pages
    #[serde(default)]
    pub results: u32,
}

/// Capability a list response must provide to take part in pagination.
pub trait PageShape: Sized + Send {
    /// Element type of the collection.
    type Item: Send;

    /// Collection URL the pages are fetched from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the endpoint cannot be resolved.
    fn endpoint(endpoints: &Endpoints) -> Result<Url>;

    /// Decode one raw response body into a page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed bodies.
    fn decode(body: &[u8]) -> Result<Self>;

    /// Pagination metadata of this page.
    fn meta(&self) -> PageMeta;

    /// Number of items held by this page.
    fn len(&self) -> usize;

    /// Returns true if the page holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append another page's items after this page's items.
    fn append(&mut self, next: Self);

    /// Consume the page, yielding its items in order.
    fn into_items(self) -> Vec<Self::Item>;
}

/// Standard list envelope: `{"data": [...], "page": n, "pages": m, "results": r}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Pagination metadata
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// Decode a JSON page body with the standard error mapping.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the body is not a valid page.
pub fn decode_json<P: DeserializeOwned>(body: &[u8]) -> Result<P> {
    serde_json::from_slice(body).map_err(|e| Error::Decode(format!("Failed to parse page: {e}")))
}

/// Options for list calls.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Fetch only this page instead of walking all pages.
    pub page: Option<u32>,
    /// Items per page, clamped to the accepted range when sent.
    pub page_size: Option<u32>,
    /// JSON filter expression sent in the filter header.
    pub filter: Option<String>,
}

impl ListOptions {
    /// Options that walk every page with the default size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a single page only.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Set a JSON filter expression.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Effective page size: unset or zero means the default, anything else
    /// is clamped to `MIN_PAGE_SIZE..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
            .filter(|s| *s > 0)
            .map_or(DEFAULT_PAGE_SIZE, |s| s.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE))
    }

    fn request(&self, url: Url, page: u32) -> ApiRequest {
        let request = ApiRequest::get(url).with_query(vec![
            ("page", page.to_string()),
            ("page_size", self.page_size().to_string()),
        ]);
        match &self.filter {
            Some(filter) => request.with_header(FILTER_HEADER, filter.clone()),
            None => request,
        }
    }
}

/// Fetch a single page.
///
/// # Errors
///
/// Returns the coupled error of the exchange, or a decode failure.
pub async fn fetch_page<P: PageShape>(
    client: &LinodeClient,
    ctx: &RequestContext,
    opts: &ListOptions,
    page: u32,
) -> Result<P> {
    let url = P::endpoint(client.endpoints())?;
    debug!(url = %url, page, page_size = opts.page_size(), "Fetching page");
    let body = client.fetch_body(ctx, opts.request(url, page)).await?;
    P::decode(&body)
}

/// Fetch every page of a collection and return the items in server order.
///
/// Pages are requested one after another starting at page 1. Walking stops
/// at the first page that is the last one reported or that holds fewer items
/// than the page size. When `opts.page` is set, only that page is fetched.
///
/// # Errors
///
/// Returns the first page failure; no partial results are returned.
pub async fn fetch_all<P: PageShape>(
    client: &LinodeClient,
    ctx: &RequestContext,
    opts: &ListOptions,
) -> Result<Vec<P::Item>> {
    if let Some(page) = opts.page.filter(|p| *p > 0) {
        return Ok(fetch_page::<P>(client, ctx, opts, page).await?.into_items());
    }

    let page_size = opts.page_size() as usize;
    let mut accumulated: Option<P> = None;
    let mut page = 1;

    loop {
        let next = fetch_page::<P>(client, ctx, opts, page).await?;
        let meta = next.meta();
        let last = page >= meta.pages || next.len() < page_size;

        accumulated = Some(match accumulated.take() {
            Some(mut acc) => {
                acc.append(next);
                acc
            }
            None => next,
        });

        if last {
            break;
        }
        page += 1;
    }

    let items = accumulated.map(P::into_items).unwrap_or_default();
    debug!(pages = page, items = items.len(), "Finished paginated listing");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinodeClientConfig;
    use crate::endpoint::ResourceKind;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct RegionPage(Page<String>);

    impl PageShape for RegionPage {
        type Item = String;

        fn endpoint(endpoints: &Endpoints) -> Result<Url> {
            endpoints.resolve(ResourceKind::Regions)
        }

        fn decode(body: &[u8]) -> Result<Self> {
            decode_json(body).map(Self)
        }

        fn meta(&self) -> PageMeta {
            self.0.meta
        }

        fn len(&self) -> usize {
            self.0.data.len()
        }

        fn append(&mut self, next: Self) {
            self.0.data.extend(next.0.data);
        }

        fn into_items(self) -> Vec<String> {
            self.0.data
        }
    }

    fn test_client(server: &MockServer) -> LinodeClient {
        LinodeClient::new(LinodeClientConfig::new(server.uri()).unwrap()).unwrap()
    }

    const SIZE: u32 = MIN_PAGE_SIZE;

    fn names(range: std::ops::Range<u32>) -> Vec<String> {
        range.map(|i| format!("r{i}")).collect()
    }

    async fn mount_page(server: &MockServer, page: u32, pages: u32, data: &[String]) {
        Mock::given(method("GET"))
            .and(path("/v4/regions"))
            .and(query_param("page", page.to_string()))
            .and(query_param("page_size", SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": data,
                "page": page,
                "pages": pages,
                "results": 0
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn concatenates_pages_in_order() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 3, &names(0..25)).await;
        mount_page(&server, 2, 3, &names(25..50)).await;
        mount_page(&server, 3, 3, &names(50..53)).await;

        let client = test_client(&server);
        let opts = ListOptions::new().with_page_size(SIZE);
        let items = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap();

        assert_eq!(items, names(0..53));
    }

    #[tokio::test]
    async fn exact_multiple_stops_at_reported_last_page() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 2, &names(0..25)).await;
        mount_page(&server, 2, 2, &names(25..50)).await;

        let client = test_client(&server);
        let opts = ListOptions::new().with_page_size(SIZE);
        let items = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap();

        assert_eq!(items.len(), 50);
    }

    #[tokio::test]
    async fn short_page_stops_walk() {
        let server = MockServer::start().await;
        // Server claims more pages, but the short page ends the walk.
        mount_page(&server, 1, 4, &names(0..1)).await;

        let client = test_client(&server);
        let opts = ListOptions::new().with_page_size(SIZE);
        let items = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap();

        assert_eq!(items, names(0..1));
    }

    #[tokio::test]
    async fn empty_collection_is_not_an_error() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 0, &[]).await;

        let client = test_client(&server);
        let opts = ListOptions::new().with_page_size(SIZE);
        let items = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap();

        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn failed_page_discards_everything() {
        let server = MockServer::start().await;
        mount_page(&server, 1, 3, &names(0..25)).await;
        Mock::given(method("GET"))
            .and(path("/v4/regions"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "errors": [{"reason": "Internal error"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let opts = ListOptions::new().with_page_size(SIZE);
        let err = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert!(matches!(err, Error::Api(_)));
    }

    #[tokio::test]
    async fn explicit_page_and_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/regions"))
            .and(query_param("page", "3"))
            .and(header("x-filter", r#"{"label":"x"}"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": ["x"],
                "page": 3,
                "pages": 9,
                "results": 900
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let opts = ListOptions::new()
            .with_page(3)
            .with_filter(r#"{"label":"x"}"#);
        let items = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap();

        assert_eq!(items, vec!["x"]);
    }

    #[tokio::test]
    async fn oversized_page_size_is_clamped_on_the_wire() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v4/regions"))
            .and(query_param("page", "1"))
            .and(query_param("page_size", MAX_PAGE_SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": ["x"],
                "page": 1,
                "pages": 1,
                "results": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server);
        let opts = ListOptions::new().with_page_size(10_000);
        let items = fetch_all::<RegionPage>(&client, &RequestContext::new(), &opts)
            .await
            .unwrap();

        assert_eq!(items, vec!["x"]);
    }

    #[test]
    fn page_envelope_deserializes() {
        let page: Page<u32> =
            serde_json::from_str(r#"{"data":[1,2],"page":1,"pages":1,"results":2}"#).unwrap();
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(
            page.meta,
            PageMeta {
                page: 1,
                pages: 1,
                results: 2
            }
        );
    }

    #[test]
    fn default_page_size() {
        assert_eq!(ListOptions::new().page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ListOptions::new().with_page_size(0).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(ListOptions::new().with_page_size(25).page_size(), 25);
        assert_eq!(ListOptions::new().with_page_size(2).page_size(), MIN_PAGE_SIZE);
        assert_eq!(ListOptions::new().with_page_size(5000).page_size(), MAX_PAGE_SIZE);
    }
}
