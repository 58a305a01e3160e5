use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

/// Response header Last.fm uses to echo the canonical URL it served.
///
/// Requesting a library page past the end of the listing gets served a
/// different URL, so a mismatch is the pagination stop signal.
pub const PJAX_URL_HEADER: &str = "X-PJAX-URL";

/// One fetched listing page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub requested_url: String,
    pub served_url: Option<String>,
    pub body: String,
}

/// Transport seam for listing pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Production fetcher over reqwest
pub struct LastfmClient {
    http_client: reqwest::Client,
}

impl LastfmClient {
    pub fn new() -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0")
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl PageFetcher for LastfmClient {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let resp = self.http_client.get(url).send().await?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "Listing page request failed: {} for {}",
                resp.status(),
                url
            ));
        }

        let served_url = resp
            .headers()
            .get(PJAX_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = resp.text().await?;

        Ok(FetchedPage {
            requested_url: url.to_string(),
            served_url,
            body,
        })
    }
}

/// Scrapes a user's library-artists listing page by page
pub struct LibraryScraper<F> {
    fetcher: F,
    base_url: String,
    page_cap: u32,
}

impl<F: PageFetcher> LibraryScraper<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>, page_cap: u32) -> Self {
        Self {
            fetcher,
            base_url: base_url.into(),
            page_cap,
        }
    }

    fn library_url(&self, username: &str, page: u32) -> String {
        format!(
            "{}/user/{}/library/artists?page={}",
            self.base_url,
            urlencoding::encode(username),
            page
        )
    }

    /// Collect every artist name in the user's library, in listing order.
    ///
    /// Pages are fetched until the server stops echoing the requested URL
    /// or the page cap is reached; both end the loop normally. A transport
    /// failure on any page aborts the whole collection.
    pub async fn collect_artists(&self, username: &str) -> Result<Vec<String>> {
        let mut pages = Vec::new();
        let mut page_id: u32 = 1;

        while page_id <= self.page_cap {
            let url = self.library_url(username, page_id);
            let page = self.fetcher.fetch(&url).await?;

            if page_exhausted(&page) {
                tracing::debug!(page = page_id, "Listing redirected, stopping pagination");
                break;
            }

            pages.push(page);
            page_id += 1;
        }

        let mut artists = Vec::new();
        for page in &pages {
            artists.extend(extract_artist_names(&page.body));
        }

        tracing::debug!(
            pages = pages.len(),
            artists = artists.len(),
            "Collected library artists"
        );

        Ok(artists)
    }
}

/// True when the server served something other than the requested page
pub fn page_exhausted(page: &FetchedPage) -> bool {
    page.served_url.as_deref() != Some(page.requested_url.as_str())
}

/// Extract the trimmed visible text of every artist-name cell, in
/// document order
pub fn extract_artist_names(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse("td.chartlist-name").unwrap();

    document
        .select(&cell_selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}
