use std::collections::HashSet;
use std::sync::Arc;

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::{SearchEngine, SearchError};
use crate::net::PageFetcher;
use crate::workflows::pacing::Pacer;

const ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const RESULTS_PER_PAGE: usize = 30;

/// DuckDuckGo's JavaScript-free results page.
#[derive(Debug)]
pub struct DuckDuckGo<F: ?Sized> {
    fetcher: Arc<F>,
    endpoint: Url,
    pacer: Pacer,
}

impl<F> DuckDuckGo<F>
where
    F: PageFetcher + ?Sized,
{
    pub fn new(fetcher: Arc<F>, pacer: Pacer) -> Result<Self, url::ParseError> {
        Ok(Self {
            fetcher,
            endpoint: Url::parse(ENDPOINT)?,
            pacer,
        })
    }

    fn page_url(&self, query: &str, page: usize) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            if page > 0 {
                let offset = page * RESULTS_PER_PAGE;
                pairs.append_pair("s", &offset.to_string());
                pairs.append_pair("dc", &(offset + 1).to_string());
            }
        }
        url
    }
}

impl<F> SearchEngine for DuckDuckGo<F>
where
    F: PageFetcher + ?Sized,
{
    fn name(&self) -> &str {
        "duckduckgo"
    }

    /// The first page must load; later pages are best effort and stop the
    /// walk on the first failure or empty page.
    fn search(&self, query: &str, pages: usize) -> Result<Vec<Url>, SearchError> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for page in 0..pages.max(1) {
            if page > 0 {
                self.pacer.pause();
            }
            let url = self.page_url(query, page);
            let html = match self.fetcher.fetch_page(&url) {
                Ok(html) => html,
                Err(err) if page == 0 => return Err(err.into()),
                Err(err) => {
                    warn!(page, error = %err, "stopping search pagination");
                    break;
                }
            };

            let results = parse_results(&html, &self.endpoint)?;
            debug!(page, results = results.len(), "search page parsed");
            if results.is_empty() {
                break;
            }
            for link in results {
                if seen.insert(link.to_string()) {
                    links.push(link);
                }
            }
        }

        Ok(links)
    }
}

/// Result links in page order, with DuckDuckGo redirect wrappers removed.
pub(crate) fn parse_results(html: &str, base: &Url) -> Result<Vec<Url>, SearchError> {
    let selector = Selector::parse("a.result__a")
        .map_err(|err| SearchError::Parse(format!("result selector: {err}")))?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .map(unwrap_redirect)
        .collect())
}

/// `//duckduckgo.com/l/?uddg=<encoded target>` -> the target URL.
fn unwrap_redirect(url: Url) -> Url {
    let is_redirect = url
        .host_str()
        .is_some_and(|host| host.ends_with("duckduckgo.com"))
        && url.path() == "/l/";
    if !is_redirect {
        return url;
    }

    url.query_pairs()
        .find(|(key, _)| key == "uddg")
        .and_then(|(_, target)| Url::parse(&target).ok())
        .unwrap_or(url)
}
