//! Rate lookup through the Brave Search web API.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::debug;

use super::RateSource;
use crate::error::ScreenError;
use crate::retry::RetryPolicy;

const BRAVE_BASE_URL: &str = "https://api.search.brave.com";
const WEB_SEARCH_PATH: &str = "/res/v1/web/search";
const RESULT_COUNT: u32 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Searches the web and returns the top result snippets as one text blob.
pub struct WebSearchRates {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl WebSearchRates {
    pub fn new(api_key: String) -> Result<Self, ScreenError> {
        Self::with_base_url(api_key, BRAVE_BASE_URL.to_string())
    }

    /// Point the client at another host (tests, proxies).
    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ScreenError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn url(&self, query: &str) -> String {
        format!(
            "{}{WEB_SEARCH_PATH}?q={}&count={RESULT_COUNT}",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    async fn fetch(&self, url: &str) -> Result<SearchResponse, ScreenError> {
        let mut req = self.http.get(url).header("Accept", "application/json");
        if !self.api_key.is_empty() {
            req = req.header("X-Subscription-Token", &self.api_key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ScreenError::Api { status, body });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl RateSource for WebSearchRates {
    fn name(&self) -> &str {
        "brave"
    }

    async fn lookup(&self, query: &str) -> Result<String, ScreenError> {
        let url = self.url(query);
        debug!(%url, "searching for rates");

        let response = self.retry.run("rate search", || self.fetch(&url)).await?;
        let text = format_results(&response);
        if text.is_empty() {
            return Err(ScreenError::RateLookup(format!(
                "no search results for {query:?}"
            )));
        }
        Ok(text)
    }
}

/// One line per result: `title: description`, markup stripped.
fn format_results(response: &SearchResponse) -> String {
    let Some(web) = &response.web else {
        return String::new();
    };
    web.results
        .iter()
        .map(|r| {
            let title = strip_tags(&r.title);
            let description = strip_tags(r.description.as_deref().unwrap_or(""));
            if description.is_empty() {
                title
            } else {
                format!("{title}: {description}")
            }
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

/// Drop `<...>` markup such as the `<strong>` highlights in snippets and
/// decode HTML entities (`&amp;`, `&#39;`, `&#x27;`).
fn strip_tags(text: &str) -> String {
    let text = TAG.replace_all(text, "");
    let text = ENTITY.replace_all(&text, |caps: &Captures| {
        decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    });
    text.trim().to_string()
}

/// Unknown names are left as written.
fn decode_entity(entity: &str) -> Option<String> {
    let c = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = match entity.strip_prefix('#')? {
                hex if hex.starts_with(['x', 'X']) => u32::from_str_radix(&hex[1..], 16).ok()?,
                dec => dec.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some(c.to_string())
}

// --- API types ---

#[derive(Deserialize)]
struct SearchResponse {
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<WebResult>,
}

#[derive(Deserialize)]
struct WebResult {
    #[serde(default)]
    title: String,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(
            strip_tags("Rates at <strong>6.87%</strong> today"),
            "Rates at 6.87% today"
        );
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn strip_tags_decodes_entities() {
        assert_eq!(
            strip_tags("Tom &amp; Jerry&#39;s <b>6.5%</b> &lt;APR&gt;"),
            "Tom & Jerry's 6.5% <APR>"
        );
        assert_eq!(strip_tags("it&#x27;s&nbsp;low"), "it's low");
    }

    #[test]
    fn strip_tags_keeps_unknown_entities() {
        assert_eq!(strip_tags("a &bogus; b"), "a &bogus; b");
    }

    #[test]
    fn format_joins_title_and_description() {
        let resp = parse(
            r#"{"web": {"results": [
                {"title": "Mortgage Rates", "description": "30-year fixed at <strong>6.87%</strong>"},
                {"title": "Only a title"}
            ]}}"#,
        );
        assert_eq!(
            format_results(&resp),
            "Mortgage Rates: 30-year fixed at 6.87%\nOnly a title"
        );
    }

    #[test]
    fn format_without_web_section_is_empty() {
        let resp = parse(r#"{"query": {"original": "x"}}"#);
        assert_eq!(format_results(&resp), "");
    }

    #[test]
    fn url_encodes_query() {
        let rates =
            WebSearchRates::with_base_url(String::new(), "http://localhost:1/".to_string())
                .unwrap();
        assert_eq!(
            rates.url("current mortgage rates"),
            "http://localhost:1/res/v1/web/search?q=current%20mortgage%20rates&count=5"
        );
    }
}
