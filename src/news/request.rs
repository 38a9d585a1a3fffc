use crate::news::Category;
use crate::util::{validate_base_url, BaseUrlError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org";
pub const DEFAULT_LANGUAGE: &str = "en";

const TOP_HEADLINES_PATH: &str = "v2/top-headlines";
const SEARCH_PATH: &str = "v2/everything";
const API_KEY_PARAM: &str = "apiKey";

/// A fully formed request, ready to hand to the HTTP client.
#[derive(Clone)]
pub struct NewsRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl NewsRequest {
    /// The request URL with the API key masked, for logs and error messages.
    pub fn redacted_url(&self) -> Url {
        let mut url = self.url.clone();
        let pairs: Vec<(String, String)> = self
            .url
            .query_pairs()
            .map(|(k, v)| {
                let v = if k == API_KEY_PARAM {
                    "[REDACTED]".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), v)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
        url
    }
}

/// The raw URL carries the API key; Debug shows the redacted form.
impl fmt::Debug for NewsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsRequest")
            .field("method", &self.method)
            .field("url", &self.redacted_url().as_str())
            .field("headers", &self.headers)
            .finish()
    }
}

/// Builds top-headlines and search requests against one API host.
///
/// The base URL is validated once in [`RequestBuilder::new`]; after that,
/// building a request cannot fail.
pub struct RequestBuilder {
    base: Url,
    api_key: SecretString,
    language: String,
}

impl RequestBuilder {
    /// # Errors
    ///
    /// Returns [`BaseUrlError`] if `base_url` is not a usable HTTPS URL
    /// (plain HTTP is allowed for loopback hosts only).
    pub fn new(
        base_url: &str,
        api_key: SecretString,
        language: impl Into<String>,
    ) -> Result<Self, BaseUrlError> {
        Ok(Self {
            base: validate_base_url(base_url)?,
            api_key,
            language: language.into(),
        })
    }

    /// Top headlines for one category.
    pub fn news(&self, category: Category) -> NewsRequest {
        self.build(TOP_HEADLINES_PATH, "category", category.wire_id())
    }

    /// Free-text search across all articles.
    ///
    /// The query is percent-encoded as a query component, so reserved
    /// characters such as `&`, `+` and `#` reach the API verbatim.
    pub fn search(&self, query: &str) -> NewsRequest {
        self.build(SEARCH_PATH, "q", query)
    }

    fn build(&self, endpoint: &str, key: &str, value: &str) -> NewsRequest {
        let mut url = self.base.clone();
        // Keep any path prefix on the base (e.g. a proxy mount point)
        let path = format!("{}/{}", self.base.path().trim_end_matches('/'), endpoint);
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, self.api_key.expose_secret())
            .append_pair("language", &self.language)
            .append_pair(key, value);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        NewsRequest {
            method: Method::GET,
            url,
            headers,
        }
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base", &self.base.as_str())
            .field("api_key", &"[REDACTED]")
            .field("language", &self.language)
            .finish()
    }
}
