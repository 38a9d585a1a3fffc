use crate::news::aggregate::AuthPolicy;
use crate::news::interpret::{interpret, Outcome};
use crate::news::request::{NewsRequest, RequestBuilder};
use crate::news::{Article, Category, NewsError};
use futures::StreamExt;
use std::sync::Arc;

/// Largest response body read from the API. A full page of headlines is a
/// few hundred KB.
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Client for the news API.
///
/// Cheap to clone: the HTTP client and request builder are shared, which is
/// what lets [`NewsClient::fetch_all_categories`] hand a copy to every
/// spawned task.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    requests: Arc<RequestBuilder>,
    pub(crate) auth_policy: AuthPolicy,
}

impl NewsClient {
    pub fn new(http: reqwest::Client, requests: RequestBuilder) -> Self {
        Self {
            http,
            requests: Arc::new(requests),
            auth_policy: AuthPolicy::default(),
        }
    }

    /// Chooses how authentication failures end an aggregate fetch.
    pub fn with_auth_policy(mut self, policy: AuthPolicy) -> Self {
        self.auth_policy = policy;
        self
    }

    /// Fetches the top headlines for a single category.
    ///
    /// # Errors
    ///
    /// - [`NewsError::Network`] - connection, TLS or body read failure
    /// - [`NewsError::Transport`] - status outside 2xx/4xx
    /// - [`NewsError::Api`] - the API reported a failure (401 → authentication)
    /// - [`NewsError::Decode`] - 2xx/4xx body that is not a valid envelope
    /// - [`NewsError::ResponseTooLarge`] - body exceeded 5MB
    pub async fn fetch_category(&self, category: Category) -> Result<Vec<Article>, NewsError> {
        self.fetch_articles(self.requests.news(category)).await
    }

    /// Searches all articles for `query`. Errors as for
    /// [`NewsClient::fetch_category`].
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, NewsError> {
        self.fetch_articles(self.requests.search(query)).await
    }

    async fn fetch_articles(&self, request: NewsRequest) -> Result<Vec<Article>, NewsError> {
        let redacted = request.redacted_url();
        tracing::debug!(url = %redacted, "Requesting articles");

        // reqwest errors embed the request URL, which carries the API key
        let response = self
            .http
            .request(request.method, request.url)
            .headers(request.headers)
            .send()
            .await
            .map_err(|e| NewsError::Network(e.without_url()))?;

        let status = response.status().as_u16();
        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        match interpret(status, &body)? {
            Outcome::Articles(articles) => {
                tracing::debug!(
                    url = %redacted,
                    status = status,
                    count = articles.len(),
                    "Articles received"
                );
                Ok(articles)
            }
            Outcome::Api { kind, message } => {
                tracing::debug!(url = %redacted, status = status, kind = ?kind, "API error");
                Err(NewsError::Api { kind, message })
            }
            Outcome::Transport { message } => {
                tracing::debug!(url = %redacted, status = status, "Unexpected HTTP status");
                Err(NewsError::Transport(message))
            }
        }
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, NewsError> {
    // Fast path: Content-Length already says it will not fit
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(NewsError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| NewsError::Network(e.without_url()))?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(NewsError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
