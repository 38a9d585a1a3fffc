//! News API client: request building, response interpretation, and the
//! concurrent all-categories fetch.
//!
//! # Architecture
//!
//! - [`request`] - builds top-headlines and search URLs (API key, language)
//! - [`interpret`] - maps HTTP status + body to articles or a typed failure
//! - [`fetcher`] - [`NewsClient`], one request per call
//! - [`aggregate`] - fans out one task per [`Category`] and merges the results
//!
//! # Example
//!
//! ```ignore
//! use headlines::news::{NewsClient, RequestBuilder};
//!
//! let requests = RequestBuilder::new("https://newsapi.org", api_key, "en")?;
//! let client = NewsClient::new(reqwest::Client::new(), requests);
//! for section in client.fetch_all_categories().await? {
//!     println!("{}: {} articles", section.category, section.articles.len());
//! }
//! ```

pub mod aggregate;
mod article;
mod category;
mod error;
pub mod fetcher;
pub mod interpret;
pub mod request;

pub use aggregate::AuthPolicy;
pub use article::{Article, CategoryArticles, Source};
pub use category::{Category, UnknownCategory};
pub use error::{ApiErrorKind, NewsError};
pub use fetcher::NewsClient;
pub use request::{NewsRequest, RequestBuilder, DEFAULT_BASE_URL, DEFAULT_LANGUAGE};
