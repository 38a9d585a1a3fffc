//! Concurrent client for newsapi.org style APIs.
//!
//! [`news::NewsClient`] fetches one category, searches, or fetches every
//! category at once and merges the results into a single ordered answer.

pub mod config;
pub mod news;
pub mod util;
