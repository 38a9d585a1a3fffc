//! Concurrent fetch of every category with a single combined result.
//!
//! One task per [`Category`] is spawned up front. Outcomes stream back over a
//! completion channel in whatever order the network finishes them, and the
//! fan-in applies two rules:
//!
//! - an authentication failure ends the whole operation (see [`AuthPolicy`])
//!   and cancels the tasks still in flight
//! - any other failure drops that category; the rest are still returned
//!
//! Successful categories are returned sorted by [`Category::sort_rank`], so the
//! output order never depends on completion order.

use crate::news::{Article, Category, CategoryArticles, NewsClient, NewsError};
use futures::FutureExt;
use serde::Deserialize;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// When an authentication failure aborts [`NewsClient::fetch_all_categories`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPolicy {
    /// Any category failing authentication aborts the batch. Deterministic:
    /// a bad key fails every run, whatever the completion order.
    #[default]
    AnyFailure,
    /// Only the first outcome to complete is checked. A 401 that happens to
    /// finish later just drops its category.
    FirstCompletion,
}

impl AuthPolicy {
    fn aborts_on(self, completed: usize) -> bool {
        match self {
            AuthPolicy::AnyFailure => true,
            AuthPolicy::FirstCompletion => completed == 1,
        }
    }
}

impl NewsClient {
    /// Fetches top headlines for every category concurrently.
    ///
    /// # Returns
    ///
    /// One [`CategoryArticles`] per category that fetched successfully, sorted
    /// by sort rank. Categories that failed for any reason other than
    /// authentication are left out.
    ///
    /// # Errors
    ///
    /// Only an authentication failure is surfaced, as decided by the client's
    /// [`AuthPolicy`]. Outstanding fetches are cancelled when that happens.
    pub async fn fetch_all_categories(&self) -> Result<Vec<CategoryArticles>, NewsError> {
        let total = Category::ALL.len();
        let cancel = CancellationToken::new();
        // Capacity covers every task, so sends never wait on the consumer
        let (tx, mut rx) = mpsc::channel::<(Category, Result<Vec<Article>, NewsError>)>(total);

        for category in Category::ALL {
            let client = self.clone();
            let tx = tx.clone();
            let cancel = cancel.clone();

            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!(category = %category, "Category fetch cancelled");
                    }
                    result = catch_task_panic(client.fetch_category(category)) => {
                        // A panic still reports, so the category is logged as failed
                        let result = result.unwrap_or_else(|msg| Err(NewsError::TaskPanicked(msg)));
                        // Receiver is gone once aggregation has already returned
                        let _ = tx.send((category, result)).await;
                    }
                }
            });
        }
        drop(tx);

        // Cancels whatever is still running on every exit path, including the
        // caller dropping this future.
        let _cancel_on_exit = cancel.drop_guard();

        let mut collected = Vec::with_capacity(total);
        let mut failed = 0usize;
        let mut completed = 0usize;

        while let Some((category, result)) = rx.recv().await {
            completed += 1;
            match result {
                Ok(articles) => {
                    tracing::debug!(
                        category = %category,
                        count = articles.len(),
                        completed = completed,
                        total = total,
                        "Category fetched"
                    );
                    collected.push(CategoryArticles { category, articles });
                }
                Err(e) if e.is_authentication() && self.auth_policy.aborts_on(completed) => {
                    tracing::warn!(
                        category = %category,
                        error = %e,
                        completed = completed,
                        "Authentication failed, abandoning remaining categories"
                    );
                    return Err(e);
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(category = %category, error = %e, "Category fetch failed, skipping");
                }
            }
        }

        collected.sort_by_key(|c| c.category.sort_rank());

        tracing::info!(
            succeeded = collected.len(),
            failed = failed,
            "Fetched all categories"
        );
        Ok(collected)
    }
}

/// Runs `future`, turning a panic into `Err(panic_message)`.
async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future).catch_unwind().await.map_err(|panic| {
        if let Some(s) = panic.downcast_ref::<&'static str>() {
            s.to_string()
        } else if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        }
    })
}
