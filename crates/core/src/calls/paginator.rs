//! Sequential pagination of the calls feed into a [`CallIndex`].

use std::sync::Arc;

use tracing::{debug, info};

use super::{CallIndex, CallsError, CallsFeed, CallsQuery};

/// Plan the page requests needed to cover `total` records.
///
/// Returns `(start, limit)` pairs with `limit <= max_page_size`.
pub fn plan_pages(total: u32, max_page_size: u32) -> Vec<(u32, u32)> {
    if total == 0 || max_page_size == 0 {
        return Vec::new();
    }

    (0..total)
        .step_by(max_page_size as usize)
        .map(|start| (start, max_page_size.min(total - start)))
        .collect()
}

/// Fetches every call for a set of windows.
pub struct Paginator {
    feed: Arc<dyn CallsFeed>,
    max_page_size: u32,
}

impl Paginator {
    pub fn new(feed: Arc<dyn CallsFeed>, max_page_size: u32) -> Self {
        Self {
            feed,
            max_page_size,
        }
    }

    /// Fetch all calls for the given windows, in order.
    ///
    /// The first failure aborts pagination; no partial index is returned.
    pub async fn fetch_all(&self, windows: &[String]) -> Result<CallIndex, CallsError> {
        let mut index = CallIndex::new();

        for window in windows {
            self.fetch_window(window, &mut index).await?;
        }

        info!(total_calls = index.len(), "Call index complete");
        Ok(index)
    }

    async fn fetch_window(&self, window: &str, index: &mut CallIndex) -> Result<(), CallsError> {
        let probe = self
            .feed
            .fetch_page(&CallsQuery {
                from: window.to_string(),
                start: 0,
                limit: 1,
            })
            .await?;

        let pages = plan_pages(probe.total, self.max_page_size);
        debug!(
            window = window,
            total = probe.total,
            batches = pages.len(),
            "Probed calls window"
        );

        for (i, (start, limit)) in pages.iter().enumerate() {
            info!(
                "Gathering call data for {}, batch {} of {}",
                window,
                i + 1,
                pages.len()
            );

            let page = self
                .feed
                .fetch_page(&CallsQuery {
                    from: window.to_string(),
                    start: *start,
                    limit: *limit,
                })
                .await?;
            index.extend(page.data);
        }

        Ok(())
    }
}
