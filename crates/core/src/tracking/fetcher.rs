//! Two-step tracking lookup for a single lead.

use std::sync::Arc;

use tracing::debug;

use super::{LeadTracker, TrackingError, TrackingOutcome};

/// Runs grid lookup and tracking detail against a [`LeadTracker`].
#[derive(Clone)]
pub struct TrackingFetcher {
    tracker: Arc<dyn LeadTracker>,
}

impl TrackingFetcher {
    pub fn new(tracker: Arc<dyn LeadTracker>) -> Self {
        Self { tracker }
    }

    /// Fetch tracking data for `internal_key`.
    ///
    /// With `bypass_grid_lookup` the key is used as the true lead ID directly.
    /// Errors are systemic (transport, session, undecodable tracking detail);
    /// per-lead gaps come back as [`TrackingOutcome::Empty`] or
    /// [`TrackingOutcome::Partial`].
    pub async fn fetch(
        &self,
        internal_key: &str,
        bypass_grid_lookup: bool,
    ) -> Result<TrackingOutcome, TrackingError> {
        let true_id = if bypass_grid_lookup {
            internal_key.to_string()
        } else {
            match self.tracker.grid_lookup(internal_key).await? {
                Some(id) => id,
                None => {
                    debug!(lead_id = internal_key, "Grid lookup returned no lead");
                    return Ok(TrackingOutcome::Empty);
                }
            }
        };

        let detail = self.tracker.tracking_detail(&true_id).await?;

        if !detail.success {
            let message = detail
                .msg
                .clone()
                .unwrap_or_else(|| "tracking request failed".to_string());
            debug!(true_id = %true_id, "Tracking request failed: {}", message);
            return Ok(TrackingOutcome::Partial {
                internal_id: true_id,
                message,
            });
        }

        let fields = detail.fields()?;
        if let Some(posting) = fields.posting_response() {
            debug!(
                true_id = %true_id,
                result = %posting.result,
                errors = posting.errors.len(),
                "Decoded posting response"
            );
        }

        Ok(TrackingOutcome::Complete {
            internal_id: true_id,
            fields,
        })
    }
}
