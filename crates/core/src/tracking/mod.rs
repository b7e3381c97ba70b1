//! Lead tracking lookup.
//!
//! A lead ID is first translated by the grid endpoint into the vendor's true
//! lead ID, which the tracking detail endpoint then expands into campaign and
//! attribution data. Call IDs taken from the call index already are true IDs
//! and skip the first step.

mod fetcher;
mod leadspedia;
mod types;

pub use fetcher::TrackingFetcher;
pub use leadspedia::LeadspediaTrackingClient;
pub use types::*;
