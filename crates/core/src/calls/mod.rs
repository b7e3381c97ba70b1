//! Public inbound calls feed.
//!
//! Calls are identified by a 36-character UUID in the upstream reports, but
//! the tracking API only understands the short inbound call ID. The only way
//! to map one to the other is to page through every call in the relevant
//! windows and keep the pairs in a [`CallIndex`].

mod leadspedia;
mod paginator;
mod types;

pub use leadspedia::LeadspediaCallsClient;
pub use paginator::{plan_pages, Paginator};
pub use types::*;
