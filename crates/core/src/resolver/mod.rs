//! Classifies external identifiers and maps them to tracking API keys.

use crate::calls::CallIndex;

/// Identifiers longer than this are treated as call UUIDs.
pub const CALL_UUID_MIN_LEN: usize = 16;

/// How an external identifier should be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Fetch tracking data using `internal_key`.
    Resolved {
        internal_key: String,
        /// The key already is a true lead ID; skip the grid lookup.
        bypass_grid_lookup: bool,
    },
    /// A call UUID that is not in the call index.
    Unresolvable,
}

/// Returns true when the identifier has the shape of a call UUID.
///
/// Length is measured in bytes.
pub fn is_call_uuid(external_id: &str) -> bool {
    external_id.len() >= CALL_UUID_MIN_LEN
}

/// Resolve an external identifier against a fully populated call index.
pub fn resolve(external_id: &str, index: &CallIndex) -> Resolution {
    let external_id = external_id.trim();

    if !is_call_uuid(external_id) {
        return Resolution::Resolved {
            internal_key: external_id.to_string(),
            bypass_grid_lookup: false,
        };
    }

    match index.find(external_id) {
        Some(call) => Resolution::Resolved {
            internal_key: call.inbound_call_id.clone(),
            bypass_grid_lookup: true,
        },
        None => Resolution::Unresolvable,
    }
}
