use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RowOrder;
use crate::tracking::TrackingOutcome;

/// Fixed header row of the report.
pub const CSV_HEADER: [&str; 7] = [
    "Lead ID",
    "Leadspedia Internal ID",
    "Campaign",
    "Leadspedia Response",
    "Landing Page URL",
    "Referral URL",
    "Request URL",
];

/// One output row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// Position of the identifier in the input list.
    #[serde(skip)]
    pub position: usize,
    /// The original external identifier.
    pub lead_id: String,
    pub internal_id: String,
    pub campaign: String,
    pub response: String,
    pub landing_page_url: String,
    pub referral_url: String,
    pub request_url: String,
}

impl TrackingRecord {
    pub fn from_outcome(position: usize, lead_id: &str, outcome: &TrackingOutcome) -> Self {
        let mut record = Self {
            position,
            lead_id: lead_id.to_string(),
            internal_id: outcome.internal_id().to_string(),
            ..Default::default()
        };

        if let TrackingOutcome::Complete { fields, .. } = outcome {
            record.campaign = fields.campaign.clone();
            record.response = fields.response.clone();
            record.landing_page_url = fields.landing_page_url.clone();
            record.referral_url = fields.referral_url.clone();
            record.request_url = fields.request_url.clone();
        }

        record
    }

    /// Cells in header order.
    pub fn to_row(&self) -> [&str; 7] {
        [
            self.lead_id.as_str(),
            self.internal_id.as_str(),
            self.campaign.as_str(),
            self.response.as_str(),
            self.landing_page_url.as_str(),
            self.referral_url.as_str(),
            self.request_url.as_str(),
        ]
    }
}

/// Per-lead data gaps observed during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of identifiers in the input list.
    pub total_inputs: usize,
    /// Grid lookup produced no true ID.
    pub empty_leads: Vec<String>,
    /// Call UUIDs missing from the call index.
    pub skipped_leads: Vec<String>,
    /// Tracking detail reported failure.
    pub partial_leads: Vec<String>,
}

/// Records and summary of a run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Rows in completion order.
    pub records: Vec<TrackingRecord>,
    pub summary: RunSummary,
}

impl RunReport {
    /// Rows in the requested order.
    pub fn ordered_records(&self, order: RowOrder) -> Vec<TrackingRecord> {
        let mut records = self.records.clone();
        if order == RowOrder::Input {
            records.sort_by_key(|r| r.position);
        }
        records
    }

    /// Identifiers accounted for so far (rows plus skips).
    pub fn processed(&self) -> usize {
        self.records.len() + self.summary.skipped_leads.len()
    }
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
