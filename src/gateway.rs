//! Store interfaces the generator depends on
//!
//! The core never talks to a database directly; it goes through these
//! traits. [`crate::database::UtmStore`] implements both on redb.

use crate::error::GatewayError;
use crate::model::{FeedbackRecord, UtmRecord};

/// Append-only access to saved UTM records
pub trait RecordGateway {
    fn insert(&self, records: &[UtmRecord]) -> Result<(), GatewayError>;

    /// Records saved for exactly `website_url`, newest first
    fn select_by_website_url(&self, website_url: &str) -> Result<Vec<UtmRecord>, GatewayError>;

    /// Every record, newest first
    fn select_all(&self) -> Result<Vec<UtmRecord>, GatewayError>;

    /// Whether a record with this exact tuple exists; `None` content only
    /// matches records without content
    fn exists_matching(
        &self,
        website_url: &str,
        source: &str,
        medium: &str,
        campaign: &str,
        content: Option<&str>,
    ) -> Result<bool, GatewayError>;
}

pub trait FeedbackGateway {
    fn insert_feedback(&self, feedback: &FeedbackRecord) -> Result<(), GatewayError>;
}
