//! Duplicate check before saving a generated combination
//!
//! The existence check and the insert are two separate store calls with no
//! transaction around them. Two concurrent submissions of the same tuple
//! can both pass the check and both insert; that race is accepted. A
//! uniqueness guarantee, if wanted, belongs to the store.

use crate::error::UtmError;
use crate::gateway::RecordGateway;
use crate::model::{NewUtmRecord, UtmRecord};

/// Inserts `draft` unless an identical record already exists
///
/// The tuple compared is `(website_url, source, medium, campaign, content)`,
/// with an absent content only matching records that have none. Returns
/// `Err(UtmError::DuplicateRecord)` when nothing was saved.
pub fn save_unique<G>(gateway: &G, draft: NewUtmRecord) -> Result<UtmRecord, UtmError>
where
    G: RecordGateway + ?Sized,
{
    let exists = gateway.exists_matching(
        &draft.website_url,
        &draft.source,
        &draft.medium,
        &draft.campaign,
        draft.content.as_deref(),
    )?;
    if exists {
        tracing::info!(
            website_url = %draft.website_url,
            source = %draft.source,
            campaign = %draft.campaign,
            "Duplicate UTM combination, not saved"
        );
        return Err(UtmError::DuplicateRecord);
    }

    let record = draft.into_record();
    gateway.insert(std::slice::from_ref(&record))?;
    tracing::info!(id = %record.id, website_url = %record.website_url, "Saved UTM record");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryGateway {
        records: Mutex<Vec<UtmRecord>>,
    }

    impl RecordGateway for MemoryGateway {
        fn insert(&self, records: &[UtmRecord]) -> Result<(), GatewayError> {
            self.records.lock().unwrap().extend_from_slice(records);
            Ok(())
        }

        fn select_by_website_url(&self, website_url: &str) -> Result<Vec<UtmRecord>, GatewayError> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .rev()
                .filter(|r| r.website_url == website_url)
                .cloned()
                .collect())
        }

        fn select_all(&self) -> Result<Vec<UtmRecord>, GatewayError> {
            Ok(self.records.lock().unwrap().iter().rev().cloned().collect())
        }

        fn exists_matching(
            &self,
            website_url: &str,
            source: &str,
            medium: &str,
            campaign: &str,
            content: Option<&str>,
        ) -> Result<bool, GatewayError> {
            Ok(self.records.lock().unwrap().iter().any(|r| {
                r.website_url == website_url
                    && r.source == source
                    && r.medium == medium
                    && r.campaign == campaign
                    && r.content.as_deref() == content
            }))
        }
    }

    fn draft(content: Option<&str>) -> NewUtmRecord {
        NewUtmRecord {
            website_url: "https://example.com".to_string(),
            source: "google".to_string(),
            medium: "cpc".to_string(),
            campaign: "brand".to_string(),
            content: content.map(str::to_string),
        }
    }

    #[test]
    fn same_tuple_is_saved_once() {
        let gateway = MemoryGateway::default();
        save_unique(&gateway, draft(None)).unwrap();

        let second = save_unique(&gateway, draft(None));
        assert!(matches!(second, Err(UtmError::DuplicateRecord)));
        assert_eq!(gateway.select_all().unwrap().len(), 1);
    }

    #[test]
    fn different_content_is_a_new_record() {
        let gateway = MemoryGateway::default();
        save_unique(&gateway, draft(None)).unwrap();
        let saved = save_unique(&gateway, draft(Some("x"))).unwrap();

        assert_eq!(saved.content.as_deref(), Some("x"));
        assert_eq!(gateway.select_all().unwrap().len(), 2);
    }
}
