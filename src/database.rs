//! Embedded record store and table definitions
//!
//! Records live in an embedded redb database. Values are JSON-serialized
//! structs; keys are built so that a forward scan is chronological.

use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::GatewayError;
use crate::gateway::{FeedbackGateway, RecordGateway};
use crate::model::{FeedbackRecord, UtmRecord};
use crate::taxonomy::TagTaxonomy;

/// Main table of UTM records
///
/// Key: `"{created_at_micros:020}:{id}"`, so iteration order is creation order
/// Value: JSON-serialized UtmRecord
pub const TABLE_UTMS: TableDefinition<&str, &str> = TableDefinition::new("utms_v1");

/// Secondary index for lookups by website URL
///
/// Key: `"{website_url}\0{created_at_micros:020}:{id}"`
/// Value: JSON-serialized UtmRecord
///
/// The range `"{url}\0".."{url}\x01"` holds every record of one URL, plus
/// those whose URL itself continues with a NUL. Lookups compare the stored
/// URL to drop the latter.
pub const TABLE_WEBSITE_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("utms_by_website_v1");

/// Feedback suggestions
///
/// Key: `"{created_at_micros:020}:{id}"`
/// Value: JSON-serialized FeedbackRecord
pub const TABLE_FEEDBACK: TableDefinition<&str, &str> = TableDefinition::new("feedback_v1");

fn chrono_key(micros: i64, id: &str) -> String {
    format!("{:020}:{}", micros, id)
}

fn collect_newest_first(
    entries: redb::Range<'_, &'static str, &'static str>,
) -> Result<Vec<UtmRecord>, GatewayError> {
    let mut records = Vec::new();
    for entry in entries.rev() {
        let (_, value) = entry?;
        records.push(serde_json::from_str::<UtmRecord>(value.value())?);
    }
    Ok(records)
}

fn website_range(website_url: &str) -> (String, String) {
    (format!("{}\u{0}", website_url), format!("{}\u{1}", website_url))
}

/// Initializes the embedded database and creates required tables
///
/// # Example
///
/// ```no_run
/// # use utm_generator::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_UTMS)?;
        write_txn.open_table(TABLE_WEBSITE_INDEX)?;
        write_txn.open_table(TABLE_FEEDBACK)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// redb-backed record and feedback store
#[derive(Clone)]
pub struct UtmStore {
    db: Arc<Database>,
}

impl UtmStore {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }
}

impl RecordGateway for UtmStore {
    fn insert(&self, records: &[UtmRecord]) -> Result<(), GatewayError> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table_main = write_txn.open_table(TABLE_UTMS)?;
            let mut table_index = write_txn.open_table(TABLE_WEBSITE_INDEX)?;

            for record in records {
                let record_json = serde_json::to_string(record)?;
                let key = chrono_key(record.created_at.timestamp_micros(), &record.id);
                let index_key = format!("{}\u{0}{}", record.website_url, key);

                table_main.insert(key.as_str(), record_json.as_str())?;
                table_index.insert(index_key.as_str(), record_json.as_str())?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(count = records.len(), "Inserted UTM records");
        Ok(())
    }

    fn select_by_website_url(&self, website_url: &str) -> Result<Vec<UtmRecord>, GatewayError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_WEBSITE_INDEX)?;
        let (start, end) = website_range(website_url);
        let mut records = collect_newest_first(table.range(start.as_str()..end.as_str())?)?;
        records.retain(|record| record.website_url == website_url);
        Ok(records)
    }

    fn select_all(&self) -> Result<Vec<UtmRecord>, GatewayError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_UTMS)?;
        let records = collect_newest_first(table.iter()?)?;
        Ok(records)
    }

    fn exists_matching(
        &self,
        website_url: &str,
        source: &str,
        medium: &str,
        campaign: &str,
        content: Option<&str>,
    ) -> Result<bool, GatewayError> {
        let found = self.select_by_website_url(website_url)?.iter().any(|record| {
            record.source == source
                && record.medium == medium
                && record.campaign == campaign
                && record.content.as_deref() == content
        });
        Ok(found)
    }
}

impl FeedbackGateway for UtmStore {
    fn insert_feedback(&self, feedback: &FeedbackRecord) -> Result<(), GatewayError> {
        let feedback_json = serde_json::to_string(feedback)?;
        let key = chrono_key(feedback.created_at.timestamp_micros(), &feedback.id);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_FEEDBACK)?;
            table.insert(key.as_str(), feedback_json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: UtmStore,
    /// Loaded once at start-up, read-only afterwards
    pub taxonomy: Arc<TagTaxonomy>,
}

impl AppState {
    pub fn new(db: Database, taxonomy: TagTaxonomy) -> Self {
        Self {
            store: UtmStore::new(db),
            taxonomy: Arc::new(taxonomy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewUtmRecord;
    use redb::ReadableTableMetadata;
    use tempfile::NamedTempFile;

    fn store() -> (UtmStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let db = init_db(file.path().to_str().unwrap()).unwrap();
        (UtmStore::new(db), file)
    }

    fn record(url: &str, campaign: &str, content: Option<&str>) -> UtmRecord {
        NewUtmRecord {
            website_url: url.to_string(),
            source: "google".to_string(),
            medium: "cpc".to_string(),
            campaign: campaign.to_string(),
            content: content.map(str::to_string),
        }
        .into_record()
    }

    #[test]
    fn website_lookup_is_exact_and_newest_first() {
        let (store, _file) = store();
        let first = record("https://a.com", "one", None);
        let mut second = record("https://a.com", "two", None);
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        let other = record("https://a.com/x", "three", None);
        store.insert(&[first.clone(), other, second.clone()]).unwrap();

        let found = store.select_by_website_url("https://a.com").unwrap();
        assert_eq!(found, vec![second, first]);
    }

    #[test]
    fn select_all_is_newest_first() {
        let (store, _file) = store();
        let mut records: Vec<UtmRecord> = (0..3)
            .map(|i| record("https://a.com", &format!("c{i}"), None))
            .collect();
        for (i, r) in records.iter_mut().enumerate() {
            r.created_at += chrono::Duration::seconds(i as i64);
        }
        store.insert(&records).unwrap();

        let campaigns: Vec<String> = store
            .select_all()
            .unwrap()
            .into_iter()
            .map(|r| r.campaign)
            .collect();
        assert_eq!(campaigns, vec!["c2", "c1", "c0"]);
    }

    #[test]
    fn exists_matching_compares_content() {
        let (store, _file) = store();
        store.insert(&[record("https://a.com", "brand", None)]).unwrap();

        let exists = |url: &str, content: Option<&str>| {
            store
                .exists_matching(url, "google", "cpc", "brand", content)
                .unwrap()
        };
        assert!(exists("https://a.com", None));
        assert!(!exists("https://a.com", Some("x")));
        assert!(!exists("https://b.com", None));
    }

    #[test]
    fn website_lookup_ignores_urls_continuing_with_nul() {
        let (store, _file) = store();
        let nul = record("https://a.com/a\u{0}b", "brand", None);
        store.insert(&[nul.clone()]).unwrap();

        assert!(store.select_by_website_url("https://a.com/a").unwrap().is_empty());
        assert!(!store
            .exists_matching("https://a.com/a", "google", "cpc", "brand", None)
            .unwrap());

        let plain = record("https://a.com/a", "brand", None);
        store.insert(&[plain.clone()]).unwrap();
        assert_eq!(store.select_by_website_url("https://a.com/a").unwrap(), vec![plain]);
        assert_eq!(
            store.select_by_website_url("https://a.com/a\u{0}b").unwrap(),
            vec![nul]
        );
    }

    #[test]
    fn feedback_is_stored() {
        let (store, _file) = store();
        let feedback = FeedbackRecord {
            id: "fb1".to_string(),
            name: None,
            email: Some("a@b.c".to_string()),
            suggestion: "add tiktok".to_string(),
            created_at: chrono::Utc::now(),
        };
        store.insert_feedback(&feedback).unwrap();

        let read_txn = store.db.begin_read().unwrap();
        let table = read_txn.open_table(TABLE_FEEDBACK).unwrap();
        assert_eq!(table.len().unwrap(), 1);
    }
}
