//! In-memory filtering of loaded records
//!
//! Filters never touch the store; they narrow a list that was already
//! fetched. A blank value or `"all"` leaves a field unconstrained.

use serde::Serialize;

use crate::model::UtmRecord;

/// Active filter values, combined conjunctively
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Case-insensitive substring
    pub website_url: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    /// Substring
    pub content: Option<String>,
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl RecordFilter {
    pub fn matches(&self, record: &UtmRecord) -> bool {
        if let Some(needle) = active(&self.website_url) {
            if !record
                .website_url
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(source) = active(&self.source) {
            if record.source != source {
                return false;
            }
        }
        if let Some(medium) = active(&self.medium) {
            if record.medium != medium {
                return false;
            }
        }
        if let Some(campaign) = active(&self.campaign) {
            if record.campaign != campaign {
                return false;
            }
        }
        if let Some(needle) = active(&self.content) {
            if !record.content.as_deref().unwrap_or("").contains(needle) {
                return false;
            }
        }
        true
    }
}

/// Returns the records satisfying every active constraint, in input order
pub fn filter_records(records: &[UtmRecord], filter: &RecordFilter) -> Vec<UtmRecord> {
    records
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

/// Distinct values present in a record list, for filter dropdowns
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub sources: Vec<String>,
    pub mediums: Vec<String>,
    pub campaigns: Vec<String>,
    pub contents: Vec<String>,
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

impl FilterOptions {
    /// Collects non-empty values in first-seen order
    pub fn from_records(records: &[UtmRecord]) -> Self {
        let mut options = Self::default();
        for record in records {
            push_unique(&mut options.sources, &record.source);
            push_unique(&mut options.mediums, &record.medium);
            push_unique(&mut options.campaigns, &record.campaign);
            push_unique(&mut options.contents, record.content.as_deref().unwrap_or(""));
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(
        id: &str,
        url: &str,
        source: &str,
        medium: &str,
        campaign: &str,
        content: Option<&str>,
    ) -> UtmRecord {
        UtmRecord {
            id: id.to_string(),
            website_url: url.to_string(),
            source: source.to_string(),
            medium: medium.to_string(),
            campaign: campaign.to_string(),
            content: content.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<UtmRecord> {
        vec![
            record(
                "1",
                "https://Example.com/pricing",
                "google",
                "cpc",
                "brand",
                Some("search-top"),
            ),
            record("2", "https://example.com/blog", "bing", "cpc", "brand", None),
            record(
                "3",
                "https://other.io",
                "google",
                "display",
                "abm",
                Some("retargeting-static"),
            ),
            record(
                "4",
                "https://example.com/pricing",
                "linkedin",
                "paid-social",
                "abm",
                Some("carousel-top"),
            ),
        ]
    }

    fn ids(records: &[UtmRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let records = sample();
        assert_eq!(filter_records(&records, &RecordFilter::default()), records);
    }

    #[test]
    fn exact_source_match() {
        let filter = RecordFilter {
            source: Some("google".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_records(&sample(), &filter)), vec!["1", "3"]);
    }

    #[test]
    fn all_means_unconstrained() {
        let filter = RecordFilter {
            source: Some("all".into()),
            campaign: Some("".into()),
            ..Default::default()
        };
        assert_eq!(filter_records(&sample(), &filter).len(), 4);
    }

    #[test]
    fn website_url_is_case_insensitive_substring() {
        let filter = RecordFilter {
            website_url: Some("EXAMPLE.com/PRICING".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_records(&sample(), &filter)), vec!["1", "4"]);
    }

    #[test]
    fn constraints_combine() {
        let filter = RecordFilter {
            website_url: Some("example".into()),
            campaign: Some("abm".into()),
            content: Some("carousel".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_records(&sample(), &filter)), vec!["4"]);
    }

    #[test]
    fn content_filter_skips_records_without_content() {
        let filter = RecordFilter {
            content: Some("top".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_records(&sample(), &filter)), vec!["1", "4"]);
    }

    #[test]
    fn options_are_distinct_and_ordered() {
        let options = FilterOptions::from_records(&sample());
        assert_eq!(options.sources, vec!["google", "bing", "linkedin"]);
        assert_eq!(options.campaigns, vec!["brand", "abm"]);
        assert_eq!(options.contents.len(), 3);
    }
}
