//! Data models for the UTM generator
//!
//! This module defines the field set the builder consumes, the persisted
//! records, and the request/response shapes of the HTTP API.

use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::filter::FilterOptions;

/// Length of generated record ids
const ID_LEN: usize = 12;

pub(crate) fn generate_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

/// Drops blank values
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Optional auxiliary parameters typed by the user
///
/// Each non-empty member is emitted under its own field name.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuxFields {
    pub term: Option<String>,
    pub placement: Option<String>,
    pub audience_segment: Option<String>,
    pub geo: Option<String>,
    pub device: Option<String>,
    pub match_type: Option<String>,
}

impl AuxFields {
    /// `(parameter key, value)` pairs in declaration order
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("term", self.term.as_deref()),
            ("placement", self.placement.as_deref()),
            ("audienceSegment", self.audience_segment.as_deref()),
            ("geo", self.geo.as_deref()),
            ("device", self.device.as_deref()),
            ("matchType", self.match_type.as_deref()),
        ]
    }
}

/// The campaign-tagging fields the URL builder consumes
///
/// # Example
/// ```json
/// {
///   "url": "example.com/page",
///   "source": "google",
///   "medium": "cpc",
///   "campaign": "spring_sale",
///   "content": "search-top",
///   "term": "test automation"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFields {
    /// Base website URL, scheme optional
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub medium: String,

    /// May be empty for dynamic-campaign sources
    #[serde(default)]
    pub campaign: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(flatten)]
    pub aux: AuxFields,
}

impl TagFields {
    pub fn content(&self) -> Option<&str> {
        non_blank(self.content.as_deref())
    }

    /// Rebuilds the field set a stored record was generated from
    pub fn from_record(record: &UtmRecord) -> Self {
        Self {
            url: record.website_url.clone(),
            source: record.source.clone(),
            medium: record.medium.clone(),
            campaign: record.campaign.clone(),
            content: record.content.clone(),
            aux: AuxFields::default(),
        }
    }
}

/// A saved UTM combination
///
/// Records are append-only: nothing updates or deletes them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UtmRecord {
    pub id: String,

    /// The base URL as entered (trimmed)
    pub website_url: String,

    pub source: String,

    pub medium: String,

    pub campaign: String,

    #[serde(default)]
    pub content: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// The fields of a record before the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUtmRecord {
    pub website_url: String,
    pub source: String,
    pub medium: String,
    pub campaign: String,
    pub content: Option<String>,
}

impl NewUtmRecord {
    pub fn from_fields(fields: &TagFields) -> Self {
        Self {
            website_url: fields.url.trim().to_string(),
            source: fields.source.clone(),
            medium: fields.medium.clone(),
            campaign: fields.campaign.clone(),
            content: fields.content().map(str::to_string),
        }
    }

    pub fn into_record(self) -> UtmRecord {
        UtmRecord {
            id: generate_id(),
            website_url: self.website_url,
            source: self.source,
            medium: self.medium,
            campaign: self.campaign,
            content: self.content,
            created_at: Utc::now(),
        }
    }
}

/// A suggestion left through the feedback form
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub suggestion: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for the feedback form
#[derive(Deserialize, Debug)]
pub struct FeedbackRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub suggestion: String,
}

/// Outcome of a generate-and-save request
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SaveStatus {
    Saved,
    Duplicate,
    NotSaved,
}

/// Response returned by `POST /api/utms`
///
/// The generated URL is present even when saving failed.
#[derive(Serialize, Debug)]
pub struct GenerateResponse {
    pub url: String,
    pub status: SaveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<UtmRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A stored record together with the URL regenerated from it
#[derive(Serialize, Debug)]
pub struct UtmListing {
    #[serde(flatten)]
    pub record: UtmRecord,
    /// `None` when the stored fields no longer build a URL
    pub url: Option<String>,
}

/// Query parameters for the all-records view
///
/// # Example
/// Query string: `?website_url=example.com&source=google&page=2&limit=20`
#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    /// Case-insensitive substring of the website URL
    pub website_url: Option<String>,
    pub source: Option<String>,
    pub medium: Option<String>,
    pub campaign: Option<String>,
    /// Substring of the content value
    pub content: Option<String>,

    /// Page number for pagination (starts from 1)
    pub page: Option<usize>,

    /// Items per page, defaults to 10, maximum 100
    pub limit: Option<usize>,
}

/// Paginated response of the all-records view
#[derive(Serialize, Debug)]
pub struct ListResponse {
    pub page: usize,
    pub limit: usize,
    /// Records matching the filters, across all pages
    pub total: usize,
    pub total_fetched: usize,
    pub data: Vec<UtmListing>,
    pub filters: FilterOptions,
}

/// Query parameters for records saved against one website URL
#[derive(Deserialize, Debug)]
pub struct WebsiteParams {
    pub website_url: String,
    pub source: Option<String>,
    pub campaign: Option<String>,
}

/// Query parameters for dropdown narrowing
#[derive(Deserialize, Debug, Default)]
pub struct OptionsParams {
    pub source: Option<String>,
    pub medium: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct OptionsResponse {
    pub mediums: Vec<String>,
    pub contents: Vec<String>,
}
