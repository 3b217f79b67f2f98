//! HTTP request handlers for the UTM generator API
//!
//! This module wires the core (validator, builder, dedup gate, filters) to
//! the HTTP surface:
//! - Generating a tagged URL and saving the combination
//! - Previewing a URL without saving it
//! - Listing saved records, per website URL or across all records
//! - Serving the taxonomy for form dropdowns
//! - Accepting feedback suggestions

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::builder::build_utm_url;
use crate::database::AppState;
use crate::dedup::save_unique;
use crate::error::UtmError;
use crate::filter::{filter_records, FilterOptions, RecordFilter};
use crate::gateway::{FeedbackGateway, RecordGateway};
use crate::model::{
    generate_id, non_blank, FeedbackRecord, FeedbackRequest, GenerateResponse, ListParams,
    ListResponse, NewUtmRecord, OptionsParams, OptionsResponse, SaveStatus, TagFields,
    UtmListing, UtmRecord, WebsiteParams,
};
use crate::taxonomy::TagTaxonomy;
use crate::validator::validate;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

fn not_buildable() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Fields do not produce a URL",
            "code": "not_buildable"
        })),
    )
        .into_response()
}

/// Pairs a stored record with the URL its fields regenerate
fn to_listing(record: UtmRecord, taxonomy: &TagTaxonomy) -> UtmListing {
    let url = build_utm_url(&TagFields::from_record(&record), taxonomy)
        .ok()
        .filter(|url| !url.is_empty());
    UtmListing { record, url }
}

/// Generates a tagged URL and saves the combination
///
/// # Request Body
///
/// ```json
/// {
///   "url": "example.com/page",
///   "source": "google",
///   "medium": "cpc",
///   "campaign": "spring_sale",
///   "content": "search-top"
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - URL generated and record saved
/// - **200 OK** - URL generated, identical record already exists (`"status": "duplicate"`)
/// - **400 Bad Request** - Missing field or unparseable website URL
/// - **500 Internal Server Error** - URL generated but the store failed;
///   the body still carries the URL
pub async fn create_utm(
    State(state): State<AppState>,
    Json(fields): Json<TagFields>,
) -> Result<Response, UtmError> {
    validate(&fields, &state.taxonomy)?;

    let url = build_utm_url(&fields, &state.taxonomy)?;
    if url.is_empty() {
        return Ok(not_buildable());
    }

    let draft = NewUtmRecord::from_fields(&fields);
    let (status, body) = save_generated(&state.store, url, draft)?;
    Ok((status, Json(body)).into_response())
}

/// Runs the dedup gate for an already built URL and shapes the outcome
///
/// A store failure yields `NotSaved` with the URL still set.
pub fn save_generated<G>(
    gateway: &G,
    url: String,
    draft: NewUtmRecord,
) -> Result<(StatusCode, GenerateResponse), UtmError>
where
    G: RecordGateway + ?Sized,
{
    let outcome = match save_unique(gateway, draft) {
        Ok(record) => (
            StatusCode::CREATED,
            GenerateResponse {
                url,
                status: SaveStatus::Saved,
                record: Some(record),
                error: None,
            },
        ),
        Err(UtmError::DuplicateRecord) => (
            StatusCode::OK,
            GenerateResponse {
                url,
                status: SaveStatus::Duplicate,
                record: None,
                error: None,
            },
        ),
        Err(UtmError::Gateway(err)) => {
            tracing::error!(error = %err, "Failed to save UTM record");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                GenerateResponse {
                    url,
                    status: SaveStatus::NotSaved,
                    record: None,
                    error: Some(err.to_string()),
                },
            )
        }
        Err(err) => return Err(err),
    };

    Ok(outcome)
}

/// Builds a tagged URL without saving anything
pub async fn preview_utm(
    State(state): State<AppState>,
    Json(fields): Json<TagFields>,
) -> Result<Response, UtmError> {
    validate(&fields, &state.taxonomy)?;

    let url = build_utm_url(&fields, &state.taxonomy)?;
    if url.is_empty() {
        return Ok(not_buildable());
    }
    Ok(Json(json!({ "url": url })).into_response())
}

/// Lists all saved records with in-memory filters and pagination
///
/// # Query Parameters
///
/// - `website_url` (optional) - Case-insensitive substring of the website URL
/// - `source`, `medium`, `campaign` (optional) - Exact match, `all` means any
/// - `content` (optional) - Substring of the content value
/// - `page` (optional) - Page number, starts from 1 (default: 1)
/// - `limit` (optional) - Items per page, max 100 (default: 10)
///
/// Filter dropdown options are computed over all records, not the page.
pub async fn list_utms(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, UtmError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = (page - 1).saturating_mul(limit);

    let records = state.store.select_all()?;
    let filters = FilterOptions::from_records(&records);

    let filter = RecordFilter {
        website_url: params.website_url,
        source: params.source,
        medium: params.medium,
        campaign: params.campaign,
        content: params.content,
    };
    let matching = filter_records(&records, &filter);
    let total = matching.len();

    let data: Vec<UtmListing> = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|record| to_listing(record, &state.taxonomy))
        .collect();

    Ok(Json(ListResponse {
        page,
        limit,
        total,
        total_fetched: data.len(),
        data,
        filters,
    }))
}

/// Lists the records saved for one website URL, newest first
///
/// # Example Request
///
/// `GET /api/utms/by-website?website_url=https://example.com/page&source=google`
pub async fn list_utms_for_website(
    State(state): State<AppState>,
    Query(params): Query<WebsiteParams>,
) -> Result<Response, UtmError> {
    let website_url = params.website_url.trim();
    if website_url.is_empty() {
        let empty = json!({ "data": [], "filters": FilterOptions::default() });
        return Ok(Json(empty).into_response());
    }

    let records = state.store.select_by_website_url(website_url)?;
    let filters = FilterOptions::from_records(&records);
    let filter = RecordFilter {
        source: params.source,
        campaign: params.campaign,
        ..Default::default()
    };

    let data: Vec<UtmListing> = filter_records(&records, &filter)
        .into_iter()
        .map(|record| to_listing(record, &state.taxonomy))
        .collect();

    Ok(Json(json!({ "data": data, "filters": filters })).into_response())
}

/// Returns the loaded taxonomy
pub async fn get_taxonomy(State(state): State<AppState>) -> Json<TagTaxonomy> {
    Json(state.taxonomy.as_ref().clone())
}

/// Mediums offered for a source and content offered for a medium
pub async fn taxonomy_options(
    State(state): State<AppState>,
    Query(params): Query<OptionsParams>,
) -> Json<OptionsResponse> {
    let mediums = non_blank(params.source.as_deref())
        .map(|source| state.taxonomy.mediums_for(source).to_vec())
        .unwrap_or_default();
    let contents = non_blank(params.medium.as_deref())
        .map(|medium| state.taxonomy.contents_for(medium).to_vec())
        .unwrap_or_default();

    Json(OptionsResponse { mediums, contents })
}

/// Stores a feedback suggestion
///
/// # Response
///
/// - **201 Created** - Suggestion stored
/// - **400 Bad Request** - Empty suggestion
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Response, UtmError> {
    if payload.suggestion.trim().is_empty() {
        return Err(UtmError::MissingField("suggestion"));
    }

    let feedback = FeedbackRecord {
        id: generate_id(),
        name: non_blank(payload.name.as_deref()).map(str::to_string),
        email: non_blank(payload.email.as_deref()).map(str::to_string),
        suggestion: payload.suggestion,
        created_at: Utc::now(),
    };
    state.store.insert_feedback(&feedback)?;
    tracing::info!(id = %feedback.id, "Feedback received");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Thanks for the suggestion",
            "id": feedback.id
        })),
    )
        .into_response())
}
