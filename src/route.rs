//! Route definitions for the UTM generator API
//!
//! This module maps every HTTP route to its handler and injects the
//! application state.

use axum::routing::{get, post};
use axum::Router;

use crate::database::AppState;
use crate::handler::{
    create_utm, get_taxonomy, list_utms, list_utms_for_website, preview_utm, submit_feedback,
    taxonomy_options,
};

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /api/utms` - Lists all records with filters and pagination
/// - `POST /api/utms` - Generates a URL and saves the combination
/// - `POST /api/utms/preview` - Generates a URL without saving
/// - `GET /api/utms/by-website` - Lists records for one website URL
/// - `GET /api/taxonomy` - Returns the loaded taxonomy
/// - `GET /api/taxonomy/options` - Narrowed medium/content options
/// - `POST /api/feedback` - Stores a feedback suggestion
///
/// # Example Usage
///
/// ```no_run
/// # use utm_generator::database::{init_db, AppState};
/// # use utm_generator::route::create_app;
/// # use utm_generator::taxonomy::TagTaxonomy;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState::new(db, TagTaxonomy::extended());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/utms", get(list_utms).post(create_utm))
        .route("/utms/preview", post(preview_utm))
        .route("/utms/by-website", get(list_utms_for_website))
        .route("/taxonomy", get(get_taxonomy))
        .route("/taxonomy/options", get(taxonomy_options))
        .route("/feedback", post(submit_feedback));

    Router::new().nest("/api", api_routes).with_state(state)
}
