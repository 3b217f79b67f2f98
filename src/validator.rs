//! Input validation for the generator form
//!
//! Checks are purely syntactic: the base URL must parse (with `https://`
//! implied when no scheme is typed) and the mandatory fields must be
//! filled. Whether a medium or content value is listed in the taxonomy is
//! not checked here.

use crate::builder::parse_base_url;
use crate::error::UtmError;
use crate::model::TagFields;
use crate::taxonomy::TagTaxonomy;

fn require(value: &str, field: &'static str) -> Result<(), UtmError> {
    if value.trim().is_empty() {
        Err(UtmError::MissingField(field))
    } else {
        Ok(())
    }
}

/// Validates `fields` before a URL is built or saved
///
/// The taxonomy is consulted only to learn whether the source is a
/// dynamic-campaign variant, in which case campaign may be empty.
pub fn validate(fields: &TagFields, taxonomy: &TagTaxonomy) -> Result<(), UtmError> {
    require(&fields.url, "url")?;
    parse_base_url(&fields.url)?;
    require(&fields.source, "source")?;
    require(&fields.medium, "medium")?;
    if !taxonomy.is_dynamic_source(&fields.source) {
        require(&fields.campaign, "campaign")?;
    }
    Ok(())
}
