//! Runtime configuration read from the environment
//!
//! `.env` is loaded by `main` before [`AppConfig::from_env`] runs.
//!
//! - `PORT` - Server port number (default: 8080)
//! - `DATABASE_URL` - Path to database file (default: "data.db")
//! - `UTM_TAXONOMY` - `extended` (default), `basic`, or a path to a JSON taxonomy

use std::env;

use crate::error::ConfigError;
use crate::taxonomy::TagTaxonomy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE_URL: &str = "data.db";

/// Where the tag taxonomy comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomySource {
    Basic,
    Extended,
    File(String),
}

impl TaxonomySource {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "extended" => TaxonomySource::Extended,
            "basic" => TaxonomySource::Basic,
            path => TaxonomySource::File(path.to_string()),
        }
    }

    pub fn load(&self) -> Result<TagTaxonomy, ConfigError> {
        match self {
            TaxonomySource::Basic => Ok(TagTaxonomy::basic()),
            TaxonomySource::Extended => Ok(TagTaxonomy::extended()),
            TaxonomySource::File(path) => TagTaxonomy::from_json_file(path),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub taxonomy: TaxonomySource,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: raw,
            })?,
            Err(_) => DEFAULT_PORT,
        };
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let taxonomy = TaxonomySource::parse(&env::var("UTM_TAXONOMY").unwrap_or_default());

        Ok(Self {
            port,
            database_url,
            taxonomy,
        })
    }
}
