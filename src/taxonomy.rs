//! Tag taxonomy: the configuration behind the generator
//!
//! A `TagTaxonomy` lists the legal sources, the mediums offered per source,
//! the content tokens offered per medium, the campaign options, and the
//! platform rules the URL builder applies (dynamic-campaign source variants,
//! campaign suffixes and required placeholder parameters).
//!
//! A taxonomy is loaded once at start-up and shared read-only. Different
//! revisions of the generator are different taxonomy values, not different
//! builder code: [`TagTaxonomy::basic`] is the plain dropdown set and
//! [`TagTaxonomy::extended`] adds the paid-platform rules.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// An auxiliary parameter that a `(source, medium)` combination requires
///
/// Each kind is emitted under a fixed key with the ad platform's placeholder
/// token as value, resolved by the platform at click time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequiredParam {
    Term,
    MatchType,
    Device,
    Network,
    Placement,
    Geo,
    Content,
}

impl RequiredParam {
    /// Query parameter key
    pub fn key(self) -> &'static str {
        match self {
            RequiredParam::Term => "utm_term",
            RequiredParam::MatchType => "matchtype",
            RequiredParam::Device => "device",
            RequiredParam::Network => "network",
            RequiredParam::Placement => "placement",
            RequiredParam::Geo => "geo",
            RequiredParam::Content => "utm_content",
        }
    }

    /// Platform placeholder token emitted as the value
    pub fn placeholder(self) -> &'static str {
        match self {
            RequiredParam::Term => "{keyword}",
            RequiredParam::MatchType => "{matchtype}",
            RequiredParam::Device => "{device}",
            RequiredParam::Network => "{network}",
            RequiredParam::Placement => "{placement}",
            RequiredParam::Geo => "{loc_physical_ms}",
            RequiredParam::Content => "{creative}",
        }
    }
}

/// Required parameters for one `(source, medium)` pair
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RequiredParamRule {
    pub source: String,
    pub medium: String,
    pub params: Vec<RequiredParam>,
}

/// A source variant whose campaign and content come from the ad platform
///
/// Selecting `variant` emits `utm_source=platform_source` and the fixed
/// token pair instead of user-chosen campaign/content values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DynamicSource {
    pub variant: String,
    pub platform_source: String,
    pub campaign_token: String,
    pub content_token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CampaignOption {
    pub value: String,
    pub label: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTaxonomy {
    pub sources: Vec<String>,

    #[serde(default)]
    pub mediums_by_source: BTreeMap<String, Vec<String>>,

    /// Advisory only; the builder never rejects unlisted content
    #[serde(default)]
    pub content_by_medium: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub required_params: Vec<RequiredParamRule>,

    /// Empty means campaign is free text
    #[serde(default)]
    pub campaigns: Vec<CampaignOption>,

    #[serde(default)]
    pub dynamic_sources: Vec<DynamicSource>,

    /// Source -> suffix appended to the emitted campaign value
    #[serde(default)]
    pub campaign_suffixes: BTreeMap<String, String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn table(rows: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    rows.iter()
        .map(|(key, values)| (key.to_string(), strings(values)))
        .collect()
}

impl TagTaxonomy {
    /// The plain dropdown set: no platform rules, campaign chosen from a list
    pub fn basic() -> Self {
        Self {
            sources: strings(&[
                "google", "bing", "linkedin", "meta", "reddit", "youtube", "quora", "g2",
                "capterra", "newsletter", "community", "academy", "docs", "product", "github",
                "blog",
            ]),
            mediums_by_source: table(&[
                ("google", &["cpc", "display", "retargeting", "pmax"]),
                ("bing", &["cpc"]),
                ("linkedin", &["paid-social", "retargeting", "lead-gen"]),
                ("meta", &["paid-social", "retargeting", "display"]),
                ("reddit", &["paid-social", "retargeting", "referral"]),
                ("youtube", &["video", "retargeting", "referral"]),
                ("quora", &["native"]),
                ("g2", &["sponsored"]),
                ("capterra", &["sponsored"]),
                ("newsletter", &["email", "nurture", "product-update"]),
                ("community", &["referral", "internal-link", "engagement"]),
                ("academy", &["internal-link", "product-message", "onboarding"]),
                ("docs", &["internal-link", "product-message", "technical-content"]),
                ("product", &["product-message", "in-app-banner"]),
                ("github", &["referral", "technical"]),
                ("blog", &["internal-link", "thought-leadership", "seo-cta", "referral"]),
            ]),
            content_by_medium: table(&[
                (
                    "cpc",
                    &[
                        "search-top",
                        "search-brand",
                        "competitor-keywords",
                        "bottom-funnel",
                        "desktop-download",
                    ],
                ),
                (
                    "display",
                    &["ai-testing-banner", "automated-testing-banner", "retargeting-static"],
                ),
                ("retargeting", &["cart-abandon", "engaged-return", "ebook-download"]),
                ("pmax", &["auto-targeting", "branded-intent", "cross-device"]),
                (
                    "paid-social",
                    &["testimonial-video", "carousel-top", "offer-promo", "signup-lead"],
                ),
                ("video", &["feature-tour", "product-demo", "testing-trends"]),
                ("native", &["thought-leadership", "checklist-offer"]),
                ("sponsored", &["grid-placement", "featured-slot", "comparison-page"]),
                (
                    "email",
                    &["welcome-series", "product-update", "event-invite", "newsletter-feature"],
                ),
                ("nurture", &["mid-funnel-content", "value-prop-promo", "case-study"]),
                ("product-message", &["modal-feature-promo", "in-app-promo", "chatbot-trigger"]),
                ("in-app-banner", &["upgrade-promo", "start-trial-cta"]),
                (
                    "internal-link",
                    &["blog-cta", "academy-crosslink", "footer-cta", "sidebar-banner"],
                ),
                (
                    "referral",
                    &["community-article", "youtube-video-link", "reddit-thread", "github-readme"],
                ),
                ("technical", &["api-guide", "cli-docs", "integration-howto"]),
                ("technical-content", &["assertion-library", "data-driven-guide"]),
                ("onboarding", &["academy-intro", "tooling-setup", "quickstart"]),
                ("seo-cta", &["bottom-blog-banner", "mid-article-card"]),
                ("thought-leadership", &["2025-testing-report", "ai-in-testing-whitepaper"]),
                ("lead-gen", &["form-fill-ebook", "webinar-registration"]),
            ]),
            required_params: Vec::new(),
            campaigns: [
                ("soqr25", "SOQR25"),
                ("katalon_ai", "Katalon AI"),
                ("M2A", "Manual to Automated (M2A)"),
                ("OS2K", "Open source to Katalon (OS2K)"),
                ("abm", "Signal Based ABM"),
                ("competitor_replacement", "Competitor Replacement"),
                ("brand", "Brand"),
            ]
            .iter()
            .map(|(value, label)| CampaignOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect(),
            dynamic_sources: Vec::new(),
            campaign_suffixes: BTreeMap::new(),
        }
    }

    /// The basic set plus Meta ABO/CBO variants, the Bing campaign suffix
    /// and required placeholder parameters for paid channels
    pub fn extended() -> Self {
        use RequiredParam::*;

        let mut taxonomy = Self::basic();

        for variant in ["meta_abo", "meta_cbo"] {
            taxonomy.sources.push(variant.to_string());
            taxonomy
                .mediums_by_source
                .insert(variant.to_string(), strings(&["paid-social", "retargeting"]));
        }

        taxonomy.dynamic_sources = vec![
            DynamicSource {
                variant: "meta_abo".to_string(),
                platform_source: "meta".to_string(),
                campaign_token: "{campaign.name}".to_string(),
                content_token: "{adset.name}".to_string(),
            },
            DynamicSource {
                variant: "meta_cbo".to_string(),
                platform_source: "meta".to_string(),
                campaign_token: "{adset.name}".to_string(),
                content_token: "{ad.name}".to_string(),
            },
        ];

        taxonomy
            .campaign_suffixes
            .insert("bing".to_string(), "_Bing".to_string());

        let rule = |source: &str, medium: &str, params: &[RequiredParam]| RequiredParamRule {
            source: source.to_string(),
            medium: medium.to_string(),
            params: params.to_vec(),
        };
        taxonomy.required_params = vec![
            rule("google", "cpc", &[Term, MatchType, Device, Network]),
            rule("google", "display", &[Placement, Device, Content]),
            rule("google", "pmax", &[Geo, Device]),
            rule("bing", "cpc", &[Term, MatchType, Device]),
            rule("youtube", "video", &[Placement, Device]),
            rule("meta_abo", "paid-social", &[Placement]),
            rule("meta_cbo", "paid-social", &[Placement]),
        ];

        taxonomy
    }

    /// Loads a taxonomy from a JSON document on disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::TaxonomyRead {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::TaxonomyParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn dynamic_source(&self, source: &str) -> Option<&DynamicSource> {
        self.dynamic_sources.iter().find(|d| d.variant == source)
    }

    pub fn is_dynamic_source(&self, source: &str) -> bool {
        self.dynamic_source(source).is_some()
    }

    pub fn campaign_suffix(&self, source: &str) -> Option<&str> {
        self.campaign_suffixes.get(source).map(String::as_str)
    }

    /// Required parameters for the pair, in table order; empty when the
    /// combination is not listed
    pub fn required_params_for(&self, source: &str, medium: &str) -> &[RequiredParam] {
        self.required_params
            .iter()
            .find(|rule| rule.source == source && rule.medium == medium)
            .map(|rule| rule.params.as_slice())
            .unwrap_or(&[])
    }

    pub fn mediums_for(&self, source: &str) -> &[String] {
        self.mediums_by_source
            .get(source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contents_for(&self, medium: &str) -> &[String] {
        self.content_by_medium
            .get(medium)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Reports table entries that reference unknown sources
    ///
    /// Integrators supply the tables; gaps are reported, never filled in.
    pub fn consistency_warnings(&self) -> Vec<String> {
        let known = |source: &str| self.sources.iter().any(|s| s == source);
        let mut warnings = Vec::new();

        for source in self.mediums_by_source.keys() {
            if !known(source) {
                warnings.push(format!("medium table lists unknown source '{source}'"));
            }
        }
        for rule in &self.required_params {
            if !known(&rule.source) {
                warnings.push(format!(
                    "required parameter rule for ({}, {}) lists unknown source",
                    rule.source, rule.medium
                ));
            }
        }
        for dynamic in &self.dynamic_sources {
            if !known(&dynamic.variant) {
                warnings.push(format!(
                    "dynamic source variant '{}' is not a listed source",
                    dynamic.variant
                ));
            }
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_has_no_platform_rules() {
        let taxonomy = TagTaxonomy::basic();
        assert!(taxonomy.required_params.is_empty());
        assert!(taxonomy.dynamic_sources.is_empty());
        assert!(taxonomy.campaign_suffix("bing").is_none());
        assert_eq!(taxonomy.campaigns.len(), 7);
    }

    #[test]
    fn built_in_revisions_are_consistent() {
        assert!(TagTaxonomy::basic().consistency_warnings().is_empty());
        assert!(TagTaxonomy::extended().consistency_warnings().is_empty());
    }

    #[test]
    fn unlisted_combination_has_no_required_params() {
        let taxonomy = TagTaxonomy::extended();
        assert!(taxonomy.required_params_for("linkedin", "paid-social").is_empty());
        assert_eq!(
            taxonomy.required_params_for("google", "cpc"),
            &[
                RequiredParam::Term,
                RequiredParam::MatchType,
                RequiredParam::Device,
                RequiredParam::Network
            ]
        );
    }

    #[test]
    fn dropdown_narrowing() {
        let taxonomy = TagTaxonomy::basic();
        assert_eq!(taxonomy.mediums_for("bing"), &["cpc".to_string()]);
        assert!(taxonomy.mediums_for("unknown").is_empty());
        assert!(taxonomy.contents_for("lead-gen").contains(&"webinar-registration".to_string()));
    }

    #[test]
    fn inconsistent_tables_are_reported() {
        let mut taxonomy = TagTaxonomy::basic();
        taxonomy
            .mediums_by_source
            .insert("tiktok".to_string(), vec!["paid-social".to_string()]);
        let warnings = taxonomy.consistency_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("tiktok"));
    }

    #[test]
    fn loads_from_json_file() {
        let taxonomy = TagTaxonomy::extended();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_string(&taxonomy).unwrap()).unwrap();

        let loaded = TagTaxonomy::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, taxonomy);
    }

    #[test]
    fn required_param_kinds_use_lowercase_names() {
        let json = serde_json::json!({
            "sources": ["google"],
            "required_params": [
                { "source": "google", "medium": "cpc", "params": ["term", "matchtype"] }
            ]
        });
        let taxonomy: TagTaxonomy = serde_json::from_value(json).unwrap();
        assert_eq!(
            taxonomy.required_params_for("google", "cpc"),
            &[RequiredParam::Term, RequiredParam::MatchType]
        );
    }
}
