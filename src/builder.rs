//! UTM URL construction
//!
//! [`build_utm_url`] turns a [`TagFields`] value into a canonical tagged URL
//! under the rules of a [`TagTaxonomy`]. The function is pure: the same
//! fields and taxonomy always produce the same string.
//!
//! Parameters are emitted in this order, after any query pairs already on
//! the base URL:
//! 1. `utm_source`, `utm_medium`, `utm_campaign`, `utm_content`
//! 2. the required placeholder parameters for `(source, medium)`
//! 3. the auxiliary fields the user filled in
//!
//! Setting a key that is already present replaces its value in place.

use url::{form_urlencoded, Url};

use crate::error::UtmError;
use crate::model::{non_blank, TagFields};
use crate::taxonomy::{RequiredParam, TagTaxonomy};

/// One `&`-separated segment of a query string
#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryPair {
    /// A segment without `=`, kept exactly as typed
    Bare { raw: String, key: String },
    Pair { key: String, value: String },
}

impl QueryPair {
    fn key(&self) -> &str {
        match self {
            QueryPair::Bare { key, .. } | QueryPair::Pair { key, .. } => key,
        }
    }
}

/// Ordered query parameters with replace-on-set semantics
#[derive(Debug, Default)]
struct QueryParams {
    pairs: Vec<QueryPair>,
}

impl QueryParams {
    fn from_url(url: &Url) -> Self {
        let pairs = url
            .query()
            .unwrap_or("")
            .split('&')
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| {
                let (key, value) = form_urlencoded::parse(segment.as_bytes()).next()?;
                let pair = if segment.contains('=') {
                    QueryPair::Pair {
                        key: key.into_owned(),
                        value: value.into_owned(),
                    }
                } else {
                    QueryPair::Bare {
                        raw: segment.to_string(),
                        key: key.into_owned(),
                    }
                };
                Some(pair)
            })
            .collect();

        Self { pairs }
    }

    fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|pair| pair.key() == key)
    }

    /// Replaces the first occurrence of `key` and drops the rest, or appends
    fn set(&mut self, key: &str, value: &str) {
        let replacement = QueryPair::Pair {
            key: key.to_string(),
            value: value.to_string(),
        };
        match self.pairs.iter().position(|pair| pair.key() == key) {
            Some(index) => {
                self.pairs[index] = replacement;
                let mut seen = 0;
                self.pairs.retain(|pair| {
                    if pair.key() != key {
                        return true;
                    }
                    seen += 1;
                    seen == 1
                });
            }
            None => self.pairs.push(replacement),
        }
    }

    /// Form-encodes the pairs, leaving placeholder tokens readable
    fn serialize(&self) -> String {
        self.pairs
            .iter()
            .map(|pair| match pair {
                QueryPair::Bare { raw, .. } => raw.clone(),
                QueryPair::Pair { key, value } => {
                    format!("{}={}", encode(key), encode_value(value))
                }
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn is_placeholder(value: &str) -> bool {
    value.contains('{') && value.contains('}')
}

fn encode_value(value: &str) -> String {
    let encoded = encode(value);
    if is_placeholder(value) {
        encoded.replace("%7B", "{").replace("%7D", "}")
    } else {
        encoded
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn has_http_scheme(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Parses a user-typed base URL, prepending `https://` when no scheme is given
pub fn parse_base_url(raw: &str) -> Result<Url, UtmError> {
    let trimmed = raw.trim();
    let candidate = if has_http_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|err| UtmError::InvalidUrl(format!("{trimmed}: {err}")))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UtmError::InvalidUrl(format!("{trimmed}: missing host")));
    }
    Ok(url)
}

/// Parses and canonicalizes a base URL
///
/// Drops an empty `?` or `#` and makes sure the path ends with `/`.
pub fn normalize_base_url(raw: &str) -> Result<Url, UtmError> {
    let mut url = parse_base_url(raw)?;

    if url.query() == Some("") {
        url.set_query(None);
    }
    if url.fragment() == Some("") {
        url.set_fragment(None);
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Campaign value with the source's suffix appended once
fn campaign_value(taxonomy: &TagTaxonomy, source: &str, campaign: &str) -> String {
    match taxonomy.campaign_suffix(source) {
        Some(suffix) if !campaign.ends_with(suffix) => format!("{campaign}{suffix}"),
        _ => campaign.to_string(),
    }
}

/// Builds the tagged URL for `fields`
///
/// Returns `Ok("")` when a mandatory field is missing, so callers can treat
/// an empty string as "no URL yet" and must not persist it. Returns
/// `Err(UtmError::InvalidUrl)` when the base URL cannot be parsed even with
/// `https://` prepended.
///
/// # Example
///
/// ```
/// # use utm_generator::builder::build_utm_url;
/// # use utm_generator::model::TagFields;
/// # use utm_generator::taxonomy::TagTaxonomy;
/// let fields = TagFields {
///     url: "example.com/page".into(),
///     source: "google".into(),
///     medium: "cpc".into(),
///     campaign: "spring_sale".into(),
///     ..Default::default()
/// };
/// let url = build_utm_url(&fields, &TagTaxonomy::basic()).unwrap();
/// assert_eq!(
///     url,
///     "https://example.com/page/?utm_source=google&utm_medium=cpc&utm_campaign=spring_sale"
/// );
/// ```
pub fn build_utm_url(fields: &TagFields, taxonomy: &TagTaxonomy) -> Result<String, UtmError> {
    let dynamic = taxonomy.dynamic_source(&fields.source);

    if is_blank(&fields.url) || is_blank(&fields.source) || is_blank(&fields.medium) {
        return Ok(String::new());
    }
    if dynamic.is_none() && is_blank(&fields.campaign) {
        return Ok(String::new());
    }

    let mut url = normalize_base_url(&fields.url)?;
    let mut params = QueryParams::from_url(&url);

    let source = dynamic.map_or(fields.source.as_str(), |d| d.platform_source.as_str());
    params.set("utm_source", source);
    params.set("utm_medium", &fields.medium);

    match dynamic {
        Some(dynamic) => {
            params.set("utm_campaign", &dynamic.campaign_token);
            params.set("utm_content", &dynamic.content_token);
        }
        None => {
            let campaign = campaign_value(taxonomy, &fields.source, &fields.campaign);
            params.set("utm_campaign", &campaign);
            if let Some(content) = fields.content() {
                params.set("utm_content", content);
            }
        }
    }

    for &param in taxonomy.required_params_for(&fields.source, &fields.medium) {
        if param == RequiredParam::Content && params.contains("utm_content") {
            continue;
        }
        params.set(param.key(), param.placeholder());
    }

    for (key, value) in fields.aux.entries() {
        if let Some(value) = non_blank(value) {
            params.set(key, value);
        }
    }

    url.set_query(Some(&params.serialize()));
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place() {
        let mut params = QueryParams::default();
        params.set("a", "1");
        params.set("b", "2");
        params.set("a", "3");
        assert_eq!(params.serialize(), "a=3&b=2");
    }

    #[test]
    fn set_collapses_repeated_keys() {
        let url = Url::parse("https://x.com/?a=1&b=2&a=3").unwrap();
        let mut params = QueryParams::from_url(&url);
        params.set("a", "9");
        assert_eq!(params.serialize(), "a=9&b=2");
    }

    #[test]
    fn bare_segments_are_kept_as_typed() {
        let url = Url::parse("https://x.com/?flag&a=1&&utm_medium").unwrap();
        let mut params = QueryParams::from_url(&url);
        params.set("utm_medium", "cpc");
        params.set("a", "2");
        assert_eq!(params.serialize(), "flag&a=2&utm_medium=cpc");
    }

    #[test]
    fn placeholders_keep_braces() {
        assert_eq!(encode_value("{campaign.name}"), "{campaign.name}");
        assert_eq!(encode_value("{keyword}"), "{keyword}");
        assert_eq!(encode_value("spring sale"), "spring+sale");
    }

    #[test]
    fn scheme_detection_ignores_case() {
        assert!(has_http_scheme("HTTPS://x.com"));
        assert!(has_http_scheme("http://x.com"));
        assert!(!has_http_scheme("x.com/https://"));
    }

    #[test]
    fn normalization_adds_trailing_slash_and_drops_empty_markers() {
        let url = normalize_base_url("  example.com/page?#  ").unwrap();
        assert_eq!(url.as_str(), "https://example.com/page/");

        let url = normalize_base_url("https://example.com").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn unparseable_base_is_rejected() {
        assert!(matches!(
            normalize_base_url("exa mple.com"),
            Err(UtmError::InvalidUrl(_))
        ));
        assert!(matches!(normalize_base_url("https://"), Err(UtmError::InvalidUrl(_))));
    }

    #[test]
    fn suffix_is_not_doubled() {
        let taxonomy = TagTaxonomy::extended();
        assert_eq!(campaign_value(&taxonomy, "bing", "q3"), "q3_Bing");
        assert_eq!(campaign_value(&taxonomy, "bing", "q3_Bing"), "q3_Bing");
        assert_eq!(campaign_value(&taxonomy, "google", "q3"), "q3");
    }
}
