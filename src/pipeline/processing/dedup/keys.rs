use serde::{Deserialize, Serialize};

use crate::domain::ListingRecord;

/// Produces the value two records must share to be duplicates of each other.
/// `None` means the record cannot be matched by this key.
pub trait KeyExtractor {
    fn name(&self) -> &str;
    fn key(&self, record: &ListingRecord) -> Option<String>;
}

/// URL canonicalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlKeyConfig {
    /// Drop the whole query string
    pub strip_query: bool,
    /// Parameters removed when the query string is kept; `prefix*` matches by prefix
    pub ignored_query_params: Vec<String>,
    /// Treat `http://`, `https://` and `www.` variants as the same listing
    pub strip_scheme: bool,
}

impl Default for UrlKeyConfig {
    fn default() -> Self {
        Self {
            strip_query: true,
            ignored_query_params: ["utm_*", "ref", "fbclid", "gclid"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strip_scheme: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UrlKey {
    config: UrlKeyConfig,
}

impl UrlKey {
    pub fn new(config: UrlKeyConfig) -> Self {
        Self { config }
    }

    pub fn canonicalize(&self, url: &str) -> Option<String> {
        let mut url: String = url
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        if let Some(pos) = url.find('#') {
            url.truncate(pos);
        }

        if let Some(pos) = url.find('?') {
            let query = url[pos + 1..].to_string();
            url.truncate(pos);
            if !self.config.strip_query {
                let kept: Vec<&str> = query
                    .split('&')
                    .filter(|pair| !pair.is_empty() && !self.is_ignored(pair))
                    .collect();
                if !kept.is_empty() {
                    url = format!("{}?{}", url.trim_end_matches('/'), kept.join("&"));
                }
            }
        }

        if self.config.strip_scheme {
            for prefix in ["https://", "http://"] {
                if let Some(rest) = url.strip_prefix(prefix) {
                    url = rest.to_string();
                    break;
                }
            }
            if let Some(rest) = url.strip_prefix("www.") {
                url = rest.to_string();
            }
        }

        let url = url.trim_end_matches('/');
        (!url.is_empty()).then(|| url.to_string())
    }

    fn is_ignored(&self, pair: &str) -> bool {
        let param = pair.split('=').next().unwrap_or(pair);
        self.config.ignored_query_params.iter().any(|pattern| {
            let pattern = pattern.to_lowercase();
            match pattern.strip_suffix('*') {
                Some(prefix) => param.starts_with(prefix),
                None => param == pattern,
            }
        })
    }
}

impl KeyExtractor for UrlKey {
    fn name(&self) -> &str {
        "url"
    }

    fn key(&self, record: &ListingRecord) -> Option<String> {
        record.url().and_then(|url| self.canonicalize(url))
    }
}

/// Lossy name key: lower-cased alphanumerics, truncated
#[derive(Debug, Clone)]
pub struct NameKey {
    prefix_len: usize,
}

impl NameKey {
    pub fn new(prefix_len: usize) -> Self {
        Self { prefix_len }
    }

    pub fn canonicalize(&self, name: &str) -> Option<String> {
        let key: String = name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(self.prefix_len)
            .collect();
        (!key.is_empty()).then_some(key)
    }
}

impl Default for NameKey {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_NAME_PREFIX_LEN)
    }
}

impl KeyExtractor for NameKey {
    fn name(&self) -> &str {
        "name"
    }

    fn key(&self, record: &ListingRecord) -> Option<String> {
        record.name().and_then(|name| self.canonicalize(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_key_canonicalization() {
        let key = UrlKey::default();
        assert_eq!(key.canonicalize(" A.com/1/ ").as_deref(), Some("a.com/1"));
        assert_eq!(
            key.canonicalize("https://Example.com/listing/9?utm_source=mail#photos").as_deref(),
            Some("https://example.com/listing/9")
        );
        assert_eq!(key.canonicalize("https://a.com/x y").as_deref(), Some("https://a.com/xy"));
        assert_eq!(key.canonicalize("   "), None);
        assert_eq!(key.canonicalize("/"), None);
    }

    #[test]
    fn test_url_key_keeps_scheme_by_default() {
        let key = UrlKey::default();
        assert_ne!(
            key.canonicalize("http://a.com/1"),
            key.canonicalize("https://a.com/1")
        );

        let loose = UrlKey::new(UrlKeyConfig {
            strip_scheme: true,
            ..Default::default()
        });
        assert_eq!(loose.canonicalize("http://www.a.com/1").as_deref(), Some("a.com/1"));
        assert_eq!(loose.canonicalize("https://a.com/1/").as_deref(), Some("a.com/1"));
    }

    #[test]
    fn test_url_key_drops_only_noise_params_when_query_kept() {
        let key = UrlKey::new(UrlKeyConfig {
            strip_query: false,
            ..Default::default()
        });
        assert_eq!(
            key.canonicalize("a.com/l?id=7&utm_medium=x&fbclid=abc").as_deref(),
            Some("a.com/l?id=7")
        );
        assert_eq!(key.canonicalize("a.com/l/?utm_source=x").as_deref(), Some("a.com/l"));
        assert_ne!(key.canonicalize("a.com/l?id=7"), key.canonicalize("a.com/l?id=8"));
    }

    #[test]
    fn test_name_key_is_lossy() {
        let key = NameKey::default();
        assert_eq!(key.canonicalize("Widget Shop, Inc.").as_deref(), Some("widgetshopinc"));
        assert_eq!(key.canonicalize("***"), None);

        let long = "A".repeat(80);
        assert_eq!(key.canonicalize(&long).map(|k| k.len()), Some(50));

        let short = NameKey::new(5);
        assert_eq!(short.canonicalize("Coastal Coffee").as_deref(), Some("coast"));
    }

    #[test]
    fn test_extractors_read_record_fields() {
        let record = ListingRecord::new()
            .with("url", "https://a.com/1/")
            .with("title", "Bakery For Sale");
        assert_eq!(UrlKey::default().key(&record).as_deref(), Some("https://a.com/1"));
        assert_eq!(NameKey::default().key(&record).as_deref(), Some("bakeryforsale"));
        assert_eq!(NameKey::default().key(&ListingRecord::new()), None);
    }
}
