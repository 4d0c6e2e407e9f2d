use sha2::{Digest, Sha256};

use crate::constants::LISTING_ID_FIELD;
use crate::domain::ListingRecord;
use crate::pipeline::processing::dedup::UrlKey;

/// Stable listing identity: `hex(sha256(source|canonical url))`.
///
/// Two scrapes of the same listing on the same marketplace hash to the same
/// id, so downstream stores can upsert on it.
pub fn compute_listing_id(source: &str, canonical_url: &str) -> String {
    let mut s = String::with_capacity(source.len() + canonical_url.len() + 1);
    s.push_str(&source.trim().to_lowercase());
    s.push('|');
    s.push_str(canonical_url);

    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hex::encode(hasher.finalize())
}

/// Writes `listing_id`, or `null` when the record has no usable URL
pub fn assign_listing_id(record: &mut ListingRecord, url_key: &UrlKey) -> Option<String> {
    let id = record
        .url()
        .and_then(|url| url_key.canonicalize(url))
        .map(|url| compute_listing_id(record.source().unwrap_or_default(), &url));
    record.set_text(LISTING_ID_FIELD, id.as_deref());
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_id_is_stable_across_url_variants() {
        let key = UrlKey::default();
        let mut a = ListingRecord::new()
            .with("source", "BizBuySell")
            .with("url", "https://www.bizbuysell.com/Business-Opportunity/x/123/?utm_source=feed");
        let mut b = ListingRecord::new()
            .with("source", "bizbuysell")
            .with("url", "https://www.bizbuysell.com/business-opportunity/x/123");

        let id_a = assign_listing_id(&mut a, &key);
        let id_b = assign_listing_id(&mut b, &key);
        assert!(id_a.is_some());
        assert_eq!(id_a, id_b);
        assert_eq!(id_a.as_ref().map(|id| id.len()), Some(64));
        assert_eq!(a.text(LISTING_ID_FIELD), id_a.as_deref());
    }

    #[test]
    fn test_listing_id_depends_on_source() {
        assert_ne!(
            compute_listing_id("BizQuest", "https://a.com/1"),
            compute_listing_id("Flippa", "https://a.com/1")
        );
    }

    #[test]
    fn test_missing_url_gives_null_id() {
        let mut record = ListingRecord::new().with("source", "Flippa");
        assert_eq!(assign_listing_id(&mut record, &UrlKey::default()), None);
        assert_eq!(record.get(LISTING_ID_FIELD), Some(&serde_json::Value::Null));
    }
}
