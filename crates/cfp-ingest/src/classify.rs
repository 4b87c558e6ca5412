//! Company classification
//!
//! Derives a canonical source name from a record URL and decides whether
//! the owning file is a product feed or an article feed. Classification
//! runs once per file, from the first valid record line, and the result
//! is applied to every record in that file.

use cfp_common::{CfpError, Result};
use url::Url;

/// Outcome of classifying one feed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Canonical source name (lowercased registrable-domain label)
    pub company: String,
    /// Whether the source is a known product feed
    pub is_product: bool,
}

/// Classification rule data.
///
/// The exclusion and allow-list sets evolved over the life of the feed
/// and are kept as plain data rather than hard-coded logic. Defaults
/// reflect the current policy.
#[derive(Debug, Clone)]
pub struct ClassifierRules {
    /// Sources whose files are product feeds; anything else is an
    /// article feed. Matched case-insensitively on the canonical name.
    pub product_sources: Vec<String>,

    /// Sources excluded from ingestion entirely; matched as a substring
    /// of the canonical name. Files from these sources are dropped
    /// before entering the pipeline.
    pub blocked_sources: Vec<String>,

    /// Object keys containing any of these markers are non-feed assets
    /// and are skipped without a fetch.
    pub skip_key_markers: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            product_sources: [
                "ebay",
                "sweetwater",
                "perfectcircuit",
                "reverb",
                "thomann",
                "zzounds",
                "samash",
                "guitarcenter",
                "musiciansfriend",
                "thomannmusic",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            blocked_sources: vec!["ebay".to_string()],
            skip_key_markers: vec!["images/".to_string()],
        }
    }
}

impl ClassifierRules {
    /// Classify a record URL into a canonical source name and product flag.
    pub fn classify(&self, raw_url: &str) -> Result<Classification> {
        let parsed = Url::parse(raw_url)
            .map_err(|e| CfpError::classification(format!("invalid URL {raw_url:?}: {e}")))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| CfpError::classification(format!("URL has no host: {raw_url:?}")))?;

        let company = registrable_label(host).trim().to_lowercase();
        if company.is_empty() {
            return Err(CfpError::classification(format!(
                "empty company name for host {host:?}"
            )));
        }

        Ok(Classification {
            is_product: self.is_product(&company),
            company,
        })
    }

    /// Case-insensitive membership test against the product allow-list.
    pub fn is_product(&self, company: &str) -> bool {
        let target = company.trim().to_lowercase();
        self.product_sources.iter().any(|s| s.to_lowercase() == target)
    }

    /// Whether a canonical name belongs to an excluded source.
    pub fn is_blocked(&self, company: &str) -> bool {
        let target = company.to_lowercase();
        self.blocked_sources
            .iter()
            .any(|blocked| target.contains(&blocked.to_lowercase()))
    }

    /// Whether an object key points at a non-feed asset.
    pub fn skip_key(&self, key: &str) -> bool {
        self.skip_key_markers.iter().any(|m| key.contains(m.as_str()))
    }
}

/// Common two-part public suffixes. Stands in for full public-suffix
/// data; hosts not covered fall back to the second-to-last label.
const TWO_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "com.au", "net.au", "org.au", "co.jp", "co.nz",
    "co.in", "com.br", "com.mx", "co.za",
];

/// Isolate the registrable-domain label of a hostname.
///
/// `www.sweetwater.com` -> `sweetwater`, `shop.example.co.uk` -> `example`.
fn registrable_label(host: &str) -> &str {
    let labels: Vec<&str> = host.trim_end_matches('.').split('.').collect();
    if labels.len() < 2 {
        return labels.first().copied().unwrap_or("");
    }

    let last_two = format!("{}.{}", labels[labels.len() - 2], labels[labels.len() - 1]);
    if TWO_PART_SUFFIXES.contains(&last_two.to_lowercase().as_str()) {
        if labels.len() >= 3 {
            labels[labels.len() - 3]
        } else {
            ""
        }
    } else {
        labels[labels.len() - 2]
    }
}
