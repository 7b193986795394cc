use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Dedup key for a posting: the canonical posting URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    /// Lowercases the host and drops query, fragment and trailing slashes so
    /// the same posting reached through different links maps to one id.
    pub fn from_url(url: &Url) -> Self {
        let mut canonical = url.clone();
        canonical.set_query(None);
        canonical.set_fragment(None);
        let path = canonical.path().trim_end_matches('/').to_string();
        canonical.set_path(if path.is_empty() { "/" } else { &path });

        let rendered = canonical.to_string();
        let rendered = rendered.strip_suffix('/').unwrap_or(&rendered);
        Self(rendered.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A posting discovered by a source but not yet fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLink {
    pub id: ListingId,
    pub posting_url: Url,
    pub apply_url: Url,
}

impl PostingLink {
    pub fn new(posting_url: Url, apply_url: Url) -> Self {
        Self {
            id: ListingId::from_url(&posting_url),
            posting_url,
            apply_url,
        }
    }
}

/// Normalized job posting produced by a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: ListingId,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub source: String,
    pub team: Option<String>,
    pub commitment: Option<String>,
    pub workplace: Option<String>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub description: String,
    pub qualifications: Option<String>,
    pub posting_url: String,
    pub apply_url: String,
    pub discovered_at: DateTime<Utc>,
}

/// What to search for and where.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchCriteria {
    pub keywords: String,
    /// Comma-separated location terms; any one of them must appear in a
    /// listing's location for it to be kept.
    pub location: Option<String>,
    pub pages: usize,
    /// Names of the sources to query. Empty means every registered source.
    pub sources: Vec<String>,
}

impl SearchCriteria {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            location: None,
            pages: 1,
            sources: Vec::new(),
        }
    }

    pub fn location_terms(&self) -> Vec<String> {
        self.location
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect()
    }

    pub fn accepts(&self, listing: &JobListing) -> bool {
        let terms = self.location_terms();
        if terms.is_empty() {
            return true;
        }

        match listing.location.as_deref() {
            Some(location) => {
                let location = location.to_lowercase();
                terms.iter().any(|term| location.contains(term.as_str()))
            }
            None => false,
        }
    }

    pub fn wants_source(&self, name: &str) -> bool {
        self.sources.is_empty()
            || self
                .sources
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn listing(location: Option<&str>) -> JobListing {
        JobListing {
            id: ListingId::from("https://jobs.lever.co/acme/1"),
            title: "Data Scientist".to_string(),
            company: "Acme".to_string(),
            location: location.map(str::to_string),
            source: "lever".to_string(),
            team: None,
            commitment: None,
            workplace: None,
            min_salary: None,
            max_salary: None,
            description: String::new(),
            qualifications: None,
            posting_url: "https://jobs.lever.co/acme/1".to_string(),
            apply_url: "https://jobs.lever.co/acme/1/apply".to_string(),
            discovered_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn listing_id_ignores_query_fragment_and_trailing_slash() {
        let a = Url::parse("https://JOBS.lever.co/acme/123/?lever-source=x#top").unwrap();
        let b = Url::parse("https://jobs.lever.co/acme/123").unwrap();
        assert_eq!(ListingId::from_url(&a), ListingId::from_url(&b));
        assert_eq!(
            ListingId::from_url(&b).as_str(),
            "https://jobs.lever.co/acme/123"
        );
    }

    #[test]
    fn criteria_without_location_accepts_everything() {
        let criteria = SearchCriteria::new("rust");
        assert!(criteria.accepts(&listing(None)));
        assert!(criteria.accepts(&listing(Some("Berlin"))));
    }

    #[test]
    fn criteria_location_terms_match_case_insensitively() {
        let mut criteria = SearchCriteria::new("rust");
        criteria.location = Some("Remote, New York".to_string());
        assert!(criteria.accepts(&listing(Some("REMOTE - US"))));
        assert!(criteria.accepts(&listing(Some("New York, NY"))));
        assert!(!criteria.accepts(&listing(Some("London"))));
        assert!(!criteria.accepts(&listing(None)));
    }

    #[test]
    fn empty_source_list_wants_every_source() {
        let mut criteria = SearchCriteria::new("rust");
        assert!(criteria.wants_source("lever"));
        criteria.sources = vec!["Lever".to_string()];
        assert!(criteria.wants_source("lever"));
        assert!(!criteria.wants_source("greenhouse"));
    }
}
