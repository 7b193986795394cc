use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Keys every profile must carry before any submission is attempted.
pub const REQUIRED_KEYS: &[&str] = &["name", "email"];

/// Static applicant data used to fill application forms. Loaded once and
/// never mutated during a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicantProfile {
    values: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("failed to read applicant profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("applicant profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("applicant profile must be a JSON object of key/value pairs")]
    NotAnObject,
    #[error("applicant profile key '{key}' must be a string, number or boolean")]
    UnsupportedValue { key: String },
    #[error("applicant profile is missing required key '{key}'")]
    CredentialMissing { key: String },
    #[error("resume file {} does not exist", .path.display())]
    ResumeMissing { path: PathBuf },
}

impl ApplicantProfile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ProfileError> {
        let Value::Object(object) = serde_json::from_str::<Value>(raw)? else {
            return Err(ProfileError::NotAnObject);
        };

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let value = match value {
                Value::String(text) => text,
                Value::Number(number) => number.to_string(),
                Value::Bool(flag) => flag.to_string(),
                Value::Null => continue,
                Value::Array(_) | Value::Object(_) => {
                    return Err(ProfileError::UnsupportedValue { key })
                }
            };
            values.insert(normalize_key(&key), value);
        }

        Ok(Self { values })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(key, value)| (normalize_key(key.as_ref()), value.into()))
            .collect();
        Self { values }
    }

    /// Case- and punctuation-insensitive lookup; blank values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&normalize_key(key))
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn resume_path(&self) -> Option<PathBuf> {
        self.get("resume_path").map(PathBuf::from)
    }

    /// Fails on the first missing required key or a resume path that does
    /// not point at a file.
    pub fn validate(&self, required: &[&str]) -> Result<(), ProfileError> {
        if let Some(key) = required.iter().find(|key| self.get(key).is_none()) {
            return Err(ProfileError::CredentialMissing {
                key: (*key).to_string(),
            });
        }

        if let Some(path) = self.resume_path() {
            if !path.is_file() {
                return Err(ProfileError::ResumeMissing { path });
            }
        }

        Ok(())
    }
}

/// `urls[LinkedIn]` -> `urls_linkedin`, `Full Name` -> `full_name`.
pub fn normalize_key(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
        } else if !key.ends_with('_') {
            key.push('_');
        }
    }
    key.trim_matches('_').to_string()
}
