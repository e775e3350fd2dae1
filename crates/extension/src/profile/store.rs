//! Profile store contract and an in-memory implementation.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::record::ProfileRecord;

/// Maximum number of search results returned by a store.
pub const MAX_SEARCH_RESULTS: usize = 5;

/// Partition key of the profile table.
pub const EMAIL_PARTITION_KEY: &str = "email";

/// Profile store future type alias.
pub type StoreFut<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors from the profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the request.
    #[error("Profile store unavailable: {0}")]
    Unavailable(String),

    /// The key names a table or partition key the store does not serve.
    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    /// The item could not be decoded.
    #[error("Malformed profile record: {0}")]
    Malformed(String),
}

/// Primary key of one profile item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreKey {
    pub table: String,
    pub partition_key: String,
    pub key_value: String,
}

impl StoreKey {
    /// Key of the profile for `email` in `table`. The value is not
    /// validated; a malformed email simply matches nothing.
    #[must_use]
    pub fn by_email(table: impl Into<String>, email: impl AsRef<str>) -> Self {
        Self {
            table: table.into(),
            partition_key: EMAIL_PARTITION_KEY.to_string(),
            key_value: email.as_ref().trim().to_string(),
        }
    }
}

/// Secondary index used for prefix search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchIndex {
    #[serde(rename = "EmailSearchIndex")]
    Email,
    #[serde(rename = "NameSearchIndex")]
    Name,
    #[serde(rename = "PhoneSearchIndex")]
    Phone,
}

impl SearchIndex {
    /// Index name in the profile table.
    #[must_use]
    pub const fn index_name(self) -> &'static str {
        match self {
            Self::Email => "EmailSearchIndex",
            Self::Name => "NameSearchIndex",
            Self::Phone => "PhoneSearchIndex",
        }
    }

    /// Sort key of `record` in this index, lower-cased.
    #[must_use]
    pub fn sort_key(self, record: &ProfileRecord) -> String {
        let field = |value: &Option<String>| value.as_deref().unwrap_or_default().trim().to_owned();
        match self {
            Self::Email => field(&record.email).to_lowercase(),
            Self::Name => format!("{} {}", field(&record.first_name), field(&record.last_name))
                .trim()
                .to_lowercase(),
            Self::Phone => digits(&field(&record.phone)),
        }
    }

    /// Normalize a search prefix the way sort keys are normalized.
    #[must_use]
    pub fn normalize_prefix(self, prefix: &str) -> String {
        match self {
            Self::Phone => digits(prefix),
            Self::Email | Self::Name => prefix.trim().to_lowercase(),
        }
    }
}

impl fmt::Display for SearchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.index_name())
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// A search hit. Only the identity fields are projected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl From<&ProfileRecord> for ProfileSummary {
    fn from(record: &ProfileRecord) -> Self {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            first_name: field(&record.first_name),
            last_name: field(&record.last_name),
            email: field(&record.email),
            phone: field(&record.phone),
        }
    }
}

/// Key-value store of customer profiles with prefix search.
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile. `Ok(None)` means no item exists for the key.
    fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFut<'a, Option<ProfileRecord>>;

    /// Prefix search over one index, ascending, at most
    /// [`MAX_SEARCH_RESULTS`] hits.
    fn search<'a>(&'a self, index: SearchIndex, prefix: &'a str)
    -> StoreFut<'a, Vec<ProfileSummary>>;
}

/// Profile store held in memory, keyed by lower-cased email.
#[derive(Debug)]
pub struct InMemoryProfileStore {
    table: String,
    records: RwLock<BTreeMap<String, ProfileRecord>>,
    failure: RwLock<Option<String>>,
    searches: AtomicUsize,
}

impl InMemoryProfileStore {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            records: RwLock::new(BTreeMap::new()),
            failure: RwLock::new(None),
            searches: AtomicUsize::new(0),
        }
    }

    /// Build a store from records. Records without an email are skipped.
    #[must_use]
    pub fn with_records(
        table: impl Into<String>,
        records: impl IntoIterator<Item = ProfileRecord>,
    ) -> Self {
        let store = Self::new(table);
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a record. Returns `false` if it has no email.
    pub fn insert(&self, record: ProfileRecord) -> bool {
        let Some(key) = record
            .email
            .as_deref()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
        else {
            return false;
        };
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, record);
        true
    }

    /// Fail every following request with `message`; `None` restores service.
    pub fn set_failure(&self, message: Option<String>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = message;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of search requests served.
    #[must_use]
    pub fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(message) => Err(StoreError::Unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn lookup(&self, key: &StoreKey) -> Result<Option<ProfileRecord>, StoreError> {
        self.check_available()?;
        if key.table != self.table {
            return Err(StoreError::InvalidKey(format!("unknown table {}", key.table)));
        }
        if key.partition_key != EMAIL_PARTITION_KEY {
            return Err(StoreError::InvalidKey(format!(
                "unknown partition key {}",
                key.partition_key
            )));
        }
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        Ok(records.get(&key.key_value.trim().to_lowercase()).cloned())
    }

    fn prefix_search(
        &self,
        index: SearchIndex,
        prefix: &str,
    ) -> Result<Vec<ProfileSummary>, StoreError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let prefix = index.normalize_prefix(prefix);
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);

        let mut hits: Vec<(String, ProfileSummary)> = records
            .values()
            .map(|record| (index.sort_key(record), record))
            .filter(|(sort_key, _)| !sort_key.is_empty() && sort_key.starts_with(&prefix))
            .map(|(sort_key, record)| (sort_key, ProfileSummary::from(record)))
            .collect();
        hits.sort_by(|a, b| a.0.cmp(&b.0));
        hits.truncate(MAX_SEARCH_RESULTS);

        debug!(index = %index, prefix = %prefix, hits = hits.len(), "Profile search");
        Ok(hits.into_iter().map(|(_, summary)| summary).collect())
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn get<'a>(&'a self, key: &'a StoreKey) -> StoreFut<'a, Option<ProfileRecord>> {
        Box::pin(async move { self.lookup(key) })
    }

    fn search<'a>(
        &'a self,
        index: SearchIndex,
        prefix: &'a str,
    ) -> StoreFut<'a, Vec<ProfileSummary>> {
        Box::pin(async move { self.prefix_search(index, prefix) })
    }
}
