use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::allowlist::{Allowlist, ALLOWLIST_OPTION};
use crate::error::{AppError, AppResult};

/// Database-specific adapter for reading and writing one option row
#[async_trait]
pub trait OptionAccessor: Send + Sync {
    /// Raw JSON text stored under `name`, if any
    async fn read_option(&self, name: &str) -> AppResult<Option<String>>;

    /// Insert or overwrite the JSON text stored under `name`
    async fn write_option(&self, name: &str, value: &str, updated_at: DateTime<Utc>)
        -> AppResult<()>;
}

/// Shared allow-list logic on top of a database accessor
pub struct UnifiedOptionOps<A: OptionAccessor> {
    accessor: A,
}

impl<A: OptionAccessor> UnifiedOptionOps<A> {
    pub fn new(accessor: A) -> Self {
        Self { accessor }
    }

    pub async fn load_allowlist(&self) -> AppResult<Allowlist> {
        match self.accessor.read_option(ALLOWLIST_OPTION).await? {
            Some(raw) => OptionValueProcessor::parse_allowlist(&raw),
            None => Ok(Allowlist::default()),
        }
    }

    pub async fn save_allowlist(&self, allowlist: &Allowlist) -> AppResult<()> {
        let value = serde_json::to_string(allowlist)?;
        self.accessor
            .write_option(ALLOWLIST_OPTION, &value, Utc::now())
            .await
    }
}

/// Decoding of persisted option values
pub struct OptionValueProcessor;

impl OptionValueProcessor {
    /// Decode a stored allow-list.
    ///
    /// `null` and the empty string (an allow-list that was registered but never
    /// saved) both read as an empty list. Anything other than an array of
    /// strings is corrupt and fails the read.
    pub fn parse_allowlist(raw: &str) -> AppResult<Allowlist> {
        let value: Value = serde_json::from_str(raw)?;

        match value {
            Value::Null => Ok(Allowlist::default()),
            Value::String(s) if s.is_empty() => Ok(Allowlist::default()),
            Value::Array(items) => {
                let mut entries = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(entry) => entries.push(entry),
                        other => {
                            return Err(AppError::Database(format!(
                                "Stored allow-list contains a non-string entry: {}",
                                other
                            )))
                        }
                    }
                }
                Ok(Allowlist::from_persisted(entries))
            }
            other => Err(AppError::Database(format!(
                "Stored allow-list is not an array: {}",
                other
            ))),
        }
    }
}
