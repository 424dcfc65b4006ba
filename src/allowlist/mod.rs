//! Signup email allow-list
//!
//! An [`Allowlist`] is the canonical, deduplicated set of email addresses
//! permitted to register. It is only ever produced by the
//! [`AllowlistNormalizer`] or loaded back from a store that persisted one, so
//! every entry has passed email validation at write time.

pub mod email;
pub mod normalize;

use serde::{Deserialize, Serialize};

pub use email::{Canonicalizer, DefaultCanonicalizer, DefaultEmailValidator, EmailValidator};
pub use normalize::AllowlistNormalizer;

/// Name of the persisted setting holding the allow-list
pub const ALLOWLIST_OPTION: &str = "signup_email_allowlist";

/// Canonical set of allowed emails, kept in insertion order for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Allowlist {
    entries: Vec<String>,
}

impl Allowlist {
    /// Rebuild an allow-list from a previously persisted value.
    ///
    /// Empty strings and repeated values are dropped; entries are otherwise
    /// trusted since they were validated when they were written.
    pub(crate) fn from_persisted(entries: Vec<String>) -> Self {
        let mut allowlist = Self::default();
        for entry in entries {
            if !entry.is_empty() {
                allowlist.insert(entry);
            }
        }
        allowlist
    }

    /// Insert an entry, returning false if it was already present
    pub(crate) fn insert(&mut self, entry: String) -> bool {
        if self.contains(&entry) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn contains(&self, email: &str) -> bool {
        self.entries.iter().any(|entry| entry == email)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.entries
    }

    /// Comma-joined form shown in the admin textarea
    pub fn to_display_string(&self) -> String {
        self.entries.join(",")
    }
}

/// Raw administrator input: a comma-delimited string or a list of candidates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AllowlistInput {
    Text(String),
    List(Vec<String>),
}

impl AllowlistInput {
    pub fn is_empty(&self) -> bool {
        match self {
            AllowlistInput::Text(text) => text.is_empty(),
            AllowlistInput::List(items) => items.is_empty(),
        }
    }
}

impl Default for AllowlistInput {
    fn default() -> Self {
        AllowlistInput::Text(String::new())
    }
}

impl From<&str> for AllowlistInput {
    fn from(text: &str) -> Self {
        AllowlistInput::Text(text.to_string())
    }
}

impl From<String> for AllowlistInput {
    fn from(text: String) -> Self {
        AllowlistInput::Text(text)
    }
}

impl From<Vec<String>> for AllowlistInput {
    fn from(items: Vec<String>) -> Self {
        AllowlistInput::List(items)
    }
}

impl From<Vec<&str>> for AllowlistInput {
    fn from(items: Vec<&str>) -> Self {
        AllowlistInput::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<&Allowlist> for AllowlistInput {
    fn from(allowlist: &Allowlist) -> Self {
        AllowlistInput::List(allowlist.entries.clone())
    }
}
