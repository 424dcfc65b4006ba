use std::sync::Arc;

use super::email::{Canonicalizer, DefaultCanonicalizer, DefaultEmailValidator, EmailValidator};
use super::{Allowlist, AllowlistInput};

/// Turns raw administrator input into a canonical [`Allowlist`].
///
/// Malformed tokens are dropped rather than reported: a batch never fails as
/// a whole because one entry is bad.
#[derive(Clone)]
pub struct AllowlistNormalizer {
    validator: Arc<dyn EmailValidator>,
    canonicalizer: Arc<dyn Canonicalizer>,
}

impl AllowlistNormalizer {
    pub fn new(validator: Arc<dyn EmailValidator>, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        Self {
            validator,
            canonicalizer,
        }
    }

    /// Normalize a comma-delimited string or a list of candidate emails
    pub fn normalize(&self, input: impl Into<AllowlistInput>) -> Allowlist {
        let input = input.into();
        let mut allowlist = Allowlist::default();

        if input.is_empty() {
            return allowlist;
        }

        let tokens: Vec<&str> = match &input {
            AllowlistInput::Text(text) => text.split(',').collect(),
            AllowlistInput::List(items) => items.iter().map(String::as_str).collect(),
        };

        for token in tokens {
            if let Some(entry) = self.normalize_entry(token) {
                allowlist.insert(entry);
            }
        }

        allowlist
    }

    /// Canonical form of a single candidate, or `None` if it is not an email
    pub fn normalize_entry(&self, token: &str) -> Option<String> {
        let token = token.trim();
        if token.is_empty() || !self.validator.is_valid_email(token) {
            return None;
        }

        let canonical = self.canonicalizer.canonicalize(token);
        // sanitizing can leave something that no longer validates, e.g. a quoted "a..b"
        if canonical.is_empty() || !self.validator.is_valid_email(&canonical) {
            return None;
        }

        Some(canonical)
    }
}

impl Default for AllowlistNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(DefaultEmailValidator), Arc::new(DefaultCanonicalizer))
    }
}
