use email_address::EmailAddress;
use lazy_static::lazy_static;
use regex::Regex;

/// Shortest address accepted, e.g. `a@b.co`
pub const MIN_EMAIL_LENGTH: usize = 6;

/// Longest address accepted (RFC 5321 forward-path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

lazy_static! {
    static ref DISALLOWED_LOCAL_CHARS: Regex =
        Regex::new(r"[^A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]").unwrap();
    static ref DISALLOWED_LABEL_CHARS: Regex = Regex::new(r"(?i)[^a-z0-9-]").unwrap();
    static ref REPEATED_DOTS: Regex = Regex::new(r"\.{2,}").unwrap();
}

/// Decides whether a string is a syntactically valid email address
pub trait EmailValidator: Send + Sync {
    fn is_valid_email(&self, email: &str) -> bool;
}

/// Turns a valid email address into the form used for storage and comparison
pub trait Canonicalizer: Send + Sync {
    /// Returns an empty string when nothing usable remains
    fn canonicalize(&self, email: &str) -> String;
}

/// RFC 5322 validation through the `email_address` crate, restricted to
/// addresses whose domain has at least one dot and that carry no control or
/// whitespace characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEmailValidator;

impl EmailValidator for DefaultEmailValidator {
    fn is_valid_email(&self, email: &str) -> bool {
        if email.len() < MIN_EMAIL_LENGTH || email.len() > MAX_EMAIL_LENGTH {
            return false;
        }

        if email.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return false;
        }

        let Some((_, domain)) = email.rsplit_once('@') else {
            return false;
        };

        if !domain.contains('.') {
            return false;
        }

        EmailAddress::is_valid(email)
    }
}

/// Strips characters not allowed in a plain `local@domain` address and
/// lower-cases the result.
///
/// The local part keeps RFC 5322 atext plus dots. The domain collapses
/// repeated dots, drops characters outside `a-z0-9-` from every label, trims
/// hyphens from label edges and needs at least two labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCanonicalizer;

impl Canonicalizer for DefaultCanonicalizer {
    fn canonicalize(&self, email: &str) -> String {
        let email = email.trim();

        let Some((local, domain)) = email.rsplit_once('@') else {
            return String::new();
        };

        let local = DISALLOWED_LOCAL_CHARS.replace_all(local, "");
        if local.is_empty() {
            return String::new();
        }

        let domain = REPEATED_DOTS.replace_all(domain, ".");
        let domain = domain.trim_matches(|c: char| c == '.' || c.is_whitespace());

        let labels: Vec<String> = domain
            .split('.')
            .map(|label| {
                DISALLOWED_LABEL_CHARS
                    .replace_all(label, "")
                    .trim_matches('-')
                    .to_string()
            })
            .filter(|label| !label.is_empty())
            .collect();

        if labels.len() < 2 {
            return String::new();
        }

        format!("{}@{}", local, labels.join(".")).to_lowercase()
    }
}
