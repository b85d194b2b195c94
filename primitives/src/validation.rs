//! Validation of the request bodies before they are stored.
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("The regex should be valid")
});

/// All the failed checks of a single validation.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .0.join(", "))]
pub struct ValidationError(pub Vec<String>);

/// Collects the messages of the failed checks.
#[derive(Debug, Default)]
pub struct Validation(Vec<String>);

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` if the check failed.
    pub fn check(mut self, passed: bool, message: &str) -> Self {
        if !passed {
            self.0.push(message.to_string());
        }

        self
    }

    /// Records `message` if the value is present and fails the check.
    pub fn check_optional<T, F>(self, value: Option<&T>, check: F, message: &str) -> Self
    where
        T: ?Sized,
        F: FnOnce(&T) -> bool,
    {
        let passed = value.map_or(true, check);

        self.check(passed, message)
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(self.0))
        }
    }
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Only `http` and `https` URLs with a host are accepted.
pub fn is_website(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false)
}

/// Counted in characters, not bytes.
pub fn max_length(value: &str, max: usize) -> bool {
    value.chars().count() <= max
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collects_all_failed_checks() {
        let result = Validation::new()
            .check(true, "never shown")
            .check(false, "Please add a name")
            .check_optional(Some("not-an-email"), is_email, "Please add a valid email")
            .check_optional(None::<&str>, is_email, "not checked")
            .finish();

        assert_eq!(
            Err(ValidationError(vec![
                "Please add a name".to_string(),
                "Please add a valid email".to_string()
            ])),
            result
        );
        assert_eq!(
            "Please add a name, Please add a valid email",
            result.unwrap_err().to_string()
        );
    }

    #[test]
    fn emails_and_websites() {
        assert!(is_email("publisher@devworks.com"));
        assert!(is_email("john.doe@gmail.co.uk"));
        assert!(!is_email("publisher@devworks"));
        assert!(!is_email("publisher"));

        assert!(is_website("https://devworks.com"));
        assert!(is_website("http://www.devworks.com/path?x=1"));
        assert!(!is_website("ftp://devworks.com"));
        assert!(!is_website("devworks.com"));
    }

    #[test]
    fn max_length_counts_characters() {
        assert!(max_length("ÄÖÜ", 3));
        assert!(!max_length("abcd", 3));
    }
}
