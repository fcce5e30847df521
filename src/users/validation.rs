//! Field-level validation of signup payloads.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

pub const RULE_REQUIRED: &str = "required";
pub const RULE_EMAIL: &str = "email";
pub const RULE_MIN: &str = "min";

/// Minimum password length, counted in characters before hashing.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Violations keyed by JSON field name, valued by the violated rule tag.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, rule: &'static str) {
        // the first violated rule for a field wins
        self.0.entry(field).or_insert(rule);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Lightweight email grammar check.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

/// Record `required` when `value` is empty.
pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if value.is_empty() {
        errors.add(field, RULE_REQUIRED);
        false
    } else {
        true
    }
}

/// How strictly the email-availability endpoint checks the address format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmailCheck {
    /// Every string is treated as syntactically valid.
    #[default]
    Permissive,
    /// The address must match [`valid_email`].
    Strict,
}

impl EmailCheck {
    #[must_use]
    pub fn accepts(self, email: &str) -> bool {
        match self {
            Self::Permissive => true,
            Self::Strict => valid_email(email),
        }
    }
}

impl std::str::FromStr for EmailCheck {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "strict" => Ok(Self::Strict),
            other => Err(format!("invalid email check: {other}")),
        }
    }
}

impl std::fmt::Display for EmailCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("ann@x.com"));
        assert!(valid_email("first.last+tag@sub.example.org"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("ann@x"));
        assert!(!valid_email("a nn@x.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn first_rule_per_field_is_kept() {
        let mut errors = FieldErrors::default();
        errors.add("password", RULE_REQUIRED);
        errors.add("password", RULE_MIN);
        assert_eq!(errors.get("password"), Some(RULE_REQUIRED));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn field_errors_serialize_as_flat_map() {
        let mut errors = FieldErrors::default();
        errors.add("password", RULE_MIN);
        errors.add("email", RULE_EMAIL);
        let json = serde_json::to_value(&errors).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({"email": "email", "password": "min"}))
        );
    }

    #[test]
    fn email_check_modes() {
        assert!(EmailCheck::Permissive.accepts("whatever"));
        assert!(EmailCheck::Permissive.accepts(""));
        assert!(!EmailCheck::Strict.accepts("whatever"));
        assert!(EmailCheck::Strict.accepts("ann@x.com"));
        assert_eq!("STRICT".parse::<EmailCheck>(), Ok(EmailCheck::Strict));
        assert!("loose".parse::<EmailCheck>().is_err());
    }
}
