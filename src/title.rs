//! Page titles: the alphanumeric identifiers that name pages and key their storage.

use crate::error::WikiError;
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};

/// A validated page title, matching `^[A-Za-z0-9]+$`.
///
/// Any value of this type is safe to use as a file name stem: it can contain neither path
/// separators nor dots, so it can never address anything outside a content root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PageTitle(String);

impl PageTitle {
    /// True when `candidate` is a non-empty run of ASCII letters and digits.
    pub fn is_valid(candidate: &str) -> bool {
        !candidate.is_empty() && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PageTitle {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if PageTitle::is_valid(s) {
            Ok(PageTitle(s.to_string()))
        } else {
            Err(WikiError::InvalidTitle(s.to_string()))
        }
    }
}

impl TryFrom<&str> for PageTitle {
    type Error = WikiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for PageTitle {
    type Error = WikiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if PageTitle::is_valid(&value) {
            Ok(PageTitle(value))
        } else {
            Err(WikiError::InvalidTitle(value))
        }
    }
}

impl<'de> Deserialize<'de> for PageTitle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PageTitle::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for PageTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
