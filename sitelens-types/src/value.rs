use core::fmt;

use serde::{Deserialize, Serialize};

/// Value of one field in a normalized record.
///
/// `Unknown` is the explicit "could not determine" sentinel. Every other
/// variant is a determined value, including an empty `List`, which means the
/// provider looked and found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FieldValue {
    /// The value could not be determined.
    #[default]
    Unknown,
    /// Free text.
    Text(String),
    /// A count or other non-negative integer.
    Count(u64),
    /// A yes/no answer.
    Flag(bool),
    /// An ordered list of short strings.
    List(Vec<String>),
    /// A duration in milliseconds.
    Millis(u64),
}

impl FieldValue {
    /// Build a text value; blank input yields `Unknown`.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Self::Unknown
        } else if trimmed.len() == s.len() {
            Self::Text(s)
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// Build a text value from an optional string; `None` or blank yields `Unknown`.
    pub fn opt_text<S: Into<String>>(s: Option<S>) -> Self {
        s.map_or(Self::Unknown, Self::text)
    }

    /// Build a list value, dropping blank entries.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(
            items
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.trim().is_empty())
                .collect(),
        )
    }

    /// True for the `Unknown` sentinel.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// True for any determined value.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !self.is_unknown()
    }

    /// Borrow the inner text if this is a `Text` value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Inner flag if this is a `Flag` value.
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Inner count if this is a `Count` value.
    #[must_use]
    pub const fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Borrow the inner items if this is a `List` value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("Unknown"),
            Self::Text(s) => f.write_str(s),
            Self::Count(n) => write!(f, "{n}"),
            Self::Flag(true) => f.write_str("Yes"),
            Self::Flag(false) => f.write_str("No"),
            Self::List(items) if items.is_empty() => f.write_str("None"),
            Self::List(items) => f.write_str(&items.join(", ")),
            Self::Millis(ms) => write!(f, "{ms}ms"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Count(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}
