use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The key used when no category is given.
pub const DEFAULT_CATEGORY: &str = "lainnya";

/// Known category keys and the labels shown for them.
const KNOWN_CATEGORIES: &[(&str, &str)] = &[
    ("makanan", "Makanan & Minuman"),
    ("transportasi", "Transportasi"),
    ("belanja", "Belanja"),
    ("hiburan", "Hiburan"),
    ("kesehatan", "Kesehatan"),
    ("gaji", "Gaji"),
    ("bonus", "Bonus"),
    (DEFAULT_CATEGORY, "Lainnya"),
];

/// The category of a transaction. Any text is accepted; well-known keys get a friendlier label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Creates a category from free text. Blank input becomes the default category.
    pub fn new(s: impl Into<String>) -> Self {
        let s = s.into();
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    /// The key as entered and stored.
    pub fn key(&self) -> &str {
        &self.0
    }

    /// The label to display for this category.
    pub fn label(&self) -> &str {
        KNOWN_CATEGORIES
            .iter()
            .find(|(key, _)| *key == self.0)
            .map(|(_, label)| *label)
            .unwrap_or(self.0.as_str())
    }

    /// True if this is one of the predefined categories.
    pub fn is_known(&self) -> bool {
        KNOWN_CATEGORIES.iter().any(|(key, _)| *key == self.0)
    }

    /// All predefined categories as `(key, label)` pairs.
    pub fn known() -> &'static [(&'static str, &'static str)] {
        KNOWN_CATEGORIES
    }
}

impl Default for Category {
    fn default() -> Self {
        Self(DEFAULT_CATEGORY.to_string())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_label() {
        assert_eq!(Category::new("makanan").label(), "Makanan & Minuman");
        assert!(Category::new("gaji").is_known());
    }

    #[test]
    fn test_unknown_label_is_key() {
        let c = Category::new("  Kopi ");
        assert_eq!(c.key(), "Kopi");
        assert_eq!(c.label(), "Kopi");
        assert!(!c.is_known());
    }

    #[test]
    fn test_blank_is_default() {
        assert_eq!(Category::new("   "), Category::default());
        assert_eq!(Category::new("").label(), "Lainnya");
    }
}
