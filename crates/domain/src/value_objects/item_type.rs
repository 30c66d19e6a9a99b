//! Item type tags and container type restrictions
//!
//! Catalog data historically stored a container's accepted types as a
//! comma-separated string ("weapon, armor"). Those strings are parsed once,
//! when the catalog is loaded, into an [`ItemTypeSet`] that is compared by
//! exact membership.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum length of a single item type tag
const MAX_TAG_LENGTH: usize = 64;

// ============================================================================
// ItemTypeTag
// ============================================================================

/// A validated item type tag (non-empty, trimmed, lowercase, <=64 chars)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemTypeTag(String);

impl ItemTypeTag {
    /// Create a new validated type tag.
    ///
    /// Tags are case-insensitive: `"Weapon"` and `"weapon"` are the same tag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the tag is empty after trimming
    /// or longer than 64 characters.
    pub fn new(tag: impl Into<String>) -> Result<Self, DomainError> {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Item type tag cannot be empty"));
        }
        if trimmed.len() > MAX_TAG_LENGTH {
            return Err(DomainError::validation(format!(
                "Item type tag cannot exceed {} characters",
                MAX_TAG_LENGTH
            )));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ItemTypeTag {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ItemTypeTag> for String {
    fn from(tag: ItemTypeTag) -> String {
        tag.0
    }
}

impl std::str::FromStr for ItemTypeTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ============================================================================
// ItemTypeSet
// ============================================================================

/// Accepted item types for a container. Empty means unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTypeSet", into = "Vec<ItemTypeTag>")]
pub struct ItemTypeSet(BTreeSet<ItemTypeTag>);

/// Wire forms accepted for a type set: a list of tags or a legacy CSV string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeSet {
    List(Vec<String>),
    Csv(String),
}

impl ItemTypeSet {
    /// An unrestricted set.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Parse a comma-separated tag list. Blank entries are skipped.
    pub fn parse_csv(csv: &str) -> Result<Self, DomainError> {
        csv.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ItemTypeTag::new)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether an item with the given tag may be placed under this restriction.
    ///
    /// Untagged items only pass an unrestricted set.
    pub fn permits(&self, tag: Option<&ItemTypeTag>) -> bool {
        if self.0.is_empty() {
            return true;
        }
        tag.is_some_and(|t| self.0.contains(t))
    }

    pub fn contains(&self, tag: &ItemTypeTag) -> bool {
        self.0.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemTypeTag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ItemTypeTag> for ItemTypeSet {
    fn from_iter<I: IntoIterator<Item = ItemTypeTag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl TryFrom<RawTypeSet> for ItemTypeSet {
    type Error = DomainError;

    fn try_from(raw: RawTypeSet) -> Result<Self, Self::Error> {
        match raw {
            RawTypeSet::Csv(csv) => Self::parse_csv(&csv),
            RawTypeSet::List(tags) => tags
                .into_iter()
                .map(ItemTypeTag::new)
                .collect::<Result<BTreeSet<_>, _>>()
                .map(Self),
        }
    }
}

impl From<ItemTypeSet> for Vec<ItemTypeTag> {
    fn from(set: ItemTypeSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl fmt::Display for ItemTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.0.iter().map(ItemTypeTag::as_str).collect();
        write!(f, "{}", tags.join(", "))
    }
}
