//! Display catalog mapping model labels to display assets
//!
//! The catalog is built once and is read-only afterwards. Lookups are
//! case-insensitive and ignore surrounding whitespace. A label without a
//! matching entry resolves to the first entry in catalog order, or to a
//! generic placeholder when the catalog is empty.

use crate::error::{CatalogError, CatalogResult};
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;

/// Localized name used when the catalog has no entries at all
pub const PLACEHOLDER_NAME_LOCALIZED: &str = "동물";

/// Canonical name used when the catalog has no entries at all
pub const PLACEHOLDER_NAME_CANONICAL: &str = "Animal";

/// Lookup form of a label: trimmed and lowercased.
pub fn normalize_key(label: &str) -> String {
    label.trim().to_lowercase()
}

#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq, Eq)]
pub struct DisplayEntry {
    /// Label key, stored normalized
    pub key: String,
    /// Image reference rendered on the result card
    pub asset: String,
    pub name_localized: String,
    pub name_canonical: String,
}

impl DisplayEntry {
    pub fn new(
        key: impl Into<String>,
        asset: impl Into<String>,
        name_localized: impl Into<String>,
        name_canonical: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            asset: asset.into(),
            name_localized: name_localized.into(),
            name_canonical: name_canonical.into(),
        }
    }

    /// Generic entry with no asset, used when there is nothing to fall back to
    pub fn placeholder() -> Self {
        Self::new(
            "",
            "",
            PLACEHOLDER_NAME_LOCALIZED,
            PLACEHOLDER_NAME_CANONICAL,
        )
    }
}

/// On-disk layout shared by the TOML and JSON catalog formats
#[derive(Serialize, Deserialize)]
struct CatalogFile<'a> {
    #[serde(default)]
    entries: Cow<'a, [DisplayEntry]>,
}

/// How a label was resolved against the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The label matched an entry
    Exact(&'a DisplayEntry),
    /// The label had no entry; the catalog's first entry stands in
    Fallback(&'a DisplayEntry),
    /// The label had no entry and the catalog is empty
    Placeholder,
}

impl<'a> Resolution<'a> {
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Resolution::Exact(_))
    }

    pub fn entry(&self) -> Cow<'a, DisplayEntry> {
        match self {
            Resolution::Exact(entry) | Resolution::Fallback(entry) => Cow::Borrowed(*entry),
            Resolution::Placeholder => Cow::Owned(DisplayEntry::placeholder()),
        }
    }
}

/// Ordered, read-only table of display entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<DisplayEntry>,
    index: AHashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, normalizing every key.
    ///
    /// Fails on blank keys and on keys that collide after normalization.
    pub fn new(entries: impl IntoIterator<Item = DisplayEntry>) -> CatalogResult<Self> {
        let mut catalog = Self::default();
        for (idx, mut entry) in entries.into_iter().enumerate() {
            entry.key = normalize_key(&entry.key);
            if entry.key.is_empty() {
                return Err(CatalogError::EmptyKey { index: idx });
            }
            if catalog.index.contains_key(&entry.key) {
                return Err(CatalogError::DuplicateKey { key: entry.key });
            }
            catalog.push(entry);
        }
        Ok(catalog)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The animal table the upload widget ships with
    pub fn builtin() -> Self {
        let mut catalog = Self::default();
        for (key, localized, canonical) in [
            ("rabbit", "토끼", "Rabbit"),
            ("dog", "강아지", "Dog"),
            ("cat", "고양이", "Cat"),
            ("fox", "여우", "Fox"),
            ("tiger", "호랑이", "Tiger"),
        ] {
            catalog.push(DisplayEntry::new(
                key,
                format!("assets/character-{key}.png"),
                localized,
                canonical,
            ));
        }
        catalog
    }

    fn push(&mut self, entry: DisplayEntry) {
        self.index.insert(entry.key.clone(), self.entries.len());
        self.entries.push(entry);
    }

    pub fn from_toml(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.entries.into_owned())
    }

    pub fn from_json(content: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::new(file.entries.into_owned())
    }

    /// Load from a file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let catalog = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };
        tracing::debug!(
            "Loaded catalog with {} entries from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&CatalogFile {
            entries: Cow::Borrowed(&self.entries),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&CatalogFile {
            entries: Cow::Borrowed(&self.entries),
        })
    }

    pub fn get(&self, label: &str) -> Option<&DisplayEntry> {
        self.index
            .get(&normalize_key(label))
            .map(|&idx| &self.entries[idx])
    }

    /// Entry substituted for unknown labels
    pub fn fallback(&self) -> Option<&DisplayEntry> {
        self.entries.first()
    }

    pub fn resolve(&self, label: &str) -> Resolution<'_> {
        match (self.get(label), self.fallback()) {
            (Some(entry), _) => Resolution::Exact(entry),
            (None, Some(entry)) => Resolution::Fallback(entry),
            (None, None) => Resolution::Placeholder,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
