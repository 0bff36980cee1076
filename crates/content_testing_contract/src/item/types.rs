//! Item identity, request, and field types shared across the store contract and the resolver.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Field holding the id or path of a page-level test definition item.
pub const PAGE_LEVEL_TEST_DEFINITION_FIELD: &str = "__Page Level Test Definition";
/// Field holding the id or path of a content-test member item.
pub const CONTENT_TEST_FIELD: &str = "__Content Test";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
/// Normalized item identifier.
///
/// Identifiers are compared without surrounding braces and case-insensitively, so
/// `{ab-12}` and `AB-12` denote the same item.
pub struct ItemId(String);

impl ItemId {
    /// Builds a normalized identifier from raw text.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        let inner = trimmed
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
            .unwrap_or(trimmed);
        Self(inner.trim().to_ascii_uppercase())
    }

    /// Returns the normalized identifier text without braces.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
/// Content language name such as `en` or `da-DK`. An empty name means "unresolved".
pub struct Language(String);

impl Language {
    /// Builds a language from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// Returns the language name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Returns `true` when no language has been resolved.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares language names case-insensitively.
    pub fn matches(&self, other: &Language) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
/// Version requested from the item store.
pub enum VersionSpec {
    /// Newest materialized version.
    #[default]
    Latest,
    /// An explicit version number.
    Number(u32),
}

impl VersionSpec {
    /// Returns `true` for [`VersionSpec::Latest`].
    pub fn is_latest(self) -> bool {
        matches!(self, Self::Latest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Permission mode for an item fetch.
pub enum SecurityCheck {
    /// Respect the caller's permissions.
    Enabled,
    /// Internal lookup that ignores the caller's permissions.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Item address accepted by the store: an id or a content path.
pub enum ItemLocator {
    /// Address by identifier.
    Id(ItemId),
    /// Address by content path (for example `/sitecore/content/home`).
    Path(String),
}

impl ItemLocator {
    /// Interprets a raw reference-field value: values starting with `/` are paths, anything
    /// else is an identifier.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('/') {
            Self::Path(trimmed.to_string())
        } else {
            Self::Id(ItemId::new(trimmed))
        }
    }
}

impl fmt::Display for ItemLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Full argument set for a single [`ItemProvider::get_item`](crate::ItemProvider::get_item) call.
pub struct ItemQuery {
    /// Item address.
    pub locator: ItemLocator,
    /// Content language.
    pub language: Language,
    /// Requested version.
    pub version: VersionSpec,
    /// Database/partition name.
    pub database: String,
    /// Permission mode.
    pub security: SecurityCheck,
}

impl ItemQuery {
    /// Builds an internal lookup for the latest version with security checks disabled.
    pub fn latest_unchecked(
        locator: ItemLocator,
        language: &Language,
        database: impl Into<String>,
    ) -> Self {
        Self {
            locator,
            language: language.clone(),
            version: VersionSpec::Latest,
            database: database.into(),
            security: SecurityCheck::Disabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identity of one materialized item version.
pub struct ResourceRef {
    /// Item identifier.
    pub id: ItemId,
    /// Content path, when known.
    pub path: Option<String>,
    /// Content language.
    pub language: Language,
    /// Materialized version number.
    pub version: u32,
    /// Database/partition the item was read from.
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One item version as returned by the store, with its raw field values.
pub struct Item {
    /// Identity of this version.
    pub reference: ResourceRef,
    /// Parent item identifier, if the item is not a root.
    pub parent_id: Option<ItemId>,
    /// Raw field values keyed by field name.
    pub fields: BTreeMap<String, String>,
}

impl Item {
    /// Creates an item with no parent and no fields.
    pub fn new(
        id: ItemId,
        language: Language,
        version: u32,
        database: impl Into<String>,
    ) -> Self {
        Self {
            reference: ResourceRef {
                id,
                path: None,
                language,
                version,
                database: database.into(),
            },
            parent_id: None,
            fields: BTreeMap::new(),
        }
    }

    /// Sets the content path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.reference.path = Some(path.into());
        self
    }

    /// Sets the parent item.
    pub fn with_parent(mut self, parent_id: ItemId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Sets a raw field value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the item identifier.
    pub fn id(&self) -> &ItemId {
        &self.reference.id
    }

    /// Returns the item language.
    pub fn language(&self) -> &Language {
        &self.reference.language
    }

    /// Returns the trimmed value of `name`, or `None` when the field is missing or blank.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }
}
