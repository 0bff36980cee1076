//! Versioned item store contract and adapters.

use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap, HashSet},
    rc::Rc,
};

use thiserror::Error;

use super::types::{
    Item, ItemId, ItemLocator, ItemQuery, Language, ResourceRef, SecurityCheck, VersionSpec,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures reported by an [`ItemProvider`]. Absence is not a failure.
pub enum ProviderError {
    /// The store cannot serve the operation at all.
    #[error("item provider unavailable: {operation}")]
    Unavailable {
        /// Operation that was attempted.
        operation: String,
    },
    /// The backing store reported an error.
    #[error("item provider backend error: {0}")]
    Backend(String),
}

/// Canonical, non-test-aware item store used for every fetch the resolver performs.
pub trait ItemProvider {
    /// Fetches one item version, or `None` when it does not exist or is not readable under
    /// `query.security`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the store itself fails.
    fn get_item(&self, query: &ItemQuery) -> Result<Option<Item>, ProviderError>;

    /// Lists the materialized version numbers of `item` in `language`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the store itself fails.
    fn get_versions(
        &self,
        item: &ResourceRef,
        language: &Language,
    ) -> Result<Vec<u32>, ProviderError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op item store for hosts without content storage and baseline tests.
pub struct NoopItemProvider;

impl ItemProvider for NoopItemProvider {
    fn get_item(&self, _query: &ItemQuery) -> Result<Option<Item>, ProviderError> {
        Ok(None)
    }

    fn get_versions(
        &self,
        _item: &ResourceRef,
        _language: &Language,
    ) -> Result<Vec<u32>, ProviderError> {
        Ok(Vec::new())
    }
}

type VersionKey = (String, ItemId, String);

#[derive(Debug, Default)]
struct MemoryItemState {
    versions: HashMap<VersionKey, BTreeMap<u32, Item>>,
    paths: HashMap<String, ItemId>,
    restricted: HashSet<ItemId>,
    failure: Option<ProviderError>,
}

#[derive(Debug, Clone, Default)]
/// In-memory item store keyed by `(database, id, language)` with per-version entries.
///
/// Restricted items are hidden from [`SecurityCheck::Enabled`] fetches, and call counters
/// expose how often each operation ran.
pub struct MemoryItemProvider {
    inner: Rc<RefCell<MemoryItemState>>,
    item_calls: Rc<Cell<usize>>,
    version_calls: Rc<Cell<usize>>,
}

impl MemoryItemProvider {
    /// Stores an item version, indexing its path when present.
    pub fn insert(&self, item: Item) {
        let mut state = self.inner.borrow_mut();
        let reference = &item.reference;
        if let Some(path) = &reference.path {
            state
                .paths
                .insert(path.to_ascii_lowercase(), reference.id.clone());
        }
        let key = version_key(&reference.database, &reference.id, &reference.language);
        let version = reference.version;
        state.versions.entry(key).or_default().insert(version, item);
    }

    /// Hides `id` from fetches that respect caller permissions.
    pub fn restrict(&self, id: ItemId) {
        self.inner.borrow_mut().restricted.insert(id);
    }

    /// Makes every subsequent call fail with `error`.
    pub fn fail_with(&self, error: ProviderError) {
        self.inner.borrow_mut().failure = Some(error);
    }

    /// Number of [`ItemProvider::get_item`] calls served so far.
    pub fn item_calls(&self) -> usize {
        self.item_calls.get()
    }

    /// Number of [`ItemProvider::get_versions`] calls served so far.
    pub fn version_calls(&self) -> usize {
        self.version_calls.get()
    }

    fn check_failure(&self) -> Result<(), ProviderError> {
        match &self.inner.borrow().failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

fn version_key(database: &str, id: &ItemId, language: &Language) -> VersionKey {
    (
        database.to_ascii_lowercase(),
        id.clone(),
        language.name().to_ascii_lowercase(),
    )
}

impl ItemProvider for MemoryItemProvider {
    fn get_item(&self, query: &ItemQuery) -> Result<Option<Item>, ProviderError> {
        self.item_calls.set(self.item_calls.get() + 1);
        self.check_failure()?;

        let state = self.inner.borrow();
        let id = match &query.locator {
            ItemLocator::Id(id) => id.clone(),
            ItemLocator::Path(path) => match state.paths.get(&path.to_ascii_lowercase()) {
                Some(id) => id.clone(),
                None => return Ok(None),
            },
        };
        if query.security == SecurityCheck::Enabled && state.restricted.contains(&id) {
            return Ok(None);
        }

        let Some(versions) = state
            .versions
            .get(&version_key(&query.database, &id, &query.language))
        else {
            return Ok(None);
        };
        let found = match query.version {
            VersionSpec::Latest => versions.values().next_back(),
            VersionSpec::Number(number) => versions.get(&number),
        };
        Ok(found.cloned())
    }

    fn get_versions(
        &self,
        item: &ResourceRef,
        language: &Language,
    ) -> Result<Vec<u32>, ProviderError> {
        self.version_calls.set(self.version_calls.get() + 1);
        self.check_failure()?;

        Ok(self
            .inner
            .borrow()
            .versions
            .get(&version_key(&item.database, &item.id, language))
            .map(|versions| versions.keys().copied().collect())
            .unwrap_or_default())
    }
}
