//! Discovery of the running content test that governs an item.

use content_testing_contract::{
    Item, ItemId, ItemLocator, ItemProvider, ItemQuery, Language, ProviderError, TestDefinition,
    TestDefinitionLoader, TestType, CONTENT_TEST_FIELD, PAGE_LEVEL_TEST_DEFINITION_FIELD,
};
use tracing::{debug, trace};

/// Finds the test definition associated with an item through its test-reference fields.
///
/// Every lookup made here is infrastructure: it reads the latest version with security checks
/// disabled, regardless of the caller's permissions.
pub struct TestDefinitionResolver<'a> {
    provider: &'a dyn ItemProvider,
    loader: &'a dyn TestDefinitionLoader,
}

impl<'a> TestDefinitionResolver<'a> {
    /// Creates a resolver over the canonical item store and the definition loader.
    pub fn new(provider: &'a dyn ItemProvider, loader: &'a dyn TestDefinitionLoader) -> Self {
        Self { provider, loader }
    }

    /// Returns the content test declared for `item`, or `None`.
    ///
    /// Referenced items are read in the request's `language` and `database`. Definitions that
    /// point back at a different item or language, and page-level definitions, are discarded.
    ///
    /// # Errors
    ///
    /// Only store failures are returned; every kind of absence yields `Ok(None)`.
    pub fn resolve(
        &self,
        item: &Item,
        language: &Language,
        database: &str,
    ) -> Result<Option<TestDefinition>, ProviderError> {
        if item.language().is_empty() {
            return Ok(None);
        }

        let definition = if let Some(raw) = item.field(PAGE_LEVEL_TEST_DEFINITION_FIELD) {
            self.fetch_internal(ItemLocator::parse(raw), language, database)?
                .and_then(|definition_item| self.loader.create(&definition_item))
        } else if let Some(raw) = item.field(CONTENT_TEST_FIELD) {
            match self.fetch_internal(ItemLocator::parse(raw), language, database)? {
                Some(member) => match member.parent_id {
                    Some(parent_id) => self.load_parent(parent_id, language, database)?,
                    None => None,
                },
                None => None,
            }
        } else {
            None
        };

        let Some(definition) = definition else {
            return Ok(None);
        };

        if let Some(source) = definition.parse_content_source() {
            if !source.is_same_item_and_language(&item.reference) {
                debug!(
                    item = %item.id(),
                    definition = %definition.id,
                    content_source = %source,
                    "discarding test definition declared for another item or language"
                );
                return Ok(None);
            }
        }

        if definition.test_type == TestType::Page {
            trace!(
                item = %item.id(),
                definition = %definition.id,
                "page-level test handled upstream; ignoring"
            );
            return Ok(None);
        }

        Ok(Some(definition))
    }

    fn load_parent(
        &self,
        parent_id: ItemId,
        language: &Language,
        database: &str,
    ) -> Result<Option<TestDefinition>, ProviderError> {
        Ok(self
            .fetch_internal(ItemLocator::Id(parent_id), language, database)?
            .and_then(|parent| self.loader.create(&parent)))
    }

    fn fetch_internal(
        &self,
        locator: ItemLocator,
        language: &Language,
        database: &str,
    ) -> Result<Option<Item>, ProviderError> {
        self.provider
            .get_item(&ItemQuery::latest_unchecked(locator, language, database))
    }
}
