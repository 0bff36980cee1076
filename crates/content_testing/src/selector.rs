//! Selection of the item version a running test exposes.

use content_testing_contract::{DataUri, ItemProvider, ProviderError, ResourceRef, TestDefinition};
use tracing::trace;

/// Picks the lowest candidate version that is still materialized.
///
/// Candidates pointing at removed versions are ignored; `None` means no candidate survives.
pub fn pick_exposed_version(candidates: &[DataUri], existing_versions: &[u32]) -> Option<u32> {
    candidates
        .iter()
        .filter_map(|uri| uri.version)
        .filter(|version| existing_versions.contains(version))
        .min()
}

/// Computes which version of an item a running test should expose.
pub struct VariantSelector<'a> {
    provider: &'a dyn ItemProvider,
}

impl<'a> VariantSelector<'a> {
    /// Creates a selector over the canonical item store.
    pub fn new(provider: &'a dyn ItemProvider) -> Self {
        Self { provider }
    }

    /// Returns the version of `item` to expose for `test`, or `None` when nothing applies.
    ///
    /// Only the first configured variable is considered. Callers invoke this for running
    /// tests only.
    ///
    /// # Errors
    ///
    /// Returns the store failure when listing versions fails.
    pub fn select_version(
        &self,
        item: &ResourceRef,
        test: &TestDefinition,
    ) -> Result<Option<u32>, ProviderError> {
        let Some(variable) = test.variables.first() else {
            return Ok(None);
        };

        let candidates = variable.content_test_data_sources();
        let existing = self.provider.get_versions(item, &item.language)?;
        let selected = pick_exposed_version(&candidates, &existing);
        trace!(
            item = %item.id,
            test = %test.id,
            candidates = candidates.len(),
            existing = ?existing,
            selected = ?selected,
            "selected exposed version"
        );
        Ok(selected)
    }
}
