//! Test-definition loader contract and adapters.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::definition::{TestDefinition, TestType, TestVariable};
use crate::item::types::{Item, ItemId};

/// Field holding the running flag of a test definition (`1`/`true` means running).
pub const TEST_IS_RUNNING_FIELD: &str = "Is Running";
/// Field holding the test type (`page`, `content`, `component`, or `personalization`).
pub const TEST_TYPE_FIELD: &str = "Test Type";
/// Field holding the data URI of the item the test is declared against.
pub const TEST_CONTENT_ITEM_FIELD: &str = "Content Item";
/// Field listing the configured variables, one `{variable-id}=source|source` entry per line.
pub const TEST_VARIABLES_FIELD: &str = "Page Level Test Variables";

/// Builds a [`TestDefinition`] view over an item that represents one.
pub trait TestDefinitionLoader {
    /// Returns the definition backed by `item`, or `None` when the item is not a test
    /// definition.
    fn create(&self, item: &Item) -> Option<TestDefinition>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Loader for hosts without content testing; never yields a definition.
pub struct NoopTestDefinitionLoader;

impl TestDefinitionLoader for NoopTestDefinitionLoader {
    fn create(&self, _item: &Item) -> Option<TestDefinition> {
        None
    }
}

#[derive(Debug, Clone, Default)]
/// In-memory loader keyed by definition item id.
pub struct MemoryTestDefinitionLoader {
    inner: Rc<RefCell<HashMap<ItemId, TestDefinition>>>,
}

impl MemoryTestDefinitionLoader {
    /// Registers `definition` under its own id, replacing any previous one.
    pub fn register(&self, definition: TestDefinition) {
        self.inner
            .borrow_mut()
            .insert(definition.id.clone(), definition);
    }
}

impl TestDefinitionLoader for MemoryTestDefinitionLoader {
    fn create(&self, item: &Item) -> Option<TestDefinition> {
        self.inner.borrow().get(item.id()).cloned()
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Loader that reads a definition straight from the item's fields.
///
/// An item without a recognized [`TEST_TYPE_FIELD`] is not a test definition.
pub struct FieldTestDefinitionLoader;

fn parse_test_type(raw: &str) -> Option<TestType> {
    match raw.to_ascii_lowercase().as_str() {
        "page" => Some(TestType::Page),
        "content" => Some(TestType::Content),
        "component" => Some(TestType::Component),
        "personalization" => Some(TestType::Personalization),
        _ => None,
    }
}

fn parse_variables(raw: &str) -> Vec<TestVariable> {
    raw.lines()
        .filter_map(|line| line.split_once('='))
        .filter(|(id, _)| !id.trim().is_empty())
        .map(|(id, sources)| TestVariable {
            id: ItemId::new(id),
            data_sources: sources
                .split('|')
                .map(str::trim)
                .filter(|source| !source.is_empty())
                .map(str::to_string)
                .collect(),
        })
        .collect()
}

impl TestDefinitionLoader for FieldTestDefinitionLoader {
    fn create(&self, item: &Item) -> Option<TestDefinition> {
        let test_type = item.field(TEST_TYPE_FIELD).and_then(parse_test_type)?;
        let is_running = item
            .field(TEST_IS_RUNNING_FIELD)
            .is_some_and(|flag| flag == "1" || flag.eq_ignore_ascii_case("true"));

        Some(TestDefinition {
            id: item.id().clone(),
            is_running,
            test_type,
            variables: item
                .field(TEST_VARIABLES_FIELD)
                .map(parse_variables)
                .unwrap_or_default(),
            content_source: item.field(TEST_CONTENT_ITEM_FIELD).map(str::to_string),
        })
    }
}
