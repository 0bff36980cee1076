//! Typed content-item and content-test contracts shared by the version-resolution core.
//!
//! This crate is the API-first boundary for the collaborators the resolver consumes: the
//! versioned item store ([`ItemProvider`]) and the test-definition model
//! ([`TestDefinitionLoader`]). Concrete storage backends live with the host; the `Noop*` and
//! `Memory*` adapters here serve unsupported hosts and tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod item;
pub mod testing;

pub use item::data_uri::DataUri;
pub use item::provider::{ItemProvider, MemoryItemProvider, NoopItemProvider, ProviderError};
pub use item::types::{
    Item, ItemId, ItemLocator, ItemQuery, Language, ResourceRef, SecurityCheck, VersionSpec,
    CONTENT_TEST_FIELD, PAGE_LEVEL_TEST_DEFINITION_FIELD,
};
pub use testing::definition::{RedirectDecision, TestDefinition, TestType, TestVariable};
pub use testing::loader::{
    FieldTestDefinitionLoader, MemoryTestDefinitionLoader, NoopTestDefinitionLoader,
    TestDefinitionLoader, TEST_CONTENT_ITEM_FIELD, TEST_IS_RUNNING_FIELD, TEST_TYPE_FIELD,
    TEST_VARIABLES_FIELD,
};
