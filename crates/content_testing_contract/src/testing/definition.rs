//! Content-test definition views and the per-request redirect decision.

use serde::{Deserialize, Serialize};

use crate::item::{data_uri::DataUri, types::ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Kind of content test.
pub enum TestType {
    /// Whole-page test; substitution for it is handled upstream.
    Page,
    /// Content-version test on a single item.
    Content,
    /// Component (rendering/datasource) test.
    Component,
    /// Personalization test.
    Personalization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One configured variable of a test with the raw data sources of its values.
pub struct TestVariable {
    /// Variable item identifier.
    pub id: ItemId,
    /// Raw data-source strings, one per variable value.
    pub data_sources: Vec<String>,
}

impl TestVariable {
    /// Expands the variable into the versioned data URIs it proposes.
    ///
    /// Unparseable values and values without a version are skipped.
    pub fn content_test_data_sources(&self) -> Vec<DataUri> {
        self.data_sources
            .iter()
            .filter_map(|raw| DataUri::parse(raw))
            .filter(|uri| uri.version.is_some())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Read-only view over an item that defines a content test.
pub struct TestDefinition {
    /// Definition item identifier.
    pub id: ItemId,
    /// Whether the test is currently running.
    pub is_running: bool,
    /// Kind of test.
    pub test_type: TestType,
    /// Configured variables in definition order.
    pub variables: Vec<TestVariable>,
    /// Raw data URI of the item the test is declared against.
    pub content_source: Option<String>,
}

impl TestDefinition {
    /// Parses [`TestDefinition::content_source`].
    pub fn parse_content_source(&self) -> Option<DataUri> {
        self.content_source.as_deref().and_then(DataUri::parse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Memoized answer to "which version of this item should the request see".
pub struct RedirectDecision {
    /// Whether the item should be replaced.
    pub redirect: bool,
    /// Version to serve instead, set only when redirecting.
    pub version: Option<u32>,
}

impl RedirectDecision {
    /// Decision to serve `version` instead of the requested latest version.
    pub fn redirect_to(version: u32) -> Self {
        Self {
            redirect: true,
            version: Some(version),
        }
    }

    /// Decision to serve the item as requested.
    pub fn no_redirect() -> Self {
        Self {
            redirect: false,
            version: None,
        }
    }

    /// Returns the version to fetch when this decision redirects.
    pub fn target_version(&self) -> Option<u32> {
        if self.redirect {
            self.version
        } else {
            None
        }
    }
}
