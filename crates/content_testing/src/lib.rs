//! Content-test version resolution for versioned content items.
//!
//! For a requested item this crate decides whether a running content test governs it and, if
//! so, which materialized version the request should see instead of the latest one. The
//! decision is computed at most once per item per request and memoized in a
//! [`RequestDecisionCache`] that lives exactly as long as the request.
//!
//! [`ResolutionOrchestrator`] is the entry point; [`TestDefinitionResolver`] and
//! [`VariantSelector`] hold the two lookup algorithms it drives.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod resolver;
pub mod selector;

pub use cache::{
    decision_cache_key, CacheKey, DecisionCache, NoopDecisionCache, RequestDecisionCache,
};
pub use config::{ContentTestingSettings, SettingsLoader, DEFAULT_SHELL_SITE_NAME};
pub use error::{ConfigError, ContentTestingError};
pub use orchestrator::{
    PageMode, PassThroughReason, ResolutionOrchestrator, ResolutionPath, ResolveOutcome,
    ResolveRequest, SiteContext,
};
pub use resolver::TestDefinitionResolver;
pub use selector::{pick_exposed_version, VariantSelector};
