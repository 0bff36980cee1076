//! Request-scoped memoization of redirect decisions.

use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use content_testing_contract::{RedirectDecision, ResourceRef};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Cache key for one logical item (id and language, never version).
pub struct CacheKey(String);

impl CacheKey {
    /// Returns the key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the decision key for `reference`.
///
/// The version is deliberately excluded so a lookup made before the version is known lands in
/// the same bucket as the stored decision.
pub fn decision_cache_key(reference: &ResourceRef) -> CacheKey {
    CacheKey(format!(
        "version-redirect:{}:{}",
        reference.id.as_str(),
        reference.language.name().to_ascii_lowercase()
    ))
}

/// Store for redirect decisions scoped to a single request.
pub trait DecisionCache {
    /// Derives the key for `reference`.
    fn generate_key(&self, reference: &ResourceRef) -> CacheKey {
        decision_cache_key(reference)
    }

    /// Returns the memoized decision for `key`.
    fn get(&self, key: &CacheKey) -> Option<RedirectDecision>;

    /// Memoizes `decision` under `key`. The first decision stored for a key wins.
    fn put(&self, key: &CacheKey, decision: RedirectDecision);
}

#[derive(Debug, Clone, Copy, Default)]
/// Pass-through cache: every lookup misses and every store is dropped.
pub struct NoopDecisionCache;

impl DecisionCache for NoopDecisionCache {
    fn get(&self, _key: &CacheKey) -> Option<RedirectDecision> {
        None
    }

    fn put(&self, _key: &CacheKey, _decision: RedirectDecision) {}
}

#[derive(Debug, Clone, Default)]
/// Per-request decision cache.
///
/// Create one at request start and drop it at request end. The handle is `!Send`, so one
/// request's decisions can never leak into another request running on a different thread.
pub struct RequestDecisionCache {
    inner: Rc<RefCell<HashMap<CacheKey, RedirectDecision>>>,
}

impl RequestDecisionCache {
    /// Creates an empty cache for a new request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized decisions.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` when nothing has been memoized.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl DecisionCache for RequestDecisionCache {
    fn get(&self, key: &CacheKey) -> Option<RedirectDecision> {
        self.inner.borrow().get(key).copied()
    }

    fn put(&self, key: &CacheKey, decision: RedirectDecision) {
        self.inner
            .borrow_mut()
            .entry(key.clone())
            .or_insert(decision);
    }
}
