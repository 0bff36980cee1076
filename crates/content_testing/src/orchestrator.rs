//! Entry point that applies content-test version substitution to one item request.
//!
//! A request moves through these states:
//!
//! 1. gate checks, any of which ends in [`ResolutionPath::PassThrough`];
//! 2. cache lookup, ending in [`ResolutionPath::CacheHit`] when a decision is memoized;
//! 3. resolution on a miss, ending in [`ResolutionPath::Decided`] or, when a running test has no
//!    usable version, [`ResolutionPath::Undecided`] (never cached);
//! 4. substitution: a redirecting decision replaces the item with the target version.

use content_testing_contract::{
    Item, ItemLocator, ItemProvider, ItemQuery, Language, RedirectDecision, SecurityCheck,
    TestDefinitionLoader, VersionSpec,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    cache::DecisionCache,
    config::{ContentTestingSettings, SettingsLoader},
    error::ContentTestingError,
    resolver::TestDefinitionResolver,
    selector::VariantSelector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
/// Rendering mode of the page being served.
pub enum PageMode {
    /// Regular visitor rendering.
    #[default]
    Normal,
    /// Authoring preview.
    Preview,
    /// Inline editing.
    Edit,
    /// Debug rendering.
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Site the request is served under.
pub struct SiteContext {
    /// Site name.
    pub name: String,
    /// Page rendering mode.
    pub page_mode: PageMode,
}

/// Immutable input for one item request.
pub struct ResolveRequest<'a> {
    /// Item already resolved by an earlier stage, if any.
    pub result: Option<Item>,
    /// Requested id or path.
    pub locator: ItemLocator,
    /// Requested language.
    pub language: Language,
    /// Requested version.
    pub version: VersionSpec,
    /// Requested database.
    pub database: String,
    /// Caller's permission mode.
    pub security: SecurityCheck,
    /// Whether an earlier stage already handled the request.
    pub handled: bool,
    /// Site context, absent for requests outside any site.
    pub site: Option<SiteContext>,
    /// Canonical item store used for every fetch.
    pub fallback: &'a dyn ItemProvider,
}

impl<'a> ResolveRequest<'a> {
    /// Builds a latest-version request with caller security and no site context.
    pub fn new(
        locator: ItemLocator,
        language: Language,
        database: impl Into<String>,
        fallback: &'a dyn ItemProvider,
    ) -> Self {
        Self {
            result: None,
            locator,
            language,
            version: VersionSpec::Latest,
            database: database.into(),
            security: SecurityCheck::Enabled,
            handled: false,
            site: None,
            fallback,
        }
    }

    fn item_query(&self) -> ItemQuery {
        ItemQuery {
            locator: self.locator.clone(),
            language: self.language.clone(),
            version: self.version,
            database: self.database.clone(),
            security: self.security,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Why a request skipped content-test resolution.
pub enum PassThroughReason {
    /// Automatic content testing is switched off.
    TestingDisabled,
    /// An earlier stage already handled the request.
    AlreadyHandled,
    /// No item could be resolved.
    ItemNotFound,
    /// The request targets the administrative shell site.
    ShellSite,
    /// The page is not rendered in normal mode.
    NonNormalPageMode,
    /// The caller pinned an explicit version.
    ExplicitVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// State a request finished in.
pub enum ResolutionPath {
    /// Resolution was skipped.
    PassThrough(PassThroughReason),
    /// A memoized decision was reused.
    CacheHit(RedirectDecision),
    /// A decision was computed on this call.
    Decided(RedirectDecision),
    /// A running test was found but exposed no usable version.
    Undecided,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result handed back to the calling pipeline.
pub struct ResolveOutcome {
    /// Item to serve; `None` when nothing could be served.
    pub item: Option<Item>,
    /// How the request was resolved.
    pub path: ResolutionPath,
}

impl ResolveOutcome {
    fn pass_through(item: Option<Item>, reason: PassThroughReason) -> Self {
        debug!(?reason, "content test resolution skipped");
        Self {
            item,
            path: ResolutionPath::PassThrough(reason),
        }
    }

    /// Returns the decision applied to this request, if one was reached.
    pub fn decision(&self) -> Option<RedirectDecision> {
        match self.path {
            ResolutionPath::CacheHit(decision) | ResolutionPath::Decided(decision) => {
                Some(decision)
            }
            ResolutionPath::PassThrough(_) | ResolutionPath::Undecided => None,
        }
    }

    /// Returns `true` when the served item was substituted by a test variant.
    pub fn redirected(&self) -> bool {
        self.decision().is_some_and(|decision| decision.redirect)
    }
}

/// Applies content-test version substitution to item requests.
///
/// Settings are captured at construction and never re-read. One orchestrator serves many
/// requests; each request brings its own [`DecisionCache`].
pub struct ResolutionOrchestrator<L> {
    settings: ContentTestingSettings,
    loader: L,
}

impl<L: TestDefinitionLoader> ResolutionOrchestrator<L> {
    /// Creates an orchestrator with fixed `settings` and a test-definition `loader`.
    pub fn new(settings: ContentTestingSettings, loader: L) -> Self {
        Self { settings, loader }
    }

    /// Creates an orchestrator from the settings file behind `settings_loader`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentTestingError::Config`] when the file cannot be read or parsed.
    pub fn from_settings_file(
        settings_loader: &SettingsLoader,
        loader: L,
    ) -> Result<Self, ContentTestingError> {
        let settings = settings_loader.load()?;
        debug!(
            path = %settings_loader.path().display(),
            enabled = settings.automatic_testing_enabled,
            allow_cache = settings.allow_cache,
            "loaded content testing settings"
        );
        Ok(Self::new(settings, loader))
    }

    /// Returns the captured settings.
    pub fn settings(&self) -> &ContentTestingSettings {
        &self.settings
    }

    /// Resolves the item for `request`, substituting a test variant when one applies.
    ///
    /// `cache` is consulted and written only when caching is allowed.
    ///
    /// # Errors
    ///
    /// Store failures propagate unchanged. Missing tests, fields, parents, or versions are not
    /// errors; the requested item is served instead.
    pub fn resolve(
        &self,
        request: &ResolveRequest<'_>,
        cache: &dyn DecisionCache,
    ) -> Result<ResolveOutcome, ContentTestingError> {
        if !self.settings.automatic_testing_enabled {
            return Ok(ResolveOutcome::pass_through(
                request.result.clone(),
                PassThroughReason::TestingDisabled,
            ));
        }
        if request.handled {
            return Ok(ResolveOutcome::pass_through(
                request.result.clone(),
                PassThroughReason::AlreadyHandled,
            ));
        }

        let item = match &request.result {
            Some(item) => Some(item.clone()),
            None => request.fallback.get_item(&request.item_query())?,
        };
        let Some(item) = item else {
            return Ok(ResolveOutcome::pass_through(
                None,
                PassThroughReason::ItemNotFound,
            ));
        };
        if let Some(reason) = self.gate(request) {
            return Ok(ResolveOutcome::pass_through(Some(item), reason));
        }

        let key = self
            .settings
            .allow_cache
            .then(|| cache.generate_key(&item.reference));
        let (decision, path) = match key.as_ref().and_then(|key| cache.get(key)) {
            Some(decision) => {
                trace!(item = %item.id(), ?decision, "decision cache hit");
                (Some(decision), ResolutionPath::CacheHit(decision))
            }
            None => {
                let decision = self.decide(request, &item)?;
                if let (Some(key), Some(decision)) = (&key, decision) {
                    cache.put(key, decision);
                }
                let path = decision.map_or(ResolutionPath::Undecided, ResolutionPath::Decided);
                (decision, path)
            }
        };

        let Some(version) = decision.and_then(|decision| decision.target_version()) else {
            return Ok(ResolveOutcome {
                item: Some(item),
                path,
            });
        };

        debug!(item = %item.id(), version, "serving content test variant");
        let variant = request.fallback.get_item(&ItemQuery {
            locator: ItemLocator::Id(item.reference.id.clone()),
            language: item.reference.language.clone(),
            version: VersionSpec::Number(version),
            database: item.reference.database.clone(),
            security: request.security,
        })?;
        Ok(ResolveOutcome {
            item: variant,
            path,
        })
    }

    fn gate(&self, request: &ResolveRequest<'_>) -> Option<PassThroughReason> {
        if let Some(site) = &request.site {
            if site.name == self.settings.shell_site_name {
                return Some(PassThroughReason::ShellSite);
            }
            if site.page_mode != PageMode::Normal {
                return Some(PassThroughReason::NonNormalPageMode);
            }
        }
        if !request.version.is_latest() {
            return Some(PassThroughReason::ExplicitVersion);
        }
        None
    }

    fn decide(
        &self,
        request: &ResolveRequest<'_>,
        item: &Item,
    ) -> Result<Option<RedirectDecision>, ContentTestingError> {
        let resolver = TestDefinitionResolver::new(request.fallback, &self.loader);
        let test = resolver.resolve(item, &request.language, &request.database)?;
        let Some(test) = test.filter(|test| test.is_running) else {
            return Ok(Some(RedirectDecision::no_redirect()));
        };

        let version =
            VariantSelector::new(request.fallback).select_version(&item.reference, &test)?;
        if version.is_none() {
            debug!(
                item = %item.id(),
                test = %test.id,
                "running test exposes no materialized version; leaving undecided"
            );
        }
        Ok(version.map(RedirectDecision::redirect_to))
    }
}
