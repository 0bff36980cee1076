use std::cell::Cell;

use content_testing::{
    CacheKey, ContentTestingSettings, DecisionCache, PassThroughReason, RequestDecisionCache,
    ResolutionOrchestrator, ResolutionPath, ResolveRequest,
};
use content_testing_contract::{
    FieldTestDefinitionLoader, Item, ItemId, ItemLocator, Language, MemoryItemProvider,
    MemoryTestDefinitionLoader, RedirectDecision, TestDefinition, TestType, TestVariable,
    VersionSpec, CONTENT_TEST_FIELD, PAGE_LEVEL_TEST_DEFINITION_FIELD, TEST_CONTENT_ITEM_FIELD,
    TEST_IS_RUNNING_FIELD, TEST_TYPE_FIELD, TEST_VARIABLES_FIELD,
};
use pretty_assertions::assert_eq;

const DB: &str = "web";

fn en() -> Language {
    Language::new("en")
}

/// Cache wrapper that counts every call it receives.
#[derive(Default)]
struct RecordingCache {
    inner: RequestDecisionCache,
    gets: Cell<usize>,
    puts: Cell<usize>,
}

impl DecisionCache for RecordingCache {
    fn get(&self, key: &CacheKey) -> Option<RedirectDecision> {
        self.gets.set(self.gets.get() + 1);
        self.inner.get(key)
    }

    fn put(&self, key: &CacheKey, decision: RedirectDecision) {
        self.puts.set(self.puts.get() + 1);
        self.inner.put(key, decision);
    }
}

/// Item R with versions 1..=3 whose content-test field points at member X under definition T.
fn content_test_store(
    is_running: bool,
    proposed: &[u32],
) -> (MemoryItemProvider, MemoryTestDefinitionLoader) {
    let provider = MemoryItemProvider::default();
    for version in 1..=3 {
        provider.insert(
            Item::new(ItemId::new("R"), en(), version, DB)
                .with_path("/sitecore/content/home/r")
                .with_field(CONTENT_TEST_FIELD, "{X}"),
        );
    }
    provider.insert(Item::new(ItemId::new("X"), en(), 1, DB).with_parent(ItemId::new("T")));
    provider.insert(Item::new(ItemId::new("T"), en(), 1, DB));

    let loader = MemoryTestDefinitionLoader::default();
    loader.register(TestDefinition {
        id: ItemId::new("T"),
        is_running,
        test_type: TestType::Content,
        variables: vec![TestVariable {
            id: ItemId::new("T-variable"),
            data_sources: proposed
                .iter()
                .map(|version| format!("sitecore://web/{{R}}?lang=en&ver={version}"))
                .collect(),
        }],
        content_source: Some("sitecore://web/{R}?lang=en&ver=1".to_string()),
    });
    (provider, loader)
}

fn request_for(provider: &MemoryItemProvider, version: VersionSpec) -> ResolveRequest<'_> {
    let mut request = ResolveRequest::new(ItemLocator::Id(ItemId::new("R")), en(), DB, provider);
    request.version = version;
    request
}

#[test]
fn scenario_a_item_without_test_fields_is_served_unchanged() {
    let provider = MemoryItemProvider::default();
    let plain = Item::new(ItemId::new("R"), en(), 1, DB);
    provider.insert(plain.clone());
    let orchestrator = ResolutionOrchestrator::new(
        ContentTestingSettings::default(),
        MemoryTestDefinitionLoader::default(),
    );
    let cache = RequestDecisionCache::new();

    let outcome = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
        .expect("resolve");

    assert_eq!(outcome.item, Some(plain.clone()));
    assert_eq!(
        outcome.path,
        ResolutionPath::Decided(RedirectDecision::no_redirect())
    );
    assert_eq!(
        cache.get(&cache.generate_key(&plain.reference)),
        Some(RedirectDecision::no_redirect())
    );
}

#[test]
fn scenario_b_running_test_redirects_to_lowest_existing_candidate() {
    let (provider, loader) = content_test_store(true, &[2, 5]);
    let orchestrator = ResolutionOrchestrator::new(ContentTestingSettings::default(), loader);
    let cache = RequestDecisionCache::new();

    let outcome = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
        .expect("resolve");

    assert!(outcome.redirected());
    assert_eq!(
        outcome.path,
        ResolutionPath::Decided(RedirectDecision::redirect_to(2))
    );
    let served = outcome.item.expect("variant served");
    assert_eq!(served.reference.id, ItemId::new("R"));
    assert_eq!(served.reference.version, 2);
}

#[test]
fn scenario_c_stopped_test_caches_no_redirect() {
    let (provider, loader) = content_test_store(false, &[2, 5]);
    let orchestrator = ResolutionOrchestrator::new(ContentTestingSettings::default(), loader);
    let cache = RequestDecisionCache::new();

    let outcome = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
        .expect("resolve");

    assert_eq!(outcome.item.as_ref().map(|item| item.reference.version), Some(3));
    assert_eq!(outcome.decision(), Some(RedirectDecision::no_redirect()));
    assert_eq!(cache.len(), 1);
    assert_eq!(provider.version_calls(), 0);
}

#[test]
fn scenario_d_explicit_version_skips_all_test_logic() {
    let (provider, loader) = content_test_store(true, &[2, 5]);
    let orchestrator = ResolutionOrchestrator::new(ContentTestingSettings::default(), loader);
    let cache = RecordingCache::default();

    let outcome = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Number(3)), &cache)
        .expect("resolve");

    assert_eq!(
        outcome.path,
        ResolutionPath::PassThrough(PassThroughReason::ExplicitVersion)
    );
    assert_eq!(outcome.item.as_ref().map(|item| item.reference.version), Some(3));
    assert_eq!(provider.item_calls(), 1);
    assert_eq!(provider.version_calls(), 0);
    assert_eq!((cache.gets.get(), cache.puts.get()), (0, 0));
}

#[test]
fn scenario_e_disabled_cache_recomputes_and_never_stores() {
    let (provider, loader) = content_test_store(true, &[2, 5]);
    let orchestrator = ResolutionOrchestrator::new(
        ContentTestingSettings::default().with_allow_cache(false),
        loader,
    );
    let cache = RecordingCache::default();

    let first = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
        .expect("first resolve");
    let second = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
        .expect("second resolve");

    assert_eq!(first, second);
    assert_eq!(first.decision(), Some(RedirectDecision::redirect_to(2)));
    assert_eq!(provider.version_calls(), 2);
    assert_eq!((cache.gets.get(), cache.puts.get()), (0, 0));
    assert!(cache.inner.is_empty());
}

#[test]
fn repeated_resolution_in_one_request_is_served_from_cache() {
    let (provider, loader) = content_test_store(true, &[2, 5]);
    let orchestrator = ResolutionOrchestrator::new(ContentTestingSettings::default(), loader);
    let cache = RecordingCache::default();

    let first = orchestrator
        .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
        .expect("first resolve");
    let calls_after_first = provider.item_calls();

    let by_path = ResolveRequest::new(
        ItemLocator::Path("/sitecore/content/home/r".to_string()),
        en(),
        DB,
        &provider,
    );
    let second = orchestrator.resolve(&by_path, &cache).expect("second resolve");

    assert_eq!(first.item, second.item);
    assert_eq!(
        second.path,
        ResolutionPath::CacheHit(RedirectDecision::redirect_to(2))
    );
    assert_eq!(provider.version_calls(), 1);
    // Only the initial lookup and the variant fetch; no test-definition lookups.
    assert_eq!(provider.item_calls() - calls_after_first, 2);
    assert_eq!(cache.puts.get(), 1);
}

#[test]
fn separate_requests_do_not_share_decisions() {
    let (provider, loader) = content_test_store(true, &[2, 5]);
    let orchestrator = ResolutionOrchestrator::new(ContentTestingSettings::default(), loader);

    for _ in 0..2 {
        let cache = RequestDecisionCache::new();
        let outcome = orchestrator
            .resolve(&request_for(&provider, VersionSpec::Latest), &cache)
            .expect("resolve");
        assert!(matches!(outcome.path, ResolutionPath::Decided(_)));
    }
    assert_eq!(provider.version_calls(), 2);
}

#[test]
fn definitions_stored_as_item_fields_drive_the_redirect() {
    let provider = MemoryItemProvider::default();
    for version in 1..=4 {
        provider.insert(
            Item::new(ItemId::new("R"), en(), version, DB)
                .with_field(PAGE_LEVEL_TEST_DEFINITION_FIELD, "/sitecore/system/tests/t"),
        );
    }
    provider.insert(
        Item::new(ItemId::new("T"), en(), 1, DB)
            .with_path("/sitecore/system/tests/t")
            .with_field(TEST_TYPE_FIELD, "content")
            .with_field(TEST_IS_RUNNING_FIELD, "true")
            .with_field(TEST_CONTENT_ITEM_FIELD, "sitecore://web/{R}?lang=en")
            .with_field(
                TEST_VARIABLES_FIELD,
                "{V1}={R}?lang=en&ver=6|{R}?lang=en&ver=3\n{V2}={R}?lang=en&ver=1",
            ),
    );
    let orchestrator =
        ResolutionOrchestrator::new(ContentTestingSettings::default(), FieldTestDefinitionLoader);

    let outcome = orchestrator
        .resolve(
            &request_for(&provider, VersionSpec::Latest),
            &RequestDecisionCache::new(),
        )
        .expect("resolve");

    assert_eq!(
        outcome.path,
        ResolutionPath::Decided(RedirectDecision::redirect_to(3))
    );
    assert_eq!(outcome.item.map(|item| item.reference.version), Some(3));
}
