// src/advisory.rs
//! External legal-advisory client: provider abstraction, an injected TTL
//! cache, and a daily call limit. The advisory service may be entirely
//! unavailable; callers receive an explicit [`AdvisoryOutcome::Unavailable`]
//! and are forced to handle the no-advice case.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Structured advice returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    /// 0–100 legal-strength estimate.
    pub score: f64,
    /// 1–5 self-reported confidence.
    pub confidence: u8,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// Explicit result type: no exception-as-control-flow for "service down".
#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryOutcome {
    Advice(Advice),
    Unavailable,
}

impl AdvisoryOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, AdvisoryOutcome::Advice(_))
    }
}

#[async_trait]
pub trait AdvisoryClient: Send + Sync {
    /// Ask the advisory service about a serialized case+evidence summary.
    async fn advise(&self, input: &str) -> AdvisoryOutcome;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

pub type DynAdvisoryClient = Arc<dyn AdvisoryClient>;

/// Config loaded from `config/advisory.json`. Unreadable config degrades to
/// disabled rather than failing startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryConfig {
    pub enabled: bool,
    /// Currently only "http"; anything else is treated as disabled.
    pub provider: Option<String>,
    pub daily_limit: Option<u32>,
    pub cache_ttl_secs: Option<u64>,
    pub cache_capacity: Option<usize>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: None,
            daily_limit: Some(20),
            cache_ttl_secs: Some(3600),
            cache_capacity: Some(256),
        }
    }
}

pub fn load_advisory_config() -> AdvisoryConfig {
    let path = Path::new("config/advisory.json");
    match fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap_or_default(),
        Err(_) => AdvisoryConfig::default(),
    }
}

/// Factory: build a client according to config and environment.
///
/// * `ADVISORY_TEST_MODE=mock` returns a deterministic mock client.
/// * `enabled: false` returns a disabled client.
/// * Otherwise the HTTP provider wrapped with caching + daily limit.
pub fn build_client_from_config(config: &AdvisoryConfig) -> DynAdvisoryClient {
    let cache = AdvisoryCache::new(
        Duration::from_secs(config.cache_ttl_secs.unwrap_or(3600)),
        config.cache_capacity.unwrap_or(256),
    );

    if std::env::var("ADVISORY_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        let mock = MockProvider::neutral();
        return Arc::new(CachingClient::new(
            mock,
            cache,
            config.daily_limit.unwrap_or(20),
        ));
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_deref() {
        Some("http") => {
            let provider = HttpProvider::from_env();
            Arc::new(CachingClient::new(
                provider,
                cache,
                config.daily_limit.unwrap_or(20),
            ))
        }
        _ => Arc::new(DisabledClient),
    }
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider doing the real remote call, separated so the caching
/// wrapper is reusable for production and tests.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    async fn fetch(&self, input: &str) -> Option<Advice>;
    fn name(&self) -> &'static str;
}

/// HTTP provider. Requires `LEGAL_ADVISORY_URL`; `LEGAL_ADVISORY_API_KEY` is
/// sent as a bearer token when present.
pub struct HttpProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpProvider {
    pub fn from_env() -> Self {
        let url = std::env::var("LEGAL_ADVISORY_URL").unwrap_or_default();
        let api_key = std::env::var("LEGAL_ADVISORY_API_KEY").ok();
        let http = reqwest::Client::builder()
            .user_agent("case-merit-engine/0.1 (+github.com/casemerit/case-merit-engine)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self { http, url, api_key }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn fetch(&self, input: &str) -> Option<Advice> {
        if self.url.is_empty() {
            return None;
        }

        #[derive(Serialize)]
        struct Req<'a> {
            summary: &'a str,
        }

        let mut req = self.http.post(&self.url).json(&Req { summary: input });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let mut advice: Advice = resp.json().await.ok()?;
        advice.score = advice.score.clamp(0.0, 100.0);
        advice.confidence = advice.confidence.clamp(1, 5);
        Some(advice)
    }
    fn name(&self) -> &'static str {
        "http"
    }
}

/// Returns `Unavailable` always; used when the advisory service is off.
pub struct DisabledClient;

#[async_trait]
impl AdvisoryClient for DisabledClient {
    async fn advise(&self, _input: &str) -> AdvisoryOutcome {
        AdvisoryOutcome::Unavailable
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic provider for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: Advice,
}

impl MockProvider {
    pub fn neutral() -> Self {
        Self {
            fixed: Advice {
                score: 55.0,
                confidence: 3,
                summary: "Neutral advisory summary (mock)".to_string(),
                strengths: Vec::new(),
                weaknesses: Vec::new(),
                recommendations: Vec::new(),
            },
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn fetch(&self, _input: &str) -> Option<Advice> {
        Some(self.fixed.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// TTL cache + daily limit wrapper
// ------------------------------------------------------------

/// Explicit cache object, constructor-injected so tests control and reset it
/// deterministically. Entries expire after `ttl`; when full, the oldest entry
/// is evicted.
pub struct AdvisoryCache {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<HashMap<String, (Instant, Advice)>>,
}

impl AdvisoryCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Advice> {
        let mut map = self.inner.lock().expect("advisory cache poisoned");
        match map.get(key) {
            Some((at, advice)) if at.elapsed() <= self.ttl => Some(advice.clone()),
            Some(_) => {
                map.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, advice: Advice) {
        let mut map = self.inner.lock().expect("advisory cache poisoned");
        if map.len() >= self.capacity && !map.contains_key(&key) {
            if let Some(oldest) = map
                .iter()
                .min_by_key(|(_, (at, _))| *at)
                .map(|(k, _)| k.clone())
            {
                map.remove(&oldest);
            }
        }
        map.insert(key, (Instant::now(), advice));
    }

    pub fn clear(&self) {
        self.inner.lock().expect("advisory cache poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("advisory cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct DailyCounter {
    day: i64,
    count: u32,
}

impl DailyCounter {
    fn today() -> i64 {
        chrono::Utc::now().timestamp() / 86_400
    }
    fn new() -> Self {
        Self {
            day: Self::today(),
            count: 0,
        }
    }
    fn roll_over_if_needed(&mut self) {
        let today = Self::today();
        if self.day != today {
            self.day = today;
            self.count = 0;
        }
    }
}

/// Wraps a provider with the injected cache and a per-day call budget.
/// Cache hits do not consume the budget.
pub struct CachingClient<P: Provider> {
    inner: P,
    cache: AdvisoryCache,
    daily_limit_max: u32,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache: AdvisoryCache, daily_limit_max: u32) -> Self {
        Self {
            inner,
            cache,
            daily_limit_max,
            counter: Mutex::new(DailyCounter::new()),
        }
    }

    async fn advise_impl(&self, input: &str) -> AdvisoryOutcome {
        let key = cache_key(input);
        if let Some(hit) = self.cache.get(&key) {
            return AdvisoryOutcome::Advice(hit);
        }

        {
            let mut g = self.counter.lock().expect("counter poisoned");
            g.roll_over_if_needed();
            if g.count >= self.daily_limit_max {
                tracing::debug!(limit = self.daily_limit_max, "advisory daily limit hit");
                return AdvisoryOutcome::Unavailable;
            }
        }

        match self.inner.fetch(input).await {
            Some(advice) => {
                self.cache.insert(key, advice.clone());
                let mut g = self.counter.lock().expect("counter poisoned");
                g.count = g.count.saturating_add(1);
                AdvisoryOutcome::Advice(advice)
            }
            None => AdvisoryOutcome::Unavailable,
        }
    }
}

#[async_trait]
impl<P: Provider> AdvisoryClient for CachingClient<P> {
    async fn advise(&self, input: &str) -> AdvisoryOutcome {
        self.advise_impl(input).await
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

fn cache_key(input: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
