//! The query façade.
//!
//! [`QuranClient`] owns one session's state: the response cache, the
//! endpoint rotation state and the fetcher. Every retrieval follows the same
//! path: validate input, check the cache, fetch from the active endpoint on
//! a miss, normalize, store, return.
//!
//! Errors leaving the client are either input errors
//! ([`Error::InvalidAddress`], [`Error::InvalidQuery`]) or
//! [`Error::Service`]. Raw transport errors never escape.

use crate::audio::{self, AudioTarget};
use crate::cache::{CacheStats, RequestCache, build_key};
use crate::chapters::{static_chapters, static_translations};
use crate::config::ClientConfig;
use crate::fetcher::{EndpointState, FetchPolicy, Fetcher, HttpTransport, Transport};
use crate::normalizer;
use crate::types::{BatchItem, Chapter, ChapterMeta, Edition, Juz, SearchResults, Verse};
use crate::verse_index::{self, TOTAL_JUZ, VerseAddress};
use crate::{Error, Result};
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Minimum number of characters in a trimmed search query.
pub const MIN_QUERY_CHARS: usize = 2;

/// Async client for the content API.
///
/// ```rust,no_run
/// use quran_core::{ClientConfig, QuranClient};
///
/// # async fn run() -> quran_core::Result<()> {
/// let client = QuranClient::new(ClientConfig::load()?)?;
/// let chapters = client.list_chapters().await;
/// let fatiha = client.get_chapter(1, &["quran-uthmani", "en.asad"]).await?;
/// assert_eq!(chapters.len(), 114);
/// assert_eq!(fatiha.verses.len(), 7);
/// # Ok(())
/// # }
/// ```
pub struct QuranClient {
    config: ClientConfig,
    fetcher: Fetcher,
    cache: RwLock<RequestCache>,
    endpoints: RwLock<EndpointState>,
}

impl std::fmt::Debug for QuranClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuranClient")
            .field("config", &self.config)
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

/// Editions of one request: the text edition plus translations.
struct EditionSet {
    primary: String,
    translations: Vec<String>,
    /// Sorted, deduplicated identifiers for keys and URLs.
    sorted: Vec<String>,
}

impl EditionSet {
    /// The configured primary edition wins when requested; otherwise the
    /// lexicographically first requested edition carries the text.
    fn new(requested: &[&str], default_primary: &str) -> Self {
        let mut sorted: Vec<String> = requested
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        sorted.sort();
        sorted.dedup();
        if sorted.is_empty() {
            sorted.push(default_primary.to_string());
        }

        let primary = if sorted.iter().any(|e| e == default_primary) {
            default_primary.to_string()
        } else {
            sorted[0].clone()
        };
        let translations = sorted.iter().filter(|e| **e != primary).cloned().collect();

        Self {
            primary,
            translations,
            sorted,
        }
    }

    fn joined(&self) -> String {
        self.sorted.join(",")
    }

    /// `[single]` or `["editions", "a,b"]`.
    fn path_segments(&self) -> Vec<String> {
        if self.sorted.len() == 1 {
            vec![self.primary.clone()]
        } else {
            vec!["editions".to_string(), self.joined()]
        }
    }
}

impl QuranClient {
    /// Create a client over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings, or an error if the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::with_transport(config, transport)
    }

    /// Create a client over an arbitrary transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        let endpoints = EndpointState::new(config.api.endpoints())?;
        let cache = if config.cache.enabled {
            RequestCache::new(config.cache.expiry())
        } else {
            RequestCache::disabled()
        };
        let fetcher = Fetcher::new(transport, FetchPolicy::from(&config.api));

        Ok(Self {
            config,
            fetcher,
            cache: RwLock::new(cache),
            endpoints: RwLock::new(endpoints),
        })
    }

    /// Settings this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// All 114 chapters.
    ///
    /// Falls back to the built-in table when the upstream listing cannot be
    /// retrieved, so this never fails.
    pub async fn list_chapters(&self) -> Vec<ChapterMeta> {
        let segments = ["surah".to_string()];
        match self
            .load("surahs".to_string(), &segments, normalizer::normalize_chapter_list)
            .await
        {
            Ok(chapters) => chapters,
            Err(err) => {
                warn!("chapter listing unavailable ({err}); using built-in table");
                static_chapters().to_vec()
            },
        }
    }

    /// A chapter with every verse in the requested editions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] before any request when `number` is
    /// outside `1..=114`, or [`Error::Service`] when retrieval fails.
    pub async fn get_chapter(&self, number: u16, editions: &[&str]) -> Result<Chapter> {
        verse_index::check_chapter(number)?;
        let set = EditionSet::new(editions, &self.config.api.primary_edition);

        let key = build_key(&format!("surah/{number}"), &[("editions", &set.joined())]);
        let mut segments = vec!["surah".to_string(), number.to_string()];
        segments.extend(set.path_segments());

        self.load(key, &segments, |data| {
            normalizer::normalize_chapter(data, &set.primary, &set.translations)
        })
        .await
        .map_err(Error::into_service)
    }

    /// A chapter in the primary edition plus one or two translations.
    ///
    /// # Errors
    ///
    /// Same as [`QuranClient::get_chapter`].
    pub async fn get_chapter_with_translations(
        &self,
        number: u16,
        translation: &str,
        secondary: Option<&str>,
    ) -> Result<Chapter> {
        let mut editions = vec![self.config.api.primary_edition.as_str(), translation];
        if let Some(secondary) = secondary {
            editions.push(secondary);
        }
        self.get_chapter(number, &editions).await
    }

    /// One verse in the requested editions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] before any request when the address
    /// is out of range, or [`Error::Service`] when retrieval fails.
    pub async fn get_verse(&self, chapter: u16, verse: u16, editions: &[&str]) -> Result<Verse> {
        verse_index::to_global_number(chapter, verse)?;
        let set = EditionSet::new(editions, &self.config.api.primary_edition);

        let key = build_key(
            &format!("ayah/{chapter}:{verse}"),
            &[("editions", &set.joined())],
        );
        let mut segments = vec!["ayah".to_string(), format!("{chapter}:{verse}")];
        segments.extend(set.path_segments());

        self.load(key, &segments, |data| {
            normalizer::normalize_verse(data, &set.primary, &set.translations)
        })
        .await
        .map_err(Error::into_service)
    }

    /// Several verses fetched concurrently.
    ///
    /// Every address gets its own outcome in input order; a failing item
    /// never affects the others.
    pub async fn get_verses_batch(
        &self,
        addresses: &[VerseAddress],
        editions: &[&str],
    ) -> Vec<BatchItem> {
        let results = join_all(
            addresses
                .iter()
                .map(|address| self.get_verse(address.chapter, address.verse, editions)),
        )
        .await;

        let items: Vec<BatchItem> = addresses
            .iter()
            .zip(results)
            .map(|(&address, result)| BatchItem { address, result })
            .collect();
        let failed = items.iter().filter(|item| !item.is_ok()).count();
        if failed > 0 {
            warn!("{failed} of {} batch verses failed", items.len());
        }
        items
    }

    /// Full-text search.
    ///
    /// `scope` limits the search to one chapter; `None` searches everything.
    /// An upstream "not found" means no matches and yields empty results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] without any request when the trimmed
    /// query has fewer than two characters, [`Error::InvalidAddress`] for an
    /// out-of-range scope, or [`Error::Service`] when retrieval fails.
    pub async fn search(
        &self,
        query: &str,
        scope: Option<u16>,
        edition: &str,
    ) -> Result<SearchResults> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(Error::InvalidQuery(format!(
                "search needs at least {MIN_QUERY_CHARS} characters, got {query:?}"
            )));
        }
        if is_dot_segment(query) {
            return Err(Error::InvalidQuery(format!(
                "search query {query:?} cannot be sent as a path segment"
            )));
        }
        let scope = match scope {
            Some(chapter) => verse_index::check_chapter(chapter)?.to_string(),
            None => "all".to_string(),
        };

        let key = build_key(
            "search",
            &[("edition", edition), ("q", query), ("scope", &scope)],
        );
        let segments = [
            "search".to_string(),
            query.to_string(),
            scope,
            edition.to_string(),
        ];

        match self.load(key, &segments, normalizer::normalize_search).await {
            Err(Error::HttpError { status: 404 }) => {
                debug!("no matches for {query:?}");
                Ok(SearchResults::default())
            },
            other => other.map_err(Error::into_service),
        }
    }

    /// Editions offered by the upstream.
    ///
    /// Falls back to the bundled translation list, so this never fails.
    pub async fn list_editions(&self) -> Vec<Edition> {
        let segments = ["edition".to_string()];
        match self
            .load("editions".to_string(), &segments, normalizer::normalize_editions)
            .await
        {
            Ok(editions) => editions,
            Err(err) => {
                warn!("edition listing unavailable ({err}); using bundled translations");
                static_translations()
            },
        }
    }

    /// One of the thirty parts in a single edition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] when `number` is outside `1..=30`, or
    /// [`Error::Service`] when retrieval fails.
    pub async fn get_juz(&self, number: u16, edition: &str) -> Result<Juz> {
        if number < 1 || number > TOTAL_JUZ {
            return Err(Error::InvalidAddress(format!(
                "juz {number} is outside 1..={TOTAL_JUZ}"
            )));
        }

        let key = build_key(&format!("juz/{number}"), &[("edition", edition)]);
        let segments = ["juz".to_string(), number.to_string(), edition.to_string()];
        self.load(key, &segments, normalizer::normalize_juz)
            .await
            .map_err(Error::into_service)
    }

    /// A uniformly random chapter, then a uniformly random verse in it.
    ///
    /// # Errors
    ///
    /// Same as [`QuranClient::get_verse`].
    pub async fn random_verse(&self, edition: &str) -> Result<Verse> {
        let address = verse_index::random_address(&mut rand::thread_rng());
        debug!("random verse {address}");
        self.get_verse(address.chapter, address.verse, &[edition]).await
    }

    /// CDN URL for a verse or chapter recitation.
    ///
    /// Returns `None` for an unknown reciter or an out-of-range target.
    #[must_use]
    pub fn audio_url(&self, target: AudioTarget, reciter: &str) -> Option<String> {
        audio::audio_url(&self.config.audio, target, reciter)
    }

    /// CDN URL for one verse addressed by chapter and verse.
    #[must_use]
    pub fn verse_audio_url(&self, address: VerseAddress, reciter: &str) -> Option<String> {
        AudioTarget::verse_at(address).and_then(|target| self.audio_url(target, reciter))
    }

    /// Drop every cached response.
    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
        info!("response cache cleared");
    }

    /// Cached entry count and keys.
    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Base URL requests currently go to.
    pub async fn active_endpoint(&self) -> String {
        self.endpoints.read().await.active().to_string()
    }

    /// Cache check, fetch on miss, normalize, store.
    ///
    /// Returns raw fetch errors; callers decide how to present them.
    async fn load<T, F>(&self, key: String, segments: &[String], normalize: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&Value) -> Result<T>,
    {
        let hit = self.cache.write().await.get(&key);
        if let Some(payload) = hit {
            match serde_json::from_value(payload) {
                Ok(value) => return Ok(value),
                Err(e) => warn!("discarding unreadable cache entry {key}: {e}"),
            }
        }

        let data = self.fetch(segments).await?;
        let value = normalize(&data)?;

        match serde_json::to_value(&value) {
            Ok(payload) => self.cache.write().await.put(key, payload),
            Err(e) => warn!("not caching {key}: {e}"),
        }
        Ok(value)
    }

    /// Fetch from the active endpoint and account the outcome against it.
    async fn fetch(&self, segments: &[String]) -> Result<Value> {
        let base = self.endpoints.read().await.active().to_string();
        let url = endpoint_url(&base, segments)?;

        match self.fetcher.fetch_data(&url).await {
            Ok(data) => {
                self.endpoints.write().await.record_success();
                Ok(data)
            },
            Err(err) => {
                if counts_against_endpoint(&err) {
                    let mut endpoints = self.endpoints.write().await;
                    // another request may already have rotated away
                    if endpoints.active() == base {
                        let failures = endpoints.record_failure();
                        if failures >= self.config.api.failover_after {
                            warn!("{base} failed {failures} time(s): {err}");
                            endpoints.rotate();
                        }
                    }
                }
                Err(err)
            },
        }
    }
}

/// Whether a failure says something about the endpoint rather than the
/// request. Client errors (4xx) do not.
const fn counts_against_endpoint(err: &Error) -> bool {
    match err {
        Error::HttpError { status } => *status >= 500,
        Error::Timeout(_) | Error::Network(_) | Error::InvalidResponse(_) => true,
        _ => false,
    }
}

/// Segments made only of dots are collapsed by URL normalization, even when
/// percent-encoded.
fn is_dot_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c == '.')
}

/// Append percent-encoded path segments to a base URL.
fn endpoint_url(base: &str, segments: &[String]) -> Result<String> {
    if let Some(segment) = segments.iter().find(|s| is_dot_segment(s)) {
        return Err(Error::InvalidQuery(format!(
            "path segment {segment:?} cannot be sent"
        )));
    }
    let mut url =
        Url::parse(base).map_err(|e| Error::Config(format!("invalid API base url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| Error::Config(format!("API base url {base} cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
