use crate::config::Config;
use crate::scorer::CompiledWordList;
use crate::word_list::WordListStore;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Merged word lists are reloaded at most once a day.
pub const WORD_LIST_TTL: Duration = Duration::from_secs(1440 * 60);

#[derive(Debug)]
pub struct CacheEntry<T> {
    pub value: T,
    pub timestamp: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, ttl: Duration) -> Self {
        Self {
            value,
            timestamp: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.timestamp.elapsed() >= self.ttl
    }
}

/// Storage behind [`WordListCache`]. Implementations only have to be safe against
/// data races; two callers missing at the same time may both run the loader.
pub trait ListCache: Send + Sync {
    fn get_or_load(
        &self,
        key: &str,
        ttl: Duration,
        loader: &mut dyn FnMut() -> CompiledWordList,
    ) -> Arc<CompiledWordList>;
}

/// Process-local cache keyed by word list configuration.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry<Arc<CompiledWordList>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<Arc<CompiledWordList>> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

impl ListCache for MemoryCache {
    fn get_or_load(
        &self,
        key: &str,
        ttl: Duration,
        loader: &mut dyn FnMut() -> CompiledWordList,
    ) -> Arc<CompiledWordList> {
        if let Some(words) = self.lookup(key) {
            log::debug!("Word list cache hit for {key}");
            return words;
        }

        log::debug!("Word list cache miss for {key}, reloading");
        // The lock is not held while loading
        let words = Arc::new(loader());
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, entry| !entry.is_expired());
            entries.insert(key.to_string(), CacheEntry::new(words.clone(), ttl));
        }
        words
    }
}

/// Cache that never stores anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ListCache for PassThrough {
    fn get_or_load(
        &self,
        _key: &str,
        _ttl: Duration,
        loader: &mut dyn FnMut() -> CompiledWordList,
    ) -> Arc<CompiledWordList> {
        Arc::new(loader())
    }
}

/// Read-through cache in front of [`WordListStore`]. Lists are cached in
/// compiled form so that a hit skips both the file reads and the pattern builds.
#[derive(Clone)]
pub struct WordListCache {
    store: WordListStore,
    backend: Arc<dyn ListCache>,
    ttl: Duration,
}

impl Default for WordListCache {
    fn default() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }
}

impl WordListCache {
    pub fn new(backend: Arc<dyn ListCache>) -> Self {
        Self {
            store: WordListStore::new(),
            backend,
            ttl: WORD_LIST_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn get(&self, config: &Config) -> Arc<CompiledWordList> {
        if !config.word_list_cache {
            return Arc::new(self.load(config));
        }

        let key = cache_key(config);
        self.backend
            .get_or_load(&key, self.ttl, &mut || self.load(config))
    }

    fn load(&self, config: &Config) -> CompiledWordList {
        CompiledWordList::compile(&self.store.load(config))
    }
}

/// One key per effective word list source configuration. File contents are not
/// part of the key, so edits on disk show up only after the TTL runs out.
pub fn cache_key(config: &Config) -> String {
    let mut hasher = DefaultHasher::new();
    config.use_word_lists.hash(&mut hasher);
    config.word_list_paths.hash(&mut hasher);
    config.spam_words.hash(&mut hasher);
    format!("wordlists-{:016x}", hasher.finish())
}
