use std::collections::HashMap;
use std::fmt::Display;

use sea_orm::ConnectionTrait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use tabbycat_entities::prelude::*;

struct SerializedLRUCacheEntry {
    data: Vec<u8>,
}

/// LRU cache of bincode encoded values, bounded by the total encoded size.
struct SerializedLRUCache<K> {
    cache: lru::LruCache<K, SerializedLRUCacheEntry>,
    max_size: usize,
    curr_size: usize
}

impl<K> SerializedLRUCache<K> where K: std::hash::Hash + Eq + Clone {
    fn new(max_size: usize) -> Self {
        Self {
            cache: lru::LruCache::unbounded(),
            max_size,
            curr_size: 0
        }
    }

    fn get<V>(&mut self, key: &K) -> anyhow::Result<Option<V>> where V: DeserializeOwned {
        self.cache.get(key)
            .map(|entry| bincode::deserialize(&entry.data).map_err(anyhow::Error::new))
            .transpose()
    }

    fn insert<V>(&mut self, key: K, value: &V) -> anyhow::Result<bool> where V: Serialize {
        let data = bincode::serialize(value)?;

        self.remove(&key);

        if data.len() > self.max_size {
            return Ok(false);
        }

        while data.len() > (self.max_size - self.curr_size) {
            match self.cache.pop_lru() {
                Some((_, popped)) => self.curr_size -= popped.data.len(),
                None => break,
            }
        }

        self.curr_size += data.len();
        self.cache.put(key, SerializedLRUCacheEntry {
            data
        });

        Ok(true)
    }

    fn remove(&mut self, key: &K) -> bool {
        match self.cache.pop(key) {
            Some(entry) => {
                self.curr_size -= entry.data.len();
                true
            },
            None => false
        }
    }

    #[cfg(test)]
    fn contains(&self, key: &K) -> bool {
        self.cache.contains(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Tournament(String),
    Round(String, i32),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Tournament(slug) => write!(f, "{}_object", slug),
            CacheKey::Round(slug, seq) => write!(f, "{}_{}_object", slug, seq),
        }
    }
}

struct CacheState {
    entries: SerializedLRUCache<String>,
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, key: &str) -> u64 {
        self.generations.get(key).copied().unwrap_or(0)
    }
}

/// Shared cache for tournament and round lookups. Entries never expire and
/// are only dropped by eviction or by an explicit invalidation.
///
/// Every invalidation bumps a per-key generation. A value loaded from the
/// database is only stored if no invalidation happened while it was loading.
pub struct CacheManager {
    state: RwLock<CacheState>,
}

impl CacheManager {
    pub fn new(max_size: usize) -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: SerializedLRUCache::new(max_size),
                generations: HashMap::new(),
            })
        }
    }

    async fn get_or_load<V, F, Fut>(&self, key: CacheKey, load: F) -> anyhow::Result<Option<V>>
    where
        V: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = anyhow::Result<Option<V>>>
    {
        let key_str = key.to_string();
        let generation = {
            let mut state = self.state.write().await;
            match state.entries.get::<V>(&key_str) {
                Ok(Some(value)) => {
                    tracing::debug!("Cache hit for {}", key_str);
                    return Ok(Some(value));
                },
                Ok(None) => {},
                Err(e) => {
                    tracing::warn!("Dropping undecodable cache entry {}: {}", key_str, e);
                    state.entries.remove(&key_str);
                }
            }
            state.generation(&key_str)
        };

        tracing::debug!("Cache miss for {}", key_str);
        let value = load().await?;
        if let Some(value) = &value {
            let mut state = self.state.write().await;
            if state.generation(&key_str) == generation {
                state.entries.insert(key_str, value)?;
            }
            else {
                tracing::debug!("Not caching {}, it was invalidated while loading", key_str);
            }
        }
        Ok(value)
    }

    pub async fn get_tournament<C>(&self, slug: &str, db: &C) -> anyhow::Result<Option<Tournament>> where C: ConnectionTrait {
        self.get_or_load(CacheKey::Tournament(slug.to_string()), || async {
            Tournament::get_by_slug(db, slug).await.map_err(anyhow::Error::from)
        }).await
    }

    pub async fn get_round<C>(&self, tournament: &Tournament, seq: i32, db: &C) -> anyhow::Result<Option<TournamentRound>> where C: ConnectionTrait {
        self.get_or_load(CacheKey::Round(tournament.slug.clone(), seq), || async {
            TournamentRound::get_by_seq(db, tournament.uuid, seq).await.map_err(anyhow::Error::from)
        }).await
    }

    pub async fn invalidate(&self, key: CacheKey) {
        let key_str = key.to_string();
        let mut state = self.state.write().await;
        *state.generations.entry(key_str.clone()).or_insert(0) += 1;
        if state.entries.remove(&key_str) {
            tracing::debug!("Invalidated cache entry {}", key_str);
        }
    }
}
