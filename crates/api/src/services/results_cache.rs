use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use uuid::Uuid;

use crate::gql::domains::results::service::RankedResult;

const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Competition(Uuid),
    Ranking,
}

/// Ranked result lists, shared between requests until a write invalidates them.
#[derive(Clone)]
pub struct ResultsCache {
    entries: Arc<RwLock<HashMap<CacheKey, (Instant, Arc<Vec<RankedResult>>)>>>,
    ttl: Duration,
}

impl Default for ResultsCache {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }
}

impl ResultsCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn get(&self, key: CacheKey) -> Option<Arc<Vec<RankedResult>>> {
        let entries = self.entries.read();
        entries
            .get(&key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, results)| results.clone())
    }

    pub fn insert(&self, key: CacheKey, results: Vec<RankedResult>) -> Arc<Vec<RankedResult>> {
        let results = Arc::new(results);
        self.entries
            .write()
            .insert(key, (Instant::now(), results.clone()));
        results
    }

    /// Drops a competition's results and the season ranking that includes them.
    pub fn invalidate_competition(&self, competition_id: Uuid) {
        let mut entries = self.entries.write();
        entries.remove(&CacheKey::Competition(competition_id));
        entries.remove(&CacheKey::Ranking);
    }

    pub fn invalidate_ranking(&self) {
        self.entries.write().remove(&CacheKey::Ranking);
    }

    /// For writes that touch runners or categories across competitions.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
