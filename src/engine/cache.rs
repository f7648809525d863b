use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;

use super::compiled::{compile_rule, CompiledRule};

type CacheKey = (i64, DateTime<Utc>);
type CacheEntry = Arc<Result<CompiledRule, Vec<String>>>;

/// Read-mostly cache of compiled rule definitions, keyed by
/// `(rule_id, updated_at)` so a rule mutation naturally invalidates its
/// entry without an explicit eviction call (spec §5).
pub struct CompiledRuleCache {
    inner: Mutex<LruCache<CacheKey, CacheEntry>>,
}

impl CompiledRuleCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity.max(1) is always >= 1");
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the compiled rule for `(rule_id, updated_at)`, compiling
    /// and caching it on first access.
    pub fn get_or_compile(
        &self,
        rule_id: i64,
        updated_at: DateTime<Utc>,
        raw_definition: &str,
    ) -> CacheEntry {
        let key = (rule_id, updated_at);

        if let Some(hit) = self.inner.lock().get(&key).cloned() {
            return hit;
        }

        let compiled = Arc::new(compile_rule(raw_definition));
        self.inner.lock().put(key, compiled.clone());
        compiled
    }
}
