// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::models::outcome::AnalysisOutcome;

struct CacheEntry {
    outcome: Arc<AnalysisOutcome>,
    expires_at: Instant,
}

/// 分析结果缓存
///
/// 以规范化URL为键的进程内TTL缓存，过期条目在读取时惰性清理。
pub struct OutcomeCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl OutcomeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// 按键读取，过期即删并返回None
    pub fn get(&self, key: &str) -> Option<Arc<AnalysisOutcome>> {
        let entry = self.entries.get(key)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries.remove(key);
            debug!(key = key, "Cache entry expired");
            return None;
        }
        debug!(key = key, "Cache hit");
        Some(Arc::clone(&entry.outcome))
    }

    pub fn put(&self, key: String, outcome: Arc<AnalysisOutcome>) {
        self.entries.insert(
            key,
            CacheEntry {
                outcome,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
