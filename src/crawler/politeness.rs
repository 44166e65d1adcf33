// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// 按主机的礼貌间隔闸
///
/// 同一主机的请求在此串行并补足最小间隔；不同主机互不阻塞。
/// 生效间隔取配置默认值与该主机crawl-delay中的较大者。
pub struct PolitenessGate {
    default_delay: Duration,
    hosts: DashMap<String, Arc<Mutex<Option<Instant>>>>,
}

impl PolitenessGate {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            default_delay,
            hosts: DashMap::new(),
        }
    }

    /// 等到该主机允许下一次请求为止，并登记本次请求时刻
    ///
    /// 持有主机槽位锁跨越睡眠，由此天然串行化同主机的并发调用
    pub async fn wait(&self, host: &str, crawl_delay: Option<Duration>) {
        let delay = crawl_delay.map_or(self.default_delay, |d| d.max(self.default_delay));

        let slot = self
            .hosts
            .entry(host.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();

        let mut last = slot.lock().await;
        if let Some(previous) = *last {
            let ready_at = previous + delay;
            let now = Instant::now();
            if ready_at > now {
                debug!(
                    "Applying crawl delay of {:?} for host {}",
                    ready_at - now,
                    host
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_same_host_requests_are_spaced() {
        let gate = PolitenessGate::new(Duration::from_secs(1));

        let start = Instant::now();
        gate.wait("example.com", None).await;
        gate.wait("example.com", None).await;
        gate.wait("example.com", None).await;

        assert!(start.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_crawl_delay_larger_than_default_wins() {
        let gate = PolitenessGate::new(Duration::from_secs(1));

        let start = Instant::now();
        gate.wait("example.com", Some(Duration::from_secs(5))).await;
        gate.wait("example.com", Some(Duration::from_secs(5))).await;

        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_hosts_do_not_block_each_other() {
        let gate = PolitenessGate::new(Duration::from_secs(10));

        let start = Instant::now();
        gate.wait("a.example.com", None).await;
        gate.wait("b.example.com", None).await;

        // First request per host pays no delay
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
