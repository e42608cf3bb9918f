//! Fixed-window rate limiter keyed by client address

use dashmap::DashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Allows `max_requests` per client within each `window`.
pub struct FixedWindowRateLimiter {
    windows: DashMap<IpAddr, Window>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Counts one request from `ip`; `false` means it is over the limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut entry = self.windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drops windows that have fully elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(removed, "Rate limit windows purged");
        }
        removed
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    #[test]
    fn test_limit_applies_per_client() {
        let limiter = FixedWindowRateLimiter::new(3, Duration::from_secs(900));
        let now = Instant::now();

        assert!(limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(1), now));
        assert!(limiter.check_at(ip(1), now));
        assert!(!limiter.check_at(ip(1), now));

        // Another client has its own budget.
        assert!(limiter.check_at(ip(2), now));
    }

    #[test]
    fn test_window_resets_after_elapsing() {
        let limiter = FixedWindowRateLimiter::new(1, Duration::from_secs(900));
        let start = Instant::now();

        assert!(limiter.check_at(ip(1), start));
        assert!(!limiter.check_at(ip(1), start + Duration::from_secs(899)));
        assert!(limiter.check_at(ip(1), start + Duration::from_secs(900)));
    }

    #[test]
    fn test_purge_drops_only_elapsed_windows() {
        let limiter = FixedWindowRateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();

        limiter.check_at(ip(1), start);
        limiter.check_at(ip(2), start + Duration::from_secs(30));

        assert_eq!(limiter.purge_expired_at(start + Duration::from_secs(61)), 1);
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
