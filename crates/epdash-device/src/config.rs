//! Device timing and policy configuration.

use std::time::Duration;

use epdash_core::ZoneId;

/// Timing and refresh policy for the control loop. Defaults mirror the
/// reference firmware build.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Zones fetched each cycle, in draw order.
    pub zones: Vec<ZoneId>,

    /// Idle time between refresh cycles.
    pub refresh_interval: Duration,
    /// Wall-clock bound between full redraws.
    pub full_refresh_interval: Duration,
    /// Partial renders allowed before a full redraw is forced.
    pub max_partial_before_full: u32,

    /// Timeout applied to every blocking operation (connect, fetch, draw).
    pub op_timeout: Duration,
    /// Connect attempts per `WifiConnect` visit before giving up to the
    /// error branch.
    pub connect_attempts: u32,
    /// Delay between connect attempts within one visit.
    pub connect_retry: Duration,

    /// Backoff base delay.
    pub backoff_base: Duration,
    /// Error count at which the exponent stops growing.
    pub backoff_ceiling: u32,
    /// Hard cap on the backoff delay.
    pub max_backoff: Duration,

    /// Delay between pairing polls.
    pub pairing_poll_interval: Duration,
    /// How long one pairing code is shown before a fresh one is drawn.
    pub pairing_window: Duration,
    /// Cooldown after the server reported missing configuration.
    pub setup_cooldown: Duration,
}

impl DeviceConfig {
    /// Backoff before the next attempt after `error_count` consecutive
    /// failures: `min(max_backoff, base * 2^min(error_count, ceiling))`.
    /// The ceiling keeps the shift bounded, the cap keeps the sleep
    /// bounded; the delay never decreases while errors continue.
    pub fn backoff_delay(&self, error_count: u32) -> Duration {
        let exponent = error_count.min(self.backoff_ceiling);
        let multiplier = 1u32 << exponent.min(31);
        self.backoff_base
            .saturating_mul(multiplier)
            .min(self.max_backoff)
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            zones: ["header", "divider", "summary", "legs", "footer"]
                .into_iter()
                .map(ZoneId::new)
                .collect(),
            refresh_interval: Duration::from_secs(20),
            full_refresh_interval: Duration::from_secs(600),
            max_partial_before_full: 30,
            op_timeout: Duration::from_secs(30),
            connect_attempts: 3,
            connect_retry: Duration::from_secs(5),
            backoff_base: Duration::from_secs(2),
            backoff_ceiling: 5,
            max_backoff: Duration::from_secs(64),
            pairing_poll_interval: Duration::from_secs(5),
            pairing_window: Duration::from_secs(600),
            setup_cooldown: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_formula() {
        let config = DeviceConfig::default();
        assert_eq!(config.backoff_delay(0), Duration::from_secs(2));
        assert_eq!(config.backoff_delay(1), Duration::from_secs(4));
        assert_eq!(config.backoff_delay(2), Duration::from_secs(8));
        assert_eq!(config.backoff_delay(3), Duration::from_secs(16));
        assert_eq!(config.backoff_delay(4), Duration::from_secs(32));
        assert_eq!(config.backoff_delay(5), Duration::from_secs(64));
    }

    #[test]
    fn test_backoff_clamps_at_ceiling() {
        let config = DeviceConfig::default();
        let at_ceiling = config.backoff_delay(config.backoff_ceiling);
        for count in config.backoff_ceiling..config.backoff_ceiling + 20 {
            assert_eq!(config.backoff_delay(count), at_ceiling);
        }
        assert!(at_ceiling <= config.max_backoff);
    }

    #[test]
    fn test_backoff_never_decreases() {
        let config = DeviceConfig::default();
        let mut previous = Duration::ZERO;
        for count in 0..40 {
            let delay = config.backoff_delay(count);
            assert!(delay >= previous, "backoff decreased at {count}");
            previous = delay;
        }
    }

    #[test]
    fn test_backoff_respects_max_cap() {
        let config = DeviceConfig {
            max_backoff: Duration::from_secs(10),
            ..DeviceConfig::default()
        };
        assert_eq!(config.backoff_delay(10), Duration::from_secs(10));
    }

    #[test]
    fn test_default_zone_list_is_coarse_set() {
        let config = DeviceConfig::default();
        let ids: Vec<_> = config.zones.iter().map(|z| z.as_str()).collect();
        assert_eq!(ids, ["header", "divider", "summary", "legs", "footer"]);
    }
}
