use std::time::Duration;

use rand::Rng;

use crate::config::PacingConfig;

/// Sleeps a random, human-looking interval between outbound requests.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    config: PacingConfig,
}

impl Pacer {
    pub fn new(config: PacingConfig) -> Self {
        Self { config }
    }

    pub fn disabled() -> Self {
        Self::new(PacingConfig::disabled())
    }

    pub fn next_delay(&self) -> Duration {
        let PacingConfig {
            min_delay,
            max_delay,
        } = self.config;
        if max_delay <= min_delay {
            return min_delay;
        }
        let millis = rand::thread_rng().gen_range(min_delay.as_millis()..=max_delay.as_millis());
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    pub fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}
