//! Backoff strategies for retry delays
//!
//! Two retry loops in batchgate share these: the hook layer (linear backoff
//! for throttled requests) and the HTTP client (exponential backoff for
//! connection failures and 5xx responses).

use std::time::Duration;

use rand::Rng;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: initial_delay + (attempt * increment)
    Linear { initial_delay: Duration, increment: Duration },
    /// Exponential backoff: initial_delay * base^attempt, capped at max_delay
    Exponential { initial_delay: Duration, base: f64, max_delay: Duration },
}

impl BackoffStrategy {
    /// Linear backoff where the n-th retry (0-based) waits `step * (n + 1)`.
    pub fn linear(step: Duration) -> Self {
        Self::Linear { initial_delay: step, increment: step }
    }

    /// Doubling backoff starting at `initial_delay`.
    pub fn exponential(initial_delay: Duration, max_delay: Duration) -> Self {
        Self::Exponential { initial_delay, base: 2.0, max_delay }
    }

    /// Calculate the delay before retry number `attempt` (0-based)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Linear { initial_delay, increment } => {
                initial_delay.saturating_add(increment.saturating_mul(attempt))
            }
            BackoffStrategy::Exponential { initial_delay, base, max_delay } => {
                let exponent = attempt.min(32) as i32;
                let delay = initial_delay.as_millis() as f64 * base.powi(exponent);
                let delay_ms = delay.min(max_delay.as_millis() as f64) as u64;
                Duration::from_millis(delay_ms)
            }
        }
    }
}

/// Jitter type for adding randomness to retry delays
#[derive(Debug, Clone, PartialEq)]
pub enum Jitter {
    /// No jitter
    None,
    /// Full jitter: 0 to calculated_delay
    Full,
    /// Equal jitter: calculated_delay/2 to calculated_delay
    Equal,
    /// Additive jitter: calculated_delay plus up to `max`
    Additive { max: Duration },
}

impl Jitter {
    /// Apply jitter to the calculated delay
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => Duration::from_millis(random_up_to(delay.as_millis() as u64)),
            Jitter::Equal => {
                let half = delay.as_millis() as u64 / 2;
                Duration::from_millis(half + random_up_to(half))
            }
            Jitter::Additive { max } => {
                delay.saturating_add(Duration::from_millis(random_up_to(max.as_millis() as u64)))
            }
        }
    }
}

fn random_up_to(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=max)
}

/// A bounded retry schedule: a backoff strategy plus an attempt cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrySchedule {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Delay strategy between retries
    pub backoff: BackoffStrategy,
    /// Randomization applied on top of the strategy
    pub jitter: Jitter,
}

impl RetrySchedule {
    /// Schedule without jitter.
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self { max_retries, backoff, jitter: Jitter::None }
    }

    /// Replace the jitter applied to each delay.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether another retry is allowed after `retries_so_far` retries.
    pub fn allows(&self, retries_so_far: u32) -> bool {
        retries_so_far < self.max_retries
    }

    /// Delay before the next retry, or `None` once the cap is reached.
    pub fn next_delay(&self, retries_so_far: u32) -> Option<Duration> {
        self.allows(retries_so_far)
            .then(|| self.jitter.apply(self.backoff.calculate_delay(retries_so_far)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_backoff() {
        let strategy = BackoffStrategy::Fixed(Duration::from_millis(200));
        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(200));
        assert_eq!(strategy.calculate_delay(7), Duration::from_millis(200));
    }

    #[test]
    fn test_linear_backoff_matches_hook_formula() {
        let step = Duration::from_millis(2000);
        let strategy = BackoffStrategy::linear(step);
        for retry_count in 0..3u32 {
            assert_eq!(strategy.calculate_delay(retry_count), step * (retry_count + 1));
        }
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let strategy =
            BackoffStrategy::exponential(Duration::from_millis(100), Duration::from_millis(1000));
        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(strategy.calculate_delay(3), Duration::from_millis(800));
        assert_eq!(strategy.calculate_delay(10), Duration::from_millis(1000));
    }

    #[test]
    fn test_jitter_bounds() {
        let delay = Duration::from_millis(1000);
        for _ in 0..50 {
            assert!(Jitter::Full.apply(delay) <= delay);
            let equal = Jitter::Equal.apply(delay);
            assert!(equal >= Duration::from_millis(500) && equal <= delay);
            let additive = Jitter::Additive { max: Duration::from_millis(250) }.apply(delay);
            assert!(additive >= delay && additive <= Duration::from_millis(1250));
        }
        assert_eq!(Jitter::None.apply(delay), delay);
    }

    #[test]
    fn test_schedule_stops_at_cap() {
        let schedule = RetrySchedule::new(3, BackoffStrategy::linear(Duration::from_secs(2)));
        assert_eq!(schedule.next_delay(0), Some(Duration::from_secs(2)));
        assert_eq!(schedule.next_delay(2), Some(Duration::from_secs(6)));
        assert_eq!(schedule.next_delay(3), None);
        assert!(!schedule.allows(3));
    }
}
