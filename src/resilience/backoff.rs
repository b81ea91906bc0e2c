//! Exponential backoff.

use std::time::Duration;

/// Delay before retry number `retry` (1-based): `initial * 2^(retry - 1)`.
///
/// Growth saturates instead of overflowing. `max` caps the delay when set;
/// no jitter is applied.
pub fn calculate_backoff(retry: u32, initial: Duration, max: Option<Duration>) -> Duration {
    if retry == 0 {
        return Duration::ZERO;
    }

    let factor = 2u32.checked_pow(retry - 1).unwrap_or(u32::MAX);
    let delay = initial.saturating_mul(factor);
    match max {
        Some(cap) => delay.min(cap),
        None => delay,
    }
}

/// Next delay after `current`, doubling with an optional cap.
pub fn next_delay(current: Duration, max: Option<Duration>) -> Duration {
    let doubled = current.saturating_mul(2);
    match max {
        Some(cap) => doubled.min(cap),
        None => doubled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_calculation() {
        let base = Duration::from_millis(1000);
        assert_eq!(calculate_backoff(0, base, None), Duration::ZERO);
        assert_eq!(calculate_backoff(1, base, None), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(2, base, None), Duration::from_millis(2000));
        assert_eq!(calculate_backoff(3, base, None), Duration::from_millis(4000));
    }

    #[test]
    fn test_backoff_cap() {
        let base = Duration::from_millis(100);
        let cap = Some(Duration::from_millis(1000));
        assert_eq!(calculate_backoff(10, base, cap), Duration::from_millis(1000));
        assert_eq!(next_delay(Duration::from_millis(800), cap), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_saturates() {
        let huge = calculate_backoff(64, Duration::from_secs(1), None);
        assert!(huge >= Duration::from_secs(u32::MAX as u64));
        assert_eq!(next_delay(Duration::MAX, None), Duration::MAX);
    }

    #[test]
    fn test_next_delay_matches_closed_form() {
        let base = Duration::from_millis(250);
        let mut delay = base;
        for retry in 1..6 {
            assert_eq!(delay, calculate_backoff(retry, base, None));
            delay = next_delay(delay, None);
        }
    }
}
