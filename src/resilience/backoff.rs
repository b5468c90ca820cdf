//! Exponential backoff with jitter for read retries.

use std::time::Duration;

use rand::Rng;

/// Delay before retry number `attempt` (1-based; 0 means "no wait").
///
/// Doubles from `base_ms`, caps at `max_ms`, then adds up to 10% jitter so
/// concurrent readers hitting the same failing node spread out.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
    let capped = base_ms.saturating_mul(factor).min(max_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_attempt_has_no_delay() {
        assert_eq!(calculate_backoff(0, 100, 2000), Duration::ZERO);
    }

    #[test]
    fn test_backoff_doubles_within_jitter() {
        let b1 = calculate_backoff(1, 100, 2000).as_millis();
        assert!((100..110).contains(&b1), "{b1}");

        let b2 = calculate_backoff(2, 100, 2000).as_millis();
        assert!((200..220).contains(&b2), "{b2}");

        let b3 = calculate_backoff(3, 100, 2000).as_millis();
        assert!((400..440).contains(&b3), "{b3}");
    }

    #[test]
    fn test_backoff_is_capped() {
        let capped = calculate_backoff(10, 100, 1000).as_millis();
        assert!((1000..1100).contains(&capped), "{capped}");

        let huge = calculate_backoff(200, 100, 1000).as_millis();
        assert!((1000..1100).contains(&huge), "{huge}");
    }
}
