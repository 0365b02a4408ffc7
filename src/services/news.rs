//! Simulated flaky news source

use crate::model::news::NewsItem;
use chrono::Local;
use rand::Rng;

/// Probability that a news request fails
pub const FAILURE_RATE: f64 = 0.3;

/// Produce one news response: either a single fresh headline or a failure.
pub fn generate<R: Rng>(rng: &mut R) -> Option<Vec<NewsItem>> {
    if rng.random_bool(FAILURE_RATE) {
        return None;
    }

    let id = rng.random_range(0..1000);
    Some(vec![NewsItem {
        id,
        title: format!("Breaking News #{}", id),
        time: Local::now().format("%H:%M:%S").to_string(),
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_failure_rate_is_near_thirty_percent() {
        let mut rng = StdRng::seed_from_u64(42);
        let runs = 2000;
        let failures = (0..runs).filter(|_| generate(&mut rng).is_none()).count();
        let rate = failures as f64 / runs as f64;
        assert!((0.25..=0.35).contains(&rate), "failure rate {}", rate);
    }

    #[test]
    fn test_success_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let items = (0..20).find_map(|_| generate(&mut rng)).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].id < 1000);
        assert_eq!(items[0].title, format!("Breaking News #{}", items[0].id));
    }
}
