//! Seeded deterministic dice
//!
//! Uses xorshift64 so the same seed replays the same sequence on every
//! platform. Game logic must never reach for ambient randomness; every
//! randomized formula takes a `&mut Dice` instead.

use serde::{Deserialize, Serialize};

/// A deterministic random source for game logic
///
/// The state serializes with the rest of the game so a loaded session
/// continues the same sequence it saved with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dice {
    state: u64,
}

impl Dice {
    /// Create dice with the given seed
    pub fn new(seed: u64) -> Self {
        // xorshift64 cannot leave the zero state
        let state = if seed == 0 { 0x9E37_79B9 } else { seed };
        Self { state }
    }

    /// Current internal state, for saving
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Next raw u64
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform f64 in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in `[min, max)`
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform i64 in `[min, max]` (inclusive); inverted bounds are swapped
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let span = (max - min) as u64 + 1;
        min + (self.next_u64() % span) as i64
    }

    /// Single success roll against a probability
    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Pick a uniformly random element; `None` when the slice is empty
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let idx = (self.next_u64() % items.len() as u64) as usize;
        Some(&items[idx])
    }

    /// Index into a weighted list via a cumulative roll
    ///
    /// Returns `None` when the list is empty or every weight is zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut threshold = self.next_f64() * total;
        for (i, &weight) in weights.iter().enumerate() {
            if weight <= 0.0 {
                continue;
            }
            threshold -= weight;
            if threshold <= 0.0 {
                return Some(i);
            }
        }
        // Float rounding can leave a sliver; land on the last positive weight
        weights.iter().rposition(|w| *w > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Dice::new(42);
        let mut b = Dice::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut dice = Dice::new(0);
        assert_ne!(dice.next_u64(), 0);
    }

    #[test]
    fn range_is_inclusive() {
        let mut dice = Dice::new(7);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let v = dice.range_i64(-1, 1);
            assert!((-1..=1).contains(&v));
            seen[(v + 1) as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn inverted_bounds_still_roll_in_range() {
        let mut dice = Dice::new(3);
        for _ in 0..200 {
            let v = dice.range_i64(15, 5);
            assert!((5..=15).contains(&v), "v={v}");
        }
    }

    #[test]
    fn pick_empty_is_none() {
        let mut dice = Dice::new(1);
        let empty: Vec<u32> = Vec::new();
        assert!(dice.pick(&empty).is_none());
    }

    #[test]
    fn weighted_index_skips_non_positive() {
        let mut dice = Dice::new(9);
        for _ in 0..100 {
            let idx = dice.weighted_index(&[0.0, 1.0, -2.0]).unwrap();
            assert_eq!(idx, 1);
        }
        assert!(dice.weighted_index(&[0.0, 0.0]).is_none());
        assert!(dice.weighted_index(&[]).is_none());
    }
}
