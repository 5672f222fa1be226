//! Per-customer identity and visit bookkeeping.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable external identifier of a customer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CustomerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Loyalty a new customer starts with.
pub const STARTING_LOYALTY: f64 = 50.0;

/// Visit history and loyalty of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    /// Cups served.
    pub visits: u32,
    /// 0–100.
    pub loyalty: f64,
    /// Consecutive interactions in which the customer was ignored.
    pub ignored_streak: u32,
    /// Most recent interaction satisfactions, oldest first.
    pub recent_satisfaction: VecDeque<f64>,
    /// Simulation hour of the last interaction of any kind.
    pub last_seen: Option<f64>,
}

impl Default for CustomerStats {
    fn default() -> Self {
        Self {
            visits: 0,
            loyalty: STARTING_LOYALTY,
            ignored_streak: 0,
            recent_satisfaction: VecDeque::new(),
            last_seen: None,
        }
    }
}

impl CustomerStats {
    /// Remember `satisfaction`, keeping at most `window` entries.
    pub fn push_satisfaction(&mut self, satisfaction: f64, window: usize) {
        self.recent_satisfaction.push_back(satisfaction);
        while self.recent_satisfaction.len() > window {
            self.recent_satisfaction.pop_front();
        }
    }

    /// Whether the last `n` satisfactions all satisfy `pred`.
    ///
    /// `false` until at least `n` have been recorded.
    pub fn last_n_all(&self, n: usize, pred: impl Fn(f64) -> bool) -> bool {
        n > 0
            && self.recent_satisfaction.len() >= n
            && self.recent_satisfaction.iter().rev().take(n).all(|s| pred(*s))
    }

    pub fn latest_satisfaction(&self) -> Option<f64> {
        self.recent_satisfaction.back().copied()
    }

    pub fn adjust_loyalty(&mut self, delta: f64) {
        self.loyalty = (self.loyalty + delta).clamp(0.0, 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfaction_window_is_bounded() {
        let mut stats = CustomerStats::default();
        for s in [10.0, 20.0, 30.0, 40.0] {
            stats.push_satisfaction(s, 3);
        }
        assert_eq!(stats.recent_satisfaction, VecDeque::from(vec![20.0, 30.0, 40.0]));
        assert_eq!(stats.latest_satisfaction(), Some(40.0));
    }

    #[test]
    fn last_n_needs_a_full_window() {
        let mut stats = CustomerStats::default();
        stats.push_satisfaction(90.0, 3);
        stats.push_satisfaction(90.0, 3);
        assert!(!stats.last_n_all(3, |s| s > 75.0));
        stats.push_satisfaction(80.0, 3);
        assert!(stats.last_n_all(3, |s| s > 75.0));
        stats.push_satisfaction(70.0, 3);
        assert!(!stats.last_n_all(3, |s| s > 75.0));
    }

    #[test]
    fn loyalty_is_clamped() {
        let mut stats = CustomerStats::default();
        stats.adjust_loyalty(80.0);
        assert_eq!(stats.loyalty, 100.0);
        stats.adjust_loyalty(-500.0);
        assert_eq!(stats.loyalty, 0.0);
    }

    #[test]
    fn ids_display_verbatim() {
        let id = CustomerId::from("regular-7");
        assert_eq!(id.to_string(), "regular-7");
        assert_eq!(id.as_str(), "regular-7");
    }
}
