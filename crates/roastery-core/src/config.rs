//! Registry tuning.
//!
//! Every field has a default, and missing JSON fields fall back to it, so a
//! config file only needs to name what it changes:
//!
//! ```
//! use roastery_core::config::RegistryConfig;
//!
//! let config = RegistryConfig::from_json(r#"{ "trigger_window": 5 }"#).unwrap();
//! assert_eq!(config.trigger_window, 5);
//! assert_eq!(config.evolution.history_cap, 20);
//! ```

use roastery_logic::personality::AdaptationConfig;
use roastery_logic::preferences::EvolutionConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub evolution: EvolutionConfig,
    pub adaptation: AdaptationConfig,

    /// Consecutive interactions considered by the service-streak triggers.
    pub trigger_window: usize,
    /// Every satisfaction in the window above this: good service.
    pub good_service_threshold: f64,
    /// Every satisfaction in the window below this: poor service.
    pub poor_service_threshold: f64,
    /// A cup at or above this, for a regular, is remembered service.
    pub perfect_service_threshold: f64,
    /// Visits (including the current one) before a customer is a regular.
    pub regular_min_visits: u32,
    /// A new flavor served above this satisfaction broadens taste.
    pub new_flavor_threshold: f64,
    /// Consecutive ignores that make a customer feel ignored.
    pub ignored_streak_trigger: u32,
    /// Intensity delta applied by service-driven triggers.
    pub trigger_delta: f32,

    /// Satisfaction above this raises loyalty by `loyalty_gain`.
    pub loyalty_gain_threshold: f64,
    pub loyalty_gain: f64,
    /// Satisfaction below this lowers loyalty by `loyalty_loss`.
    pub loyalty_loss_threshold: f64,
    pub loyalty_loss: f64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::default(),
            adaptation: AdaptationConfig::default(),
            trigger_window: 3,
            good_service_threshold: 75.0,
            poor_service_threshold: 40.0,
            perfect_service_threshold: 90.0,
            regular_min_visits: 3,
            new_flavor_threshold: 70.0,
            ignored_streak_trigger: 2,
            trigger_delta: 0.1,
            loyalty_gain_threshold: 80.0,
            loyalty_gain: 10.0,
            loyalty_loss_threshold: 50.0,
            loyalty_loss: 5.0,
        }
    }
}

impl RegistryConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(RegistryConfig::from_json("{}").unwrap(), RegistryConfig::default());
    }

    #[test]
    fn nested_overrides_keep_other_defaults() {
        let config = RegistryConfig::from_json(
            r#"{ "adaptation": { "cooldown_hours": 6.0 }, "loyalty_gain": 4.0 }"#,
        )
        .unwrap();
        assert_eq!(config.adaptation.cooldown_hours, 6.0);
        assert_eq!(config.adaptation.history_cap, 20);
        assert_eq!(config.loyalty_gain, 4.0);
        assert_eq!(config.loyalty_loss, 5.0);
    }

    #[test]
    fn json_round_trip() {
        let mut config = RegistryConfig::default();
        config.trigger_delta = 0.25;
        config.evolution.drift_step = 0.02;
        let text = config.to_json().unwrap();
        assert_eq!(RegistryConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(RegistryConfig::from_json("{ trigger_window: ").is_err());
    }
}
