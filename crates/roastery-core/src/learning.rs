//! Interaction scoring, trigger derivation and operator-facing metrics.
//!
//! Everything here is plain data in, plain data out; the registry owns the
//! state and decides when to call it.

use std::fmt;

use roastery_logic::personality::{InteractionContext, TraitKind, Trigger};
use roastery_logic::preferences::{CustomerPreferences, FlavorNote, PreferenceShift, ServedCoffee};
use serde::{Deserialize, Serialize};

use crate::components::{CustomerId, CustomerStats};
use crate::config::RegistryConfig;

/// Something the operator did (or failed to do) for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionEvent {
    CoffeeServed {
        /// Cupping score, 0–100.
        quality: f64,
        response_seconds: Option<f64>,
        /// What was in the cup, if known. Drives preference evolution.
        served: Option<ServedCoffee>,
    },
    OrderTaken {
        response_seconds: Option<f64>,
    },
    Ignored,
    RecommendationGiven,
}

impl InteractionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionEvent::CoffeeServed { .. } => "coffee_served",
            InteractionEvent::OrderTaken { .. } => "order_taken",
            InteractionEvent::Ignored => "customer_ignored",
            InteractionEvent::RecommendationGiven => "recommendation_given",
        }
    }

    pub fn response_seconds(&self) -> Option<f64> {
        match self {
            InteractionEvent::CoffeeServed {
                response_seconds, ..
            }
            | InteractionEvent::OrderTaken { response_seconds } => *response_seconds,
            _ => None,
        }
    }
}

/// Satisfaction an interaction produces on its own, 0–100.
///
/// Served coffee starts from its quality, gains 10 for a reply under 30 s,
/// loses 20 past 120 s, and gains another 15 for a sub-minute reply in a
/// rush (busyness above 0.8).
pub fn event_satisfaction(event: &InteractionEvent, context: &InteractionContext) -> f64 {
    let satisfaction = match event {
        InteractionEvent::CoffeeServed {
            quality,
            response_seconds,
            ..
        } => {
            let mut s = if quality.is_nan() { 50.0 } else { *quality };
            if let Some(t) = response_seconds {
                if *t < 30.0 {
                    s += 10.0;
                } else if *t > 120.0 {
                    s -= 20.0;
                }
                if context.busyness > 0.8 && *t < 60.0 {
                    s += 15.0;
                }
            }
            s
        }
        InteractionEvent::OrderTaken { response_seconds } => match response_seconds {
            Some(t) if *t < 10.0 => 70.0,
            _ => 60.0,
        },
        InteractionEvent::Ignored => {
            if context.busyness > 0.7 {
                30.0
            } else {
                20.0
            }
        }
        InteractionEvent::RecommendationGiven => 70.0,
    };
    satisfaction.clamp(0.0, 100.0)
}

/// How a customer visibly reacts to an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerMood {
    Delighted,
    Happy,
    Neutral,
    Disappointed,
    Angry,
}

impl CustomerMood {
    pub fn from_satisfaction(satisfaction: f64) -> Self {
        if satisfaction > 80.0 {
            CustomerMood::Delighted
        } else if satisfaction > 60.0 {
            CustomerMood::Happy
        } else if satisfaction > 40.0 {
            CustomerMood::Neutral
        } else if satisfaction > 20.0 {
            CustomerMood::Disappointed
        } else {
            CustomerMood::Angry
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CustomerMood::Delighted => "delighted",
            CustomerMood::Happy => "happy",
            CustomerMood::Neutral => "neutral",
            CustomerMood::Disappointed => "disappointed",
            CustomerMood::Angry => "angry",
        }
    }
}

impl fmt::Display for CustomerMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Triggers implied by the latest interaction.
///
/// `stats` must already include the interaction. `served` and
/// `flavor_before` are only set for served coffee.
pub fn derive_triggers(
    stats: &CustomerStats,
    satisfaction: f64,
    served: Option<&ServedCoffee>,
    flavor_before: Option<FlavorNote>,
    config: &RegistryConfig,
) -> Vec<Trigger> {
    let mut triggers = Vec::new();
    let window = config.trigger_window;

    if stats.last_n_all(window, |s| s > config.good_service_threshold) {
        triggers.push(Trigger::ConsistentlyGoodService);
    }
    if stats.last_n_all(window, |s| s < config.poor_service_threshold) {
        triggers.push(Trigger::ConsistentlyPoorService);
    }
    if stats.ignored_streak >= config.ignored_streak_trigger && config.ignored_streak_trigger > 0 {
        triggers.push(Trigger::IgnoredRepeatedly);
    }
    if let Some(served) = served {
        if satisfaction >= config.perfect_service_threshold
            && stats.visits >= config.regular_min_visits
        {
            triggers.push(Trigger::PerfectMemoryService);
        }
        if flavor_before.is_some_and(|f| f != served.flavor)
            && satisfaction > config.new_flavor_threshold
        {
            triggers.push(Trigger::IntroducedToNewFlavors);
        }
    }

    triggers
}

/// Loyalty change produced by one interaction.
pub fn loyalty_delta(satisfaction: f64, config: &RegistryConfig) -> f64 {
    if satisfaction > config.loyalty_gain_threshold {
        config.loyalty_gain
    } else if satisfaction < config.loyalty_loss_threshold {
        -config.loyalty_loss
    } else {
        0.0
    }
}

/// Shop-wide running averages of how the operator is doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalMetrics {
    pub total_interactions: u64,
    pub average_satisfaction: f64,
    /// Seconds.
    pub average_service_time: f64,
    /// Grows each time a returning customer is served well.
    pub specialty_recognition: f64,
}

impl Default for GlobalMetrics {
    fn default() -> Self {
        Self {
            total_interactions: 0,
            average_satisfaction: 50.0,
            average_service_time: 60.0,
            specialty_recognition: 0.0,
        }
    }
}

impl GlobalMetrics {
    /// Fold one interaction into the running averages.
    pub fn record(&mut self, satisfaction: f64, response_seconds: Option<f64>, returning: bool) {
        self.total_interactions += 1;
        let weight = 1.0 / self.total_interactions as f64;
        self.average_satisfaction = self.average_satisfaction * (1.0 - weight) + satisfaction * weight;
        if let Some(t) = response_seconds.filter(|t| t.is_finite()) {
            self.average_service_time = self.average_service_time * (1.0 - weight) + t * weight;
        }
        if returning && satisfaction > 70.0 {
            self.specialty_recognition += 0.1;
        }
    }
}

/// Feedback for the operator, derived from metrics and customer loyalty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerInsights {
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub loyal_customers: Vec<CustomerId>,
    pub recommendations: Vec<String>,
}

impl PlayerInsights {
    /// `customers` yields `(id, loyalty, visits)`.
    pub fn generate<'a>(
        metrics: &GlobalMetrics,
        customers: impl IntoIterator<Item = (&'a CustomerId, f64, u32)>,
    ) -> Self {
        let mut insights = Self::default();

        if metrics.average_satisfaction > 75.0 {
            insights.strengths.push("Excellent customer satisfaction!".to_string());
        }
        if metrics.average_service_time < 45.0 {
            insights.strengths.push("Quick and efficient service".to_string());
        }
        if metrics.specialty_recognition > 5.0 {
            insights
                .strengths
                .push("Great at remembering regular customers".to_string());
        }

        if metrics.average_satisfaction < 50.0 {
            insights
                .improvements
                .push("Focus on coffee quality and consistency".to_string());
        }
        if metrics.average_service_time > 90.0 {
            insights
                .improvements
                .push("Try to serve customers more quickly".to_string());
        }

        insights.loyal_customers = customers
            .into_iter()
            .filter(|(_, loyalty, visits)| *loyalty > 80.0 && *visits > 3)
            .map(|(id, _, _)| id.clone())
            .collect();
        insights.loyal_customers.sort();

        if !insights.loyal_customers.is_empty() {
            insights.recommendations.push(
                "You have loyal customers! Consider special offers for regulars.".to_string(),
            );
        }
        if metrics.average_satisfaction > 70.0 && metrics.total_interactions > 20 {
            insights.recommendations.push(
                "You're ready for more challenging customers and complex orders!".to_string(),
            );
        }

        insights
    }
}

/// Snapshot of one customer for dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerAnalytics {
    pub id: CustomerId,
    pub visits: u32,
    pub loyalty: f64,
    pub mood: Option<CustomerMood>,
    /// Mean satisfaction over remembered servings.
    pub average_satisfaction: Option<f64>,
    pub preferences: CustomerPreferences,
    /// Strongest first.
    pub dominant_traits: Vec<TraitKind>,
    pub adaptations: usize,
}

/// What one interaction did to a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReport {
    pub customer: CustomerId,
    pub satisfaction: f64,
    pub mood: CustomerMood,
    pub loyalty: f64,
    pub visits: u32,
    /// Triggers the interaction implied.
    pub triggers: Vec<Trigger>,
    /// Triggers that passed the cooldown and changed the personality.
    pub adaptations: Vec<Trigger>,
    pub preference_shift: PreferenceShift,
}
