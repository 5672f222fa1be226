//! Customer taste preferences and how they evolve with feedback.
//!
//! A customer's preferences drift toward coffees they enjoyed and away from
//! coffees they disliked, one small probabilistic step at a time. Every
//! probability is scaled by the customer's `evolution_rate` (0.01–0.05),
//! fixed when the customer is created.
//!
//! # Serving feedback
//!
//! - satisfaction > 70: roast steps toward the served roast with
//!   probability `2 × rate`, flavor adopts the served flavor with
//!   probability `rate`, and strength takes a random nudge scaled by the
//!   served quality.
//! - satisfaction < 40: a matching roast steps one notch in a random
//!   direction with probability `rate`; a matching flavor is swapped for a
//!   different random one with probability `rate / 2`.
//!
//! # Natural drift
//!
//! Independently of service, once a week of simulated time has passed the
//! scalar preferences take a ±0.01 random walk and the roast may wander by
//! one notch.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use roastery_logic::preferences::{
//!     CustomerPreferences, EvolutionConfig, FlavorNote, RoastLevel, ServedCoffee,
//! };
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let config = EvolutionConfig::default();
//! let mut prefs = CustomerPreferences::random(&mut rng, 0.0);
//! let served = ServedCoffee { roast: RoastLevel::Dark, flavor: FlavorNote::Bitter, quality: 85.0 };
//!
//! for visit in 0..30 {
//!     prefs.evolve(&served, 90.0, visit as f64, &config, &mut rng);
//! }
//! assert_eq!(prefs.history.len(), config.history_cap);
//! assert!(prefs.scalars_in_range());
//! ```

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::flavor::FlavorProfile;
use crate::quality::RoastOutcome;
use crate::HOURS_PER_DAY;

/// Lower bound of every scalar preference.
pub const MIN_SCALAR: f32 = 0.1;
/// Upper bound of every scalar preference.
pub const MAX_SCALAR: f32 = 1.0;
/// Range of `evolution_rate` at creation.
pub const EVOLUTION_RATE_RANGE: (f32, f32) = (0.01, 0.05);

/// Setpoints at or above these temperatures (°C) read as medium / dark.
pub const MEDIUM_ROAST_TEMPERATURE: f64 = 195.0;
pub const DARK_ROAST_TEMPERATURE: f64 = 220.0;

/// Ordered three-level roast scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoastLevel {
    Light,
    Medium,
    Dark,
}

impl RoastLevel {
    pub const ALL: [RoastLevel; 3] = [RoastLevel::Light, RoastLevel::Medium, RoastLevel::Dark];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Level at `index`, clamped to the scale.
    pub fn from_index(index: i64) -> Self {
        Self::ALL[index.clamp(0, Self::ALL.len() as i64 - 1) as usize]
    }

    /// Move `delta` notches, staying on the scale.
    pub fn shifted(self, delta: i64) -> Self {
        Self::from_index(self.index() as i64 + delta)
    }

    /// One notch toward `target` (unchanged if already there).
    pub fn step_toward(self, target: RoastLevel) -> Self {
        match self.cmp(&target) {
            std::cmp::Ordering::Less => self.shifted(1),
            std::cmp::Ordering::Greater => self.shifted(-1),
            std::cmp::Ordering::Equal => self,
        }
    }

    /// Roast level implied by a fixed roasting setpoint.
    pub fn from_temperature(temperature: f64) -> Self {
        if temperature >= DARK_ROAST_TEMPERATURE {
            RoastLevel::Dark
        } else if temperature >= MEDIUM_ROAST_TEMPERATURE {
            RoastLevel::Medium
        } else {
            RoastLevel::Light
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RoastLevel::Light => "light",
            RoastLevel::Medium => "medium",
            RoastLevel::Dark => "dark",
        }
    }
}

/// Unordered flavor descriptor a customer gravitates toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlavorNote {
    Fruity,
    Floral,
    Spicy,
    Bitter,
    Sweet,
}

impl FlavorNote {
    pub const ALL: [FlavorNote; 5] = [
        FlavorNote::Fruity,
        FlavorNote::Floral,
        FlavorNote::Spicy,
        FlavorNote::Bitter,
        FlavorNote::Sweet,
    ];

    /// Note suggested by the most pronounced dimension of a cup.
    ///
    /// Acidity reads fruity, aroma floral, body spicy, bitterness bitter
    /// and sweetness sweet. Ties go to the earlier entry in that list.
    pub fn dominant(profile: &FlavorProfile) -> Self {
        let candidates = [
            (FlavorNote::Fruity, profile.acidity),
            (FlavorNote::Floral, profile.aroma),
            (FlavorNote::Spicy, profile.body),
            (FlavorNote::Bitter, profile.bitterness),
            (FlavorNote::Sweet, profile.sweetness),
        ];
        let mut best = candidates[0];
        for candidate in &candidates[1..] {
            if candidate.1 > best.1 {
                best = *candidate;
            }
        }
        best.0
    }

    pub fn name(self) -> &'static str {
        match self {
            FlavorNote::Fruity => "fruity",
            FlavorNote::Floral => "floral",
            FlavorNote::Spicy => "spicy",
            FlavorNote::Bitter => "bitter",
            FlavorNote::Sweet => "sweet",
        }
    }
}

/// What the customer was actually served.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServedCoffee {
    pub roast: RoastLevel,
    pub flavor: FlavorNote,
    /// Cupping score, 0–100.
    pub quality: f64,
}

impl ServedCoffee {
    /// Describe a roast outcome the way a customer perceives it.
    pub fn from_outcome(outcome: &RoastOutcome) -> Self {
        Self {
            roast: RoastLevel::from_temperature(outcome.temperature),
            flavor: FlavorNote::dominant(&outcome.profile),
            quality: f64::from(outcome.quality),
        }
    }

    /// `quality / 100`, clamped to [0, 1].
    pub fn quality_factor(&self) -> f32 {
        if self.quality.is_nan() {
            return 0.0;
        }
        (self.quality / 100.0).clamp(0.0, 1.0) as f32
    }
}

/// One remembered serving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceHistoryEntry {
    /// Simulation hour of the serving.
    pub timestamp: f64,
    pub satisfaction: f64,
    pub served: ServedCoffee,
}

/// Tuning for preference evolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Maximum remembered servings; oldest dropped first.
    pub history_cap: usize,
    /// Satisfaction strictly above this pulls preferences toward the cup.
    pub like_threshold: f64,
    /// Satisfaction strictly below this pushes preferences away.
    pub dislike_threshold: f64,
    /// Simulated hours between natural drift steps.
    pub drift_interval_hours: f64,
    /// Maximum scalar change per drift step.
    pub drift_step: f32,
    /// Chance that a drift step also moves the roast.
    pub drift_roast_probability: f32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            history_cap: 20,
            like_threshold: 70.0,
            dislike_threshold: 40.0,
            drift_interval_hours: 7.0 * HOURS_PER_DAY,
            drift_step: 0.01,
            drift_roast_probability: 0.1,
        }
    }
}

/// Taste preferences owned by a single customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerPreferences {
    pub roast: RoastLevel,
    pub flavor: FlavorNote,
    pub strength: f32,
    pub sweetness: f32,
    pub acidity: f32,
    /// Simulation hour of the last natural drift (or creation).
    pub last_updated: f64,
    /// Per-event change probability scale, fixed at creation.
    pub evolution_rate: f32,
    pub history: VecDeque<PreferenceHistoryEntry>,
}

/// What a single `evolve` call changed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PreferenceShift {
    pub roast_from: Option<RoastLevel>,
    pub flavor_from: Option<FlavorNote>,
    pub strength_delta: f32,
}

impl PreferenceShift {
    pub fn is_categorical(&self) -> bool {
        self.roast_from.is_some() || self.flavor_from.is_some()
    }
}

fn clamp_scalar(v: f32) -> f32 {
    if v.is_nan() {
        return MIN_SCALAR;
    }
    v.clamp(MIN_SCALAR, MAX_SCALAR)
}

fn chance(rng: &mut impl Rng, probability: f32) -> bool {
    rng.gen::<f32>() < probability
}

fn random_direction(rng: &mut impl Rng) -> i64 {
    if rng.gen::<bool>() {
        1
    } else {
        -1
    }
}

impl CustomerPreferences {
    /// Build preferences with every field clamped into range.
    pub fn new(
        roast: RoastLevel,
        flavor: FlavorNote,
        strength: f32,
        sweetness: f32,
        acidity: f32,
        evolution_rate: f32,
        now: f64,
    ) -> Self {
        Self {
            roast,
            flavor,
            strength: clamp_scalar(strength),
            sweetness: clamp_scalar(sweetness),
            acidity: clamp_scalar(acidity),
            last_updated: now,
            evolution_rate: clamp_rate(evolution_rate),
            history: VecDeque::new(),
        }
    }

    /// Random preferences within the documented ranges.
    pub fn random(rng: &mut impl Rng, now: f64) -> Self {
        let roast = RoastLevel::ALL[rng.gen_range(0..RoastLevel::ALL.len())];
        let flavor = FlavorNote::ALL[rng.gen_range(0..FlavorNote::ALL.len())];
        Self::new(
            roast,
            flavor,
            rng.gen_range(MIN_SCALAR..=MAX_SCALAR),
            rng.gen_range(MIN_SCALAR..=MAX_SCALAR),
            rng.gen_range(MIN_SCALAR..=MAX_SCALAR),
            rng.gen_range(EVOLUTION_RATE_RANGE.0..=EVOLUTION_RATE_RANGE.1),
            now,
        )
    }

    /// Strength, sweetness and acidity all lie in [0.1, 1.0].
    pub fn scalars_in_range(&self) -> bool {
        [self.strength, self.sweetness, self.acidity]
            .iter()
            .all(|v| (MIN_SCALAR..=MAX_SCALAR).contains(v))
    }

    /// Mean satisfaction over remembered servings.
    pub fn average_satisfaction(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.history.iter().map(|h| h.satisfaction).sum::<f64>() / self.history.len() as f64)
    }

    fn remember(&mut self, entry: PreferenceHistoryEntry, cap: usize) {
        self.history.push_back(entry);
        while self.history.len() > cap {
            self.history.pop_front();
        }
    }

    /// Apply feedback from one serving.
    pub fn evolve(
        &mut self,
        served: &ServedCoffee,
        satisfaction: f64,
        now: f64,
        config: &EvolutionConfig,
        rng: &mut impl Rng,
    ) -> PreferenceShift {
        self.remember(
            PreferenceHistoryEntry {
                timestamp: now,
                satisfaction,
                served: *served,
            },
            config.history_cap,
        );

        let rate = self.evolution_rate;
        let mut shift = PreferenceShift::default();

        if satisfaction > config.like_threshold {
            if chance(rng, rate * 2.0) {
                let next = self.roast.step_toward(served.roast);
                if next != self.roast {
                    shift.roast_from = Some(self.roast);
                    self.roast = next;
                }
            }

            if chance(rng, rate) && self.flavor != served.flavor {
                shift.flavor_from = Some(self.flavor);
                self.flavor = served.flavor;
            }

            let span = rate * served.quality_factor();
            let nudge = if span > 0.0 {
                rng.gen_range(-span..=span)
            } else {
                0.0
            };
            let before = self.strength;
            self.strength = clamp_scalar(self.strength + nudge);
            shift.strength_delta = self.strength - before;
        } else if satisfaction < config.dislike_threshold {
            if self.roast == served.roast && chance(rng, rate) {
                let next = self.roast.shifted(random_direction(rng));
                if next != self.roast {
                    shift.roast_from = Some(self.roast);
                    self.roast = next;
                }
            }

            if self.flavor == served.flavor && chance(rng, rate * 0.5) {
                let others: Vec<FlavorNote> = FlavorNote::ALL
                    .iter()
                    .copied()
                    .filter(|f| *f != served.flavor)
                    .collect();
                shift.flavor_from = Some(self.flavor);
                self.flavor = others[rng.gen_range(0..others.len())];
            }
        }

        shift
    }

    /// Whether a natural drift step is due at `now`.
    pub fn drift_due(&self, now: f64, config: &EvolutionConfig) -> bool {
        now - self.last_updated >= config.drift_interval_hours
    }

    /// Run one natural drift step if a drift interval has elapsed.
    ///
    /// Returns `true` when a step ran.
    pub fn drift(&mut self, now: f64, config: &EvolutionConfig, rng: &mut impl Rng) -> bool {
        if !self.drift_due(now, config) {
            return false;
        }

        let step = config.drift_step.abs();
        for value in [&mut self.strength, &mut self.sweetness, &mut self.acidity] {
            let walk = if step > 0.0 {
                rng.gen_range(-step..=step)
            } else {
                0.0
            };
            *value = clamp_scalar(*value + walk);
        }

        if chance(rng, config.drift_roast_probability) {
            self.roast = self.roast.shifted(random_direction(rng));
        }

        self.last_updated = now;
        true
    }

    /// Re-establish every invariant after loading from an untrusted source.
    pub fn sanitize(&mut self, config: &EvolutionConfig) {
        self.strength = clamp_scalar(self.strength);
        self.sweetness = clamp_scalar(self.sweetness);
        self.acidity = clamp_scalar(self.acidity);
        self.evolution_rate = clamp_rate(self.evolution_rate);
        while self.history.len() > config.history_cap {
            self.history.pop_front();
        }
    }
}

fn clamp_rate(rate: f32) -> f32 {
    if rate.is_nan() {
        return EVOLUTION_RATE_RANGE.0;
    }
    rate.clamp(EVOLUTION_RATE_RANGE.0, EVOLUTION_RATE_RANGE.1)
}
