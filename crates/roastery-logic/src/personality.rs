//! Customer personality: traits, discrete adaptation triggers, and moods.
//!
//! A profile holds a small set of core traits. Discrete triggers (good or
//! poor service, being ignored, ...) strengthen and weaken specific traits,
//! at most once per simulated day. A trait whose intensity would fall below
//! [`AdaptationConfig::removal_threshold`] is removed outright.
//!
//! Mood modifiers are transient bonuses derived from the situation (time of
//! day, weather, stress). They are replaced wholesale on every
//! [`PersonalityProfile::apply_context`] and never touch core traits.
//!
//! ```
//! use roastery_logic::personality::{
//!     AdaptationConfig, BehaviorSign, PersonalityProfile, TraitKind, Trigger,
//! };
//!
//! let config = AdaptationConfig::default();
//! let mut profile = PersonalityProfile::default();
//!
//! assert!(profile.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.3, 10.0, &config));
//! // Same day: cooldown holds.
//! assert!(!profile.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.3, 20.0, &config));
//!
//! assert!(profile.core_intensity(TraitKind::Impatient) > 0.5);
//! assert_eq!(profile.adaptation_history.len(), 1);
//! ```

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::satisfaction::TraitIntensities;
use crate::HOURS_PER_DAY;

/// Upper bound of any intensity.
pub const MAX_INTENSITY: f32 = 1.0;

/// Closed set of personality traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TraitKind {
    Adventurous,
    Picky,
    Patient,
    Impatient,
    Grumpy,
    Friendly,
    Loyal,
}

impl TraitKind {
    pub const ALL: [TraitKind; 7] = [
        TraitKind::Adventurous,
        TraitKind::Picky,
        TraitKind::Patient,
        TraitKind::Impatient,
        TraitKind::Grumpy,
        TraitKind::Friendly,
        TraitKind::Loyal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TraitKind::Adventurous => "adventurous",
            TraitKind::Picky => "picky",
            TraitKind::Patient => "patient",
            TraitKind::Impatient => "impatient",
            TraitKind::Grumpy => "grumpy",
            TraitKind::Friendly => "friendly",
            TraitKind::Loyal => "loyal",
        }
    }

    /// Traits that cannot comfortably coexist with this one.
    pub fn opposites(self) -> &'static [TraitKind] {
        match self {
            TraitKind::Patient => &[TraitKind::Impatient],
            TraitKind::Impatient => &[TraitKind::Patient],
            TraitKind::Friendly => &[TraitKind::Grumpy],
            TraitKind::Grumpy => &[TraitKind::Friendly],
            TraitKind::Adventurous => &[TraitKind::Picky],
            TraitKind::Picky => &[TraitKind::Adventurous],
            TraitKind::Loyal => &[],
        }
    }

    /// Traits this one reinforces when both are present.
    pub fn synergies(self) -> &'static [TraitKind] {
        match self {
            TraitKind::Friendly => &[TraitKind::Loyal],
            TraitKind::Loyal => &[TraitKind::Friendly],
            TraitKind::Impatient => &[TraitKind::Grumpy],
            TraitKind::Grumpy => &[TraitKind::Impatient],
            TraitKind::Adventurous => &[TraitKind::Friendly],
            TraitKind::Patient => &[TraitKind::Loyal],
            TraitKind::Picky => &[],
        }
    }
}

impl fmt::Display for TraitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One core trait of a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    pub kind: TraitKind,
    pub intensity: f32,
    /// Resistance to change. Persisted, not used for gating.
    pub stability: f32,
    pub opposites: Vec<TraitKind>,
    pub synergies: Vec<TraitKind>,
}

impl PersonalityTrait {
    pub fn new(kind: TraitKind, intensity: f32, stability: f32) -> Self {
        Self {
            kind,
            intensity: intensity.clamp(0.1, MAX_INTENSITY),
            stability: stability.clamp(0.1, 1.0),
            opposites: kind.opposites().to_vec(),
            synergies: kind.synergies().to_vec(),
        }
    }
}

/// Discrete behavioral event that reshapes a personality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    ConsistentlyGoodService,
    ConsistentlyPoorService,
    IgnoredRepeatedly,
    PerfectMemoryService,
    IntroducedToNewFlavors,
}

/// Whether a trait is the main target of a trigger or a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reach {
    Primary,
    Secondary,
}

pub type Effects = &'static [(TraitKind, Reach)];

impl Trigger {
    pub const ALL: [Trigger; 5] = [
        Trigger::ConsistentlyGoodService,
        Trigger::ConsistentlyPoorService,
        Trigger::IgnoredRepeatedly,
        Trigger::PerfectMemoryService,
        Trigger::IntroducedToNewFlavors,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Trigger::ConsistentlyGoodService => "consistently_good_service",
            Trigger::ConsistentlyPoorService => "consistently_poor_service",
            Trigger::IgnoredRepeatedly => "ignored_repeatedly",
            Trigger::PerfectMemoryService => "perfect_memory_service",
            Trigger::IntroducedToNewFlavors => "introduced_to_new_flavors",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// `(strengthened, weakened)` traits under positive behavior.
    pub fn effects(self) -> (Effects, Effects) {
        use Reach::*;
        use TraitKind::*;
        match self {
            Trigger::ConsistentlyGoodService => (&[(Loyal, Primary), (Friendly, Secondary)], &[(Grumpy, Primary)]),
            Trigger::ConsistentlyPoorService => (&[(Grumpy, Primary), (Impatient, Secondary)], &[(Loyal, Primary)]),
            Trigger::IgnoredRepeatedly => (&[(Impatient, Primary), (Grumpy, Secondary)], &[(Patient, Primary)]),
            Trigger::PerfectMemoryService => (&[(Loyal, Primary), (Friendly, Secondary)], &[]),
            Trigger::IntroducedToNewFlavors => (&[(Adventurous, Primary)], &[(Picky, Secondary)]),
        }
    }

    fn description(self, sign: BehaviorSign) -> &'static str {
        match (self, sign) {
            (Trigger::ConsistentlyGoodService, BehaviorSign::Positive) => "warming up after a run of good service",
            (Trigger::ConsistentlyPoorService, BehaviorSign::Positive) => "souring after a run of poor service",
            (Trigger::IgnoredRepeatedly, BehaviorSign::Positive) => "losing patience after being ignored",
            (Trigger::PerfectMemoryService, BehaviorSign::Positive) => "touched that their order was remembered",
            (Trigger::IntroducedToNewFlavors, BehaviorSign::Positive) => "opening up to new flavors",
            (_, BehaviorSign::Negative) => "reacting against the usual pattern",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Direction of the operator's behavior relative to the trigger.
///
/// `Negative` swaps which traits are strengthened and weakened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorSign {
    Positive,
    Negative,
}

impl BehaviorSign {
    pub fn factor(self) -> f32 {
        match self {
            BehaviorSign::Positive => 1.0,
            BehaviorSign::Negative => -1.0,
        }
    }
}

/// One applied adaptation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationRecord {
    pub timestamp: f64,
    pub trigger: Trigger,
    pub description: String,
    /// `sign × delta`.
    pub intensity_delta: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
}

/// Situation a customer is in when their mood is computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionContext {
    /// Hour of the day, 0–24.
    pub hour: f32,
    pub weather: Weather,
    /// 0 (calm) to 1 (frantic).
    pub stress: f32,
    /// How crowded the shop is, 0–1.
    pub busyness: f32,
}

impl Default for InteractionContext {
    fn default() -> Self {
        Self {
            hour: 12.0,
            weather: Weather::Cloudy,
            stress: 0.0,
            busyness: 0.0,
        }
    }
}

/// Tuning for personality adaptation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Minimum simulated hours between successful adaptations.
    pub cooldown_hours: f64,
    pub history_cap: usize,
    /// Traits below this intensity are removed.
    pub removal_threshold: f32,
    /// Weakening never takes a trait below this.
    pub intensity_floor: f32,
    /// Scale on delta for secondary effects.
    pub secondary_scale: f32,
    /// Factor applied to the weaker trait of an opposing pair.
    pub conflict_damping: f32,
    /// Factor applied to a trait reinforced by a synergy partner.
    pub synergy_boost: f32,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            cooldown_hours: HOURS_PER_DAY,
            history_cap: 20,
            removal_threshold: 0.2,
            intensity_floor: 0.1,
            secondary_scale: 0.7,
            conflict_damping: 0.6,
            synergy_boost: 1.2,
        }
    }
}

impl AdaptationConfig {
    fn scale(&self, reach: Reach) -> f32 {
        match reach {
            Reach::Primary => 1.0,
            Reach::Secondary => self.secondary_scale,
        }
    }
}

/// Personality state owned by a single customer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonalityProfile {
    pub core_traits: BTreeMap<TraitKind, PersonalityTrait>,
    pub mood_modifiers: BTreeMap<TraitKind, f32>,
    pub adaptation_history: VecDeque<AdaptationRecord>,
    /// Simulation hour of the last successful adaptation.
    pub last_update: Option<f64>,
}

impl PersonalityProfile {
    /// 2–3 distinct random traits, reconciled.
    pub fn random(rng: &mut impl Rng, config: &AdaptationConfig) -> Self {
        let count = rng.gen_range(2..=3);
        let kinds: Vec<TraitKind> = TraitKind::ALL.choose_multiple(rng, count).copied().collect();
        let traits = kinds
            .into_iter()
            .map(|kind| {
                PersonalityTrait::new(kind, rng.gen_range(0.3..=1.0), rng.gen_range(0.1..=1.0))
            })
            .collect::<Vec<_>>();

        let mut profile = Self::default();
        profile.assign_traits(traits, config);
        profile
    }

    pub fn has_trait(&self, kind: TraitKind) -> bool {
        self.core_traits.contains_key(&kind)
    }

    /// Core intensity, `0.0` when absent.
    pub fn core_intensity(&self, kind: TraitKind) -> f32 {
        self.core_traits.get(&kind).map_or(0.0, |t| t.intensity)
    }

    /// Core intensity plus mood, clamped to [0, 1].
    pub fn effective_intensity(&self, kind: TraitKind) -> f32 {
        let mood = self.mood_modifiers.get(&kind).copied().unwrap_or(0.0);
        (self.core_intensity(kind) + mood).clamp(0.0, MAX_INTENSITY)
    }

    /// Kinds currently present, strongest first.
    pub fn dominant_traits(&self) -> Vec<TraitKind> {
        let mut traits: Vec<&PersonalityTrait> = self.core_traits.values().collect();
        traits.sort_by(|a, b| b.intensity.total_cmp(&a.intensity));
        traits.into_iter().map(|t| t.kind).collect()
    }

    /// Whether the adaptation cooldown has elapsed at `now`.
    pub fn can_adapt(&self, now: f64, config: &AdaptationConfig) -> bool {
        match self.last_update {
            Some(last) => now - last >= config.cooldown_hours,
            None => true,
        }
    }

    /// Apply a discrete trigger.
    ///
    /// Returns `false` without changing anything while the cooldown holds
    /// or when `delta` is not a positive number.
    pub fn adapt(
        &mut self,
        trigger: Trigger,
        sign: BehaviorSign,
        delta: f32,
        now: f64,
        config: &AdaptationConfig,
    ) -> bool {
        if !self.can_adapt(now, config) || delta.is_nan() || delta <= 0.0 {
            return false;
        }

        let (strengthen, weaken) = match sign {
            BehaviorSign::Positive => trigger.effects(),
            BehaviorSign::Negative => {
                let (s, w) = trigger.effects();
                (w, s)
            }
        };

        for &(kind, reach) in strengthen {
            self.strengthen_trait(kind, delta * config.scale(reach), config);
        }
        for &(kind, reach) in weaken {
            self.weaken_trait(kind, delta * config.scale(reach), config);
        }

        self.adaptation_history.push_back(AdaptationRecord {
            timestamp: now,
            trigger,
            description: trigger.description(sign).to_string(),
            intensity_delta: sign.factor() * delta,
        });
        while self.adaptation_history.len() > config.history_cap {
            self.adaptation_history.pop_front();
        }
        self.last_update = Some(now);
        true
    }

    /// Raise a trait by `delta`, creating it at `min(1, 2 × delta)` if absent.
    pub fn strengthen_trait(&mut self, kind: TraitKind, delta: f32, config: &AdaptationConfig) {
        match self.core_traits.get_mut(&kind) {
            Some(t) => t.intensity = (t.intensity + delta).min(MAX_INTENSITY),
            None => {
                let intensity = (delta * 2.0).min(MAX_INTENSITY);
                if intensity >= config.removal_threshold {
                    self.core_traits
                        .insert(kind, PersonalityTrait::new(kind, intensity, 0.5));
                }
            }
        }
    }

    /// Lower a trait by `delta`, removing it once below the threshold.
    pub fn weaken_trait(&mut self, kind: TraitKind, delta: f32, config: &AdaptationConfig) {
        let Some(t) = self.core_traits.get_mut(&kind) else {
            return;
        };
        t.intensity = (t.intensity - delta).max(config.intensity_floor);
        if t.intensity < config.removal_threshold {
            self.core_traits.remove(&kind);
        }
    }

    /// Damp opposing pairs, then let synergy partners reinforce each other.
    ///
    /// Relations are read from each trait's own `opposites` and `synergies`.
    pub fn resolve_conflicts(&mut self, config: &AdaptationConfig) {
        let opposites: Vec<(TraitKind, Vec<TraitKind>)> = self
            .core_traits
            .values()
            .map(|t| (t.kind, t.opposites.clone()))
            .collect();

        let mut damped: Vec<(TraitKind, TraitKind)> = Vec::new();
        for (kind, others) in &opposites {
            for &opposite in others {
                if opposite == *kind {
                    continue;
                }
                // Each pair once.
                let pair = if *kind < opposite {
                    (*kind, opposite)
                } else {
                    (opposite, *kind)
                };
                if damped.contains(&pair) {
                    continue;
                }
                let (Some(a), Some(b)) = (
                    self.core_traits.get(kind).map(|t| t.intensity),
                    self.core_traits.get(&opposite).map(|t| t.intensity),
                ) else {
                    continue;
                };
                damped.push(pair);
                let weaker = if a <= b { *kind } else { opposite };
                if let Some(t) = self.core_traits.get_mut(&weaker) {
                    t.intensity *= config.conflict_damping;
                    if t.intensity < config.removal_threshold {
                        self.core_traits.remove(&weaker);
                    }
                }
            }
        }

        let synergies: Vec<Vec<TraitKind>> = self
            .core_traits
            .values()
            .map(|t| t.synergies.clone())
            .collect();
        for partners in &synergies {
            for partner in partners {
                if let Some(t) = self.core_traits.get_mut(partner) {
                    t.intensity = (t.intensity * config.synergy_boost).min(MAX_INTENSITY);
                }
            }
        }
    }

    /// Replace the core trait set and reconcile it.
    pub fn assign_traits(
        &mut self,
        traits: impl IntoIterator<Item = PersonalityTrait>,
        config: &AdaptationConfig,
    ) {
        self.core_traits = traits
            .into_iter()
            .filter(|t| t.intensity >= config.removal_threshold)
            .map(|t| (t.kind, t))
            .collect();
        self.resolve_conflicts(config);
    }

    /// Recompute mood modifiers from scratch for `context`.
    pub fn apply_context(&mut self, context: &InteractionContext) {
        let mut mood: BTreeMap<TraitKind, f32> = BTreeMap::new();
        let mut add = |kind: TraitKind, amount: f32| *mood.entry(kind).or_insert(0.0) += amount;

        if context.stress > 0.6 {
            add(TraitKind::Impatient, context.stress * 0.5);
            add(TraitKind::Grumpy, context.stress * 0.3);
        }
        if (5.0..9.0).contains(&context.hour) {
            add(TraitKind::Impatient, 0.1);
        } else if context.hour >= 18.0 {
            add(TraitKind::Patient, 0.1);
        }
        match context.weather {
            Weather::Sunny => add(TraitKind::Friendly, 0.15),
            Weather::Rainy => add(TraitKind::Grumpy, 0.1),
            Weather::Stormy => add(TraitKind::Impatient, 0.15),
            Weather::Cloudy => {}
        }

        self.mood_modifiers = mood;
    }

    /// Re-establish every invariant after loading from an untrusted source.
    pub fn sanitize(&mut self, config: &AdaptationConfig) {
        self.core_traits.retain(|kind, t| {
            t.kind == *kind && t.intensity.is_finite() && t.intensity >= config.removal_threshold
        });
        for t in self.core_traits.values_mut() {
            t.intensity = t.intensity.min(MAX_INTENSITY);
            t.opposites = t.kind.opposites().to_vec();
            t.synergies = t.kind.synergies().to_vec();
            t.stability = if t.stability.is_finite() {
                t.stability.clamp(0.1, 1.0)
            } else {
                0.5
            };
        }
        while self.adaptation_history.len() > config.history_cap {
            self.adaptation_history.pop_front();
        }
    }
}

impl TraitIntensities for PersonalityProfile {
    fn intensity(&self, kind: TraitKind) -> f32 {
        self.effective_intensity(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> AdaptationConfig {
        AdaptationConfig::default()
    }

    fn profile_with(traits: &[(TraitKind, f32)]) -> PersonalityProfile {
        let mut p = PersonalityProfile::default();
        for &(kind, intensity) in traits {
            p.core_traits.insert(kind, PersonalityTrait::new(kind, intensity, 0.5));
        }
        p
    }

    fn assert_invariants(p: &PersonalityProfile) {
        for t in p.core_traits.values() {
            assert!(t.intensity >= 0.2 && t.intensity <= 1.0, "{:?}", t);
        }
        assert!(p.adaptation_history.len() <= 20);
    }

    #[test]
    fn relations_are_consistent() {
        for kind in TraitKind::ALL {
            for opposite in kind.opposites() {
                assert!(opposite.opposites().contains(&kind));
            }
            assert!(!kind.synergies().contains(&kind));
        }
    }

    #[test]
    fn cooldown_blocks_same_day() {
        let c = config();
        let mut p = PersonalityProfile::default();
        assert!(p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.2, 100.0, &c));
        let after_first = p.clone();
        assert!(!p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.2, 110.0, &c));
        assert_eq!(p, after_first);
        assert!(p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.2, 124.0, &c));
        assert_eq!(p.adaptation_history.len(), 2);
    }

    #[test]
    fn first_adaptation_is_never_gated() {
        let c = config();
        let mut p = PersonalityProfile::default();
        assert!(p.adapt(Trigger::PerfectMemoryService, BehaviorSign::Positive, 0.3, 0.0, &c));
        assert_eq!(p.last_update, Some(0.0));
    }

    #[test]
    fn absent_trait_created_at_double_delta() {
        let c = config();
        let mut p = PersonalityProfile::default();
        p.adapt(Trigger::ConsistentlyGoodService, BehaviorSign::Positive, 0.3, 0.0, &c);
        assert!((p.core_intensity(TraitKind::Loyal) - 0.6).abs() < 1e-6);
        assert!((p.core_intensity(TraitKind::Friendly) - 0.42).abs() < 1e-6);
    }

    #[test]
    fn tiny_delta_does_not_create_trait() {
        let c = config();
        let mut p = PersonalityProfile::default();
        p.strengthen_trait(TraitKind::Loyal, 0.05, &c);
        assert!(!p.has_trait(TraitKind::Loyal));
    }

    #[test]
    fn negative_sign_swaps_effects() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Loyal, 0.5), (TraitKind::Grumpy, 0.5)]);
        assert!(p.adapt(Trigger::ConsistentlyGoodService, BehaviorSign::Negative, 0.2, 0.0, &c));
        assert!((p.core_intensity(TraitKind::Grumpy) - 0.7).abs() < 1e-6);
        assert!((p.core_intensity(TraitKind::Loyal) - 0.3).abs() < 1e-6);
        assert!(!p.has_trait(TraitKind::Friendly));
        assert!((p.adaptation_history[0].intensity_delta + 0.2).abs() < 1e-6);
    }

    #[test]
    fn weakening_removes_below_threshold() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Patient, 0.3)]);
        p.weaken_trait(TraitKind::Patient, 0.05, &c);
        assert!((p.core_intensity(TraitKind::Patient) - 0.25).abs() < 1e-6);
        p.weaken_trait(TraitKind::Patient, 0.5, &c);
        assert!(!p.has_trait(TraitKind::Patient));
    }

    #[test]
    fn history_is_capped() {
        let c = config();
        let mut p = PersonalityProfile::default();
        for day in 0..50 {
            let trigger = Trigger::ALL[day % Trigger::ALL.len()];
            let sign = if day % 3 == 0 { BehaviorSign::Negative } else { BehaviorSign::Positive };
            assert!(p.adapt(trigger, sign, 0.15, day as f64 * 24.0, &c));
            assert_invariants(&p);
        }
        assert_eq!(p.adaptation_history.len(), 20);
        assert_eq!(p.adaptation_history.front().map(|r| r.timestamp), Some(30.0 * 24.0));
    }

    #[test]
    fn non_positive_delta_is_rejected() {
        let c = config();
        let mut p = PersonalityProfile::default();
        assert!(!p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.0, 0.0, &c));
        assert!(!p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, f32::NAN, 0.0, &c));
        assert_eq!(p.last_update, None);
    }

    #[test]
    fn conflicts_damp_the_weaker_trait_once() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Patient, 0.9), (TraitKind::Impatient, 0.5)]);
        p.resolve_conflicts(&c);
        assert!((p.core_intensity(TraitKind::Impatient) - 0.3).abs() < 1e-6);
        assert!((p.core_intensity(TraitKind::Patient) - 0.9).abs() < 1e-6);
    }

    #[test]
    fn conflicts_can_remove_a_trait() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Friendly, 0.8), (TraitKind::Grumpy, 0.3)]);
        p.resolve_conflicts(&c);
        assert!(!p.has_trait(TraitKind::Grumpy));
    }

    #[test]
    fn synergy_boosts_partner() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Adventurous, 0.5), (TraitKind::Friendly, 0.5)]);
        p.resolve_conflicts(&c);
        assert!((p.core_intensity(TraitKind::Friendly) - 0.6).abs() < 1e-6);
        assert!((p.core_intensity(TraitKind::Adventurous) - 0.5).abs() < 1e-6);

        let mut q = profile_with(&[(TraitKind::Friendly, 0.9), (TraitKind::Loyal, 0.9)]);
        q.resolve_conflicts(&c);
        assert_eq!(q.core_intensity(TraitKind::Friendly), 1.0);
        assert_eq!(q.core_intensity(TraitKind::Loyal), 1.0);
    }

    #[test]
    fn stored_relations_drive_conflicts() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Loyal, 0.9), (TraitKind::Picky, 0.5)]);
        if let Some(t) = p.core_traits.get_mut(&TraitKind::Loyal) {
            t.opposites = vec![TraitKind::Picky];
            t.synergies.clear();
        }
        p.resolve_conflicts(&c);
        assert!((p.core_intensity(TraitKind::Picky) - 0.3).abs() < 1e-6);
        assert!((p.core_intensity(TraitKind::Loyal) - 0.9).abs() < 1e-6);

        let mut q = profile_with(&[(TraitKind::Patient, 0.9), (TraitKind::Impatient, 0.5)]);
        for t in q.core_traits.values_mut() {
            t.opposites.clear();
        }
        q.resolve_conflicts(&c);
        assert!((q.core_intensity(TraitKind::Impatient) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sanitize_rebuilds_relations() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Friendly, 0.6), (TraitKind::Grumpy, 0.5)]);
        for t in p.core_traits.values_mut() {
            t.opposites = vec![TraitKind::Loyal];
            t.synergies = vec![TraitKind::Picky, TraitKind::Patient];
        }
        p.sanitize(&c);
        for (kind, t) in &p.core_traits {
            assert_eq!(t.opposites, kind.opposites().to_vec());
            assert_eq!(t.synergies, kind.synergies().to_vec());
        }
        p.resolve_conflicts(&c);
        assert!((p.core_intensity(TraitKind::Grumpy) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn context_replaces_mood() {
        let mut p = profile_with(&[(TraitKind::Impatient, 0.5)]);
        p.apply_context(&InteractionContext {
            hour: 7.0,
            weather: Weather::Stormy,
            stress: 0.8,
            busyness: 0.9,
        });
        assert!((p.mood_modifiers[&TraitKind::Impatient] - 0.65).abs() < 1e-6);
        assert!((p.mood_modifiers[&TraitKind::Grumpy] - 0.24).abs() < 1e-6);
        assert_eq!(p.effective_intensity(TraitKind::Impatient), 1.0);

        p.apply_context(&InteractionContext {
            hour: 20.0,
            weather: Weather::Sunny,
            ..InteractionContext::default()
        });
        assert!(!p.mood_modifiers.contains_key(&TraitKind::Impatient));
        assert!((p.effective_intensity(TraitKind::Patient) - 0.1).abs() < 1e-6);
        assert!((p.effective_intensity(TraitKind::Friendly) - 0.15).abs() < 1e-6);
        assert!((p.core_intensity(TraitKind::Impatient) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn calm_afternoon_has_no_mood() {
        let mut p = PersonalityProfile::default();
        p.apply_context(&InteractionContext::default());
        assert!(p.mood_modifiers.is_empty());
    }

    #[test]
    fn random_profiles_hold_invariants() {
        let c = config();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..300 {
            let p = PersonalityProfile::random(&mut rng, &c);
            assert!(p.core_traits.len() <= 3);
            assert!(p.last_update.is_none());
            assert_invariants(&p);
            for (kind, t) in &p.core_traits {
                assert_eq!(*kind, t.kind);
                assert!((0.1..=1.0).contains(&t.stability));
            }
        }
    }

    #[test]
    fn trigger_names_round_trip() {
        for trigger in Trigger::ALL {
            assert_eq!(Trigger::from_name(trigger.name()), Some(trigger));
        }
        assert_eq!(Trigger::from_name("spilled_coffee"), None);
    }

    #[test]
    fn sanitize_drops_invalid_traits() {
        let c = config();
        let mut p = profile_with(&[(TraitKind::Loyal, 0.5)]);
        if let Some(t) = p.core_traits.get_mut(&TraitKind::Loyal) {
            t.intensity = 0.05;
        }
        p.core_traits.insert(
            TraitKind::Picky,
            PersonalityTrait::new(TraitKind::Adventurous, 0.9, 0.5),
        );
        p.sanitize(&c);
        assert!(p.core_traits.is_empty());
    }
}
