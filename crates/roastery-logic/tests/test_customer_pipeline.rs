//! Integration tests for the roast → satisfaction → adaptation pipeline.
//!
//! Exercises: roast → ServedCoffee → evaluate → evolve / drift,
//! and trigger-driven personality adaptation with context moods.
//!
//! All tests are pure logic with seeded RNGs.

use rand::rngs::StdRng;
use rand::SeedableRng;

use roastery_logic::flavor::BeanArchetype;
use roastery_logic::personality::{
    AdaptationConfig, BehaviorSign, InteractionContext, PersonalityProfile, TraitKind, Trigger,
    Weather,
};
use roastery_logic::preferences::{
    CustomerPreferences, EvolutionConfig, FlavorNote, RoastLevel, ServedCoffee,
};
use roastery_logic::quality::{classify_phase, roast};
use roastery_logic::satisfaction::{evaluate, evaluate_scored};
use roastery_logic::HOURS_PER_DAY;

// ── Helpers ────────────────────────────────────────────────────────────

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn customer(roast: RoastLevel, flavor: FlavorNote) -> CustomerPreferences {
    CustomerPreferences::new(roast, flavor, 0.5, 0.5, 0.5, 0.05, 0.0)
}

// ── Roasting pipeline ──────────────────────────────────────────────────

#[test]
fn roast_pipeline_is_deterministic() {
    let a = roast(215.0, 600.0, "Arabica", 11.0, &[]);
    let b = roast(215.0, 600.0, "arabica", 11.0, &[]);
    assert_eq!(a, b);
    assert_eq!(a.archetype, Some(BeanArchetype::Arabica));
    assert!(a.quality <= 100);
    assert!(a.profile.is_bounded());
}

#[test]
fn served_descriptor_reflects_setpoint() {
    let light = ServedCoffee::from_outcome(&roast(185.0, 480.0, "arabica", 12.0, &[]));
    let dark = ServedCoffee::from_outcome(&roast(230.0, 720.0, "robusta", 10.0, &[]));
    assert_eq!(light.roast, RoastLevel::Light);
    assert_eq!(dark.roast, RoastLevel::Dark);
    assert!((0.0..=100.0).contains(&light.quality));
}

#[test]
fn defects_lower_quality_only() {
    let clean = roast(205.0, 600.0, "liberica", 11.0, &[]);
    let flawed = roast(205.0, 600.0, "liberica", 11.0, &["quaker", "scorching", "tipping"]);
    assert_eq!(clean.profile, flawed.profile);
    assert_eq!(clean.quality - flawed.quality, 6);
}

#[test]
fn phase_lookup_matches_pipeline() {
    for temp in [100.0, 150.0, 190.0, 225.0, 250.0] {
        let outcome = roast(temp, 300.0, "excelsa", 12.0, &[]);
        assert_eq!(outcome.phase, classify_phase(temp).map(|p| p.name));
    }
}

// ── Satisfaction ───────────────────────────────────────────────────────

#[test]
fn satisfaction_in_range_for_any_roast() {
    let mut r = rng(1);
    for temp in (140..=260).step_by(15) {
        for bean in ["arabica", "robusta", "liberica", "excelsa", "mystery"] {
            let outcome = roast(temp as f64, 600.0, bean, 12.0, &[]);
            let prefs = CustomerPreferences::random(&mut r, 0.0);
            let personality = PersonalityProfile::random(&mut r, &AdaptationConfig::default());
            let s = evaluate(&outcome.profile, &prefs, &personality);
            assert!((0.0..=100.0).contains(&s), "{temp} {bean}: {s}");
        }
    }
}

#[test]
fn mood_can_tip_satisfaction() {
    let outcome = roast(215.0, 720.0, "excelsa", 10.0, &[]);
    let mut profile = outcome.profile;
    profile.complexity = 8.0;
    let prefs = customer(RoastLevel::Medium, FlavorNote::Floral);

    let mut personality = PersonalityProfile::default();
    personality.assign_traits(
        [roastery_logic::personality::PersonalityTrait::new(TraitKind::Adventurous, 0.65, 0.5)],
        &AdaptationConfig::default(),
    );
    let calm = evaluate_scored(&profile, 80.0, &prefs, &personality);

    // A sunny morning doesn't touch adventurousness; the mood map only
    // carries the traits it names.
    personality.apply_context(&InteractionContext {
        hour: 7.0,
        weather: Weather::Sunny,
        stress: 0.0,
        busyness: 0.2,
    });
    assert_eq!(evaluate_scored(&profile, 80.0, &prefs, &personality), calm);

    personality
        .mood_modifiers
        .insert(TraitKind::Adventurous, 0.1);
    let excited = evaluate_scored(&profile, 80.0, &prefs, &personality);
    assert!((excited - calm - 10.0).abs() < 1e-9);
}

// ── Preference evolution ───────────────────────────────────────────────

#[test]
fn repeated_dislike_moves_roast_away() {
    let config = EvolutionConfig::default();
    let disliked = ServedCoffee {
        roast: RoastLevel::Medium,
        flavor: FlavorNote::Bitter,
        quality: 35.0,
    };
    let mut moved = 0;
    for seed in 0..200 {
        let mut r = rng(seed);
        let mut prefs = customer(RoastLevel::Medium, FlavorNote::Sweet);
        for visit in 0..25 {
            prefs.evolve(&disliked, 20.0, visit as f64, &config, &mut r);
            assert!(prefs.roast.index() <= 2);
            assert!(prefs.scalars_in_range());
        }
        if prefs.roast != RoastLevel::Medium {
            moved += 1;
        }
    }
    // 25 events at 5% each: roughly 72% of customers move.
    assert!(moved > 100, "only {moved} of 200 moved");

    let mut r = rng(99);
    let mut prefs = customer(RoastLevel::Medium, FlavorNote::Sweet);
    for visit in 0..2000 {
        prefs.evolve(&disliked, 20.0, visit as f64, &config, &mut r);
    }
    assert_ne!(prefs.roast, RoastLevel::Medium);
}

#[test]
fn week_of_service_with_drift() {
    let config = EvolutionConfig::default();
    let mut r = rng(7);
    let mut prefs = CustomerPreferences::random(&mut r, 0.0);
    let outcome = roast(210.0, 600.0, "arabica", 11.0, &[]);
    let served = ServedCoffee::from_outcome(&outcome);

    let mut drifts = 0;
    for hour in 0..(HOURS_PER_DAY as u32 * 60) {
        let now = hour as f64;
        if hour % 8 == 0 {
            let s = evaluate(&outcome.profile, &prefs, &());
            prefs.evolve(&served, s, now, &config, &mut r);
        }
        if prefs.drift(now, &config, &mut r) {
            drifts += 1;
        }
        assert!(prefs.scalars_in_range());
        assert!(prefs.history.len() <= 20);
    }
    // Days 7, 14, ..., 56.
    assert_eq!(drifts, 8);
}

// ── Personality adaptation ─────────────────────────────────────────────

#[test]
fn ignored_twice_same_day_applies_once() {
    let config = AdaptationConfig::default();
    let mut p = PersonalityProfile::default();
    assert!(p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.2, 9.0, &config));
    let once = p.core_intensity(TraitKind::Impatient);
    assert!(!p.adapt(Trigger::IgnoredRepeatedly, BehaviorSign::Positive, 0.2, 17.0, &config));
    assert_eq!(p.core_intensity(TraitKind::Impatient), once);
    assert_eq!(p.adaptation_history.len(), 1);
}

#[test]
fn long_random_trigger_sequence_keeps_invariants() {
    use rand::Rng;

    let config = AdaptationConfig::default();
    let mut r = rng(2024);
    let mut p = PersonalityProfile::random(&mut r, &config);
    let mut now = 0.0;
    for _ in 0..1000 {
        now += r.gen_range(0.0..48.0);
        let trigger = Trigger::ALL[r.gen_range(0..Trigger::ALL.len())];
        let sign = if r.gen_bool(0.5) {
            BehaviorSign::Positive
        } else {
            BehaviorSign::Negative
        };
        p.adapt(trigger, sign, r.gen_range(0.01..0.4), now, &config);
        if r.gen_bool(0.1) {
            p.resolve_conflicts(&config);
        }
        for t in p.core_traits.values() {
            assert!(t.intensity >= 0.2 && t.intensity <= 1.0);
        }
        assert!(p.adaptation_history.len() <= 20);
    }
}

#[test]
fn effective_intensity_never_exceeds_one() {
    let config = AdaptationConfig::default();
    let mut r = rng(5);
    let mut p = PersonalityProfile::random(&mut r, &config);
    p.apply_context(&InteractionContext {
        hour: 6.0,
        weather: Weather::Stormy,
        stress: 1.0,
        busyness: 1.0,
    });
    for kind in TraitKind::ALL {
        let e = p.effective_intensity(kind);
        assert!((0.0..=1.0).contains(&e));
    }
}
