//! Roastery Headless Simulation Harness
//!
//! Sweeps the roasting pipeline and runs a simulated shop of customers
//! through weeks of service, checking invariants along the way.
//! Runs entirely in-process: no storage, no rendering.
//!
//! Usage:
//!   cargo run -p roastery-simtest
//!   cargo run -p roastery-simtest -- --verbose
//!   RUST_LOG=roastery_core=info cargo run -p roastery-simtest
//!   cargo run -p roastery-simtest -- --config tuning.json

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roastery_core::learning::InteractionEvent;
use roastery_core::persistence::{load_customer, store_customer, MemoryStore};
use roastery_core::prelude::*;
use roastery_logic::compounds::{baseline_concentrations, lowest_threshold};
use roastery_logic::flavor::BeanArchetype;
use roastery_logic::kinetics::simulate;
use roastery_logic::personality::{
    BehaviorSign, InteractionContext, PersonalityProfile, Trigger, Weather,
};
use roastery_logic::preferences::{CustomerPreferences, RoastLevel, ServedCoffee};
use roastery_logic::quality::{roast, score};
use roastery_logic::HOURS_PER_DAY;
use tracing_subscriber::EnvFilter;

const SEED: u64 = 0x00c0_ffee;
const SHOP_CUSTOMERS: usize = 40;
const SHOP_DAYS: u32 = 60;

// ── Logging ─────────────────────────────────────────────────────────────

/// Route `log` records from the core crates through a tracing subscriber.
/// `--verbose` forces debug output; otherwise `RUST_LOG` applies, defaulting to warnings.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

struct Args {
    verbose: bool,
    config: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args {
        verbose: false,
        config: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--config" => args.config = iter.next(),
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }
    args
}

fn load_config(path: Option<&str>) -> Result<RegistryConfig, String> {
    let Some(path) = path else {
        return Ok(RegistryConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    RegistryConfig::from_json(&text).map_err(|e| format!("{}: {}", path, e))
}

fn main() {
    let args = parse_args();
    let verbose = args.verbose;
    init_logging(verbose);
    println!("=== Roastery Simulation Harness ===\n");

    let config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("could not load config: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();

    // 1. Chemistry sweep
    results.extend(validate_chemistry(verbose));

    // 2. Flavor & quality sweep
    results.extend(validate_roasting(verbose));

    // 3. Preference evolution
    results.extend(validate_preferences(&config, verbose));

    // 4. Personality adaptation
    results.extend(validate_personality(&config, verbose));

    // 5. Simulated shop
    results.extend(validate_shop(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn temperatures() -> impl Iterator<Item = f64> {
    (0..=30).map(|i| 100.0 + i as f64 * 5.0)
}

fn durations() -> impl Iterator<Item = f64> {
    (0..=12).map(|i| i as f64 * 120.0)
}

// ── 1. Chemistry ────────────────────────────────────────────────────────

fn validate_chemistry(verbose: bool) -> Vec<TestResult> {
    println!("--- Chemistry ---");
    let mut results = Vec::new();

    let mut runs = 0;
    let mut bad = Vec::new();
    for t in temperatures() {
        for d in durations() {
            for moisture in [0.0, 11.0, 40.0] {
                runs += 1;
                let run = simulate(t, d, moisture);
                if run.concentrations.iter().any(|c| !c.is_finite() || *c < 0.0) {
                    bad.push(format!("{}°C/{}s/{}%", t, d, moisture));
                }
            }
        }
    }
    results.push(check(
        "chem_concentrations_valid",
        bad.is_empty(),
        if bad.is_empty() {
            format!("{} runs, all concentrations finite and non-negative", runs)
        } else {
            format!("{} bad runs, first {}", bad.len(), bad[0])
        },
    ));

    let cold = lowest_threshold() - 1.0;
    let inert = simulate(cold, 1800.0, 11.0);
    results.push(check(
        "chem_inert_below_threshold",
        inert.concentrations == baseline_concentrations(),
        format!("{:.0}°C for 30 min leaves baselines untouched", cold),
    ));

    let short = simulate(220.0, 9.0, 11.0);
    results.push(check(
        "chem_partial_step_ignored",
        short.steps == 0,
        format!("9 s integrates {} steps", short.steps),
    ));

    if verbose {
        let hot = simulate(230.0, 720.0, 11.0);
        for (id, c) in hot.iter() {
            println!("    {:>24}: {:>12.2} mg/kg", id.key(), c);
        }
    }
    results
}

// ── 2. Roasting ─────────────────────────────────────────────────────────

fn validate_roasting(verbose: bool) -> Vec<TestResult> {
    println!("--- Roasting ---");
    let mut results = Vec::new();

    let archetypes: Vec<&str> = BeanArchetype::ALL
        .iter()
        .map(|a| a.name())
        .chain(["unknown"])
        .collect();

    let mut count = 0;
    let mut unbounded = 0;
    let mut out_of_range = 0;
    let mut best: Option<(u32, f64, f64, &str)> = None;
    for t in temperatures() {
        for d in durations() {
            for name in &archetypes {
                count += 1;
                let outcome = roast(t, d, name, 11.0, &[]);
                if !outcome.profile.is_bounded() {
                    unbounded += 1;
                }
                if outcome.quality > 100 {
                    out_of_range += 1;
                }
                if best.map_or(true, |(q, ..)| outcome.quality > q) {
                    best = Some((outcome.quality, t, d, *name));
                }
            }
        }
    }
    results.push(check(
        "roast_profiles_bounded",
        unbounded == 0,
        format!("{}/{} profiles within [0, 10]", count - unbounded, count),
    ));
    results.push(check(
        "roast_scores_in_range",
        out_of_range == 0,
        format!("{} roasts scored within [0, 100]", count),
    ));
    if let Some((q, t, d, name)) = best {
        results.push(check(
            "roast_best_found",
            q > 0,
            format!("best {} at {}°C for {}s ({})", q, t, d, name),
        ));
    }

    let clean = roast(210.0, 600.0, "arabica", 11.0, &[]);
    let mut monotone = true;
    let mut last = clean.quality;
    for n in 1..=60 {
        let defects = vec!["defect"; n];
        let q = score(&clean.profile, &defects);
        monotone &= q <= last;
        last = q;
    }
    results.push(check(
        "roast_defects_never_help",
        monotone && last == 0,
        format!("{} clean, {} with 60 defects", clean.quality, last),
    ));

    let robusta = roast(210.0, 600.0, "robusta", 11.0, &[]);
    results.push(check(
        "roast_robusta_more_bitter",
        robusta.profile.bitterness >= clean.profile.bitterness,
        format!(
            "bitterness {:.2} robusta vs {:.2} arabica",
            robusta.profile.bitterness, clean.profile.bitterness
        ),
    ));

    if verbose {
        println!("    sample cup: {:?}", clean.profile);
    }
    results
}

// ── 3. Preferences ──────────────────────────────────────────────────────

fn validate_preferences(config: &RegistryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Preferences ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SEED);

    let mut violations = 0;
    let mut history_overflow = 0;
    let mut shifts = 0;
    for _ in 0..200 {
        let mut prefs = CustomerPreferences::random(&mut rng, 0.0);
        for event in 0..100 {
            let served = ServedCoffee {
                roast: RoastLevel::ALL[rng.gen_range(0..RoastLevel::ALL.len())],
                flavor: prefs.flavor,
                quality: rng.gen_range(0.0..=100.0),
            };
            let satisfaction = rng.gen_range(0.0..=100.0);
            let shift = prefs.evolve(&served, satisfaction, event as f64, &config.evolution, &mut rng);
            if shift.is_categorical() {
                shifts += 1;
            }
            if !prefs.scalars_in_range() {
                violations += 1;
            }
            if prefs.history.len() > config.evolution.history_cap {
                history_overflow += 1;
            }
        }
    }
    results.push(check(
        "prefs_scalars_in_range",
        violations == 0,
        format!("20000 evolve steps, {} out-of-range states", violations),
    ));
    results.push(check(
        "prefs_history_capped",
        history_overflow == 0,
        format!("history never exceeded {}", config.evolution.history_cap),
    ));
    results.push(check(
        "prefs_categorical_shifts",
        shifts > 0,
        format!("{} roast/flavor shifts", shifts),
    ));

    let mut prefs = CustomerPreferences::random(&mut rng, 0.0);
    let mut drifts = 0;
    for day in 0..=70 {
        if prefs.drift(day as f64 * HOURS_PER_DAY, &config.evolution, &mut rng) {
            drifts += 1;
        }
    }
    let expected = (70.0 * HOURS_PER_DAY / config.evolution.drift_interval_hours).floor() as u32;
    results.push(check(
        "prefs_weekly_drift",
        drifts == expected,
        format!("{} drifts over 70 days (expected {})", drifts, expected),
    ));

    if verbose {
        println!("    sample: {:?}", prefs);
    }
    results
}

// ── 4. Personality ──────────────────────────────────────────────────────

fn validate_personality(config: &RegistryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Personality ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);
    let adaptation = &config.adaptation;

    let mut bad_intensity = 0;
    let mut cooldown_breaches = 0;
    let mut applied = 0;
    for _ in 0..200 {
        let mut profile = PersonalityProfile::random(&mut rng, adaptation);
        let mut last_applied: Option<f64> = None;
        for step in 0..200 {
            let now = step as f64 * 3.0;
            let trigger = Trigger::ALL[rng.gen_range(0..Trigger::ALL.len())];
            let sign = if rng.gen_bool(0.8) {
                BehaviorSign::Positive
            } else {
                BehaviorSign::Negative
            };
            if profile.adapt(trigger, sign, config.trigger_delta, now, adaptation) {
                applied += 1;
                if last_applied.is_some_and(|t| now - t < adaptation.cooldown_hours) {
                    cooldown_breaches += 1;
                }
                last_applied = Some(now);
            }
            if step % 8 == 0 {
                profile.resolve_conflicts(adaptation);
                profile.apply_context(&InteractionContext {
                    hour: rng.gen_range(0.0..24.0),
                    weather: [Weather::Sunny, Weather::Cloudy, Weather::Rainy, Weather::Stormy]
                        [rng.gen_range(0..4)],
                    stress: rng.gen_range(0.0..=1.0),
                    busyness: rng.gen_range(0.0..=1.0),
                });
            }
            let out_of_range = profile.core_traits.values().any(|t| {
                !(adaptation.removal_threshold..=1.0).contains(&t.intensity)
            }) || profile
                .core_traits
                .keys()
                .any(|k| !(0.0..=1.0).contains(&profile.effective_intensity(*k)));
            if out_of_range {
                bad_intensity += 1;
            }
        }
        if profile.adaptation_history.len() > adaptation.history_cap {
            bad_intensity += 1;
        }
    }
    results.push(check(
        "personality_intensities_valid",
        bad_intensity == 0,
        format!("{} states outside bounds", bad_intensity),
    ));
    results.push(check(
        "personality_cooldown_honored",
        cooldown_breaches == 0 && applied > 0,
        format!("{} adaptations, {} inside cooldown", applied, cooldown_breaches),
    ));

    if verbose {
        let profile = PersonalityProfile::random(&mut rng, adaptation);
        println!("    sample traits: {:?}", profile.dominant_traits());
    }
    results
}

// ── 5. Shop ─────────────────────────────────────────────────────────────

fn validate_shop(config: &RegistryConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Shop ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(SEED ^ 2);
    let mut registry = CustomerRegistry::with_seed(config.clone(), SEED);

    let names: Vec<String> = (0..SHOP_CUSTOMERS).map(|i| format!("guest-{:02}", i)).collect();
    let mut loyalty_breaches = 0;
    let mut adaptations = 0;
    let mut drifted = 0;

    for day in 0..SHOP_DAYS {
        let opening = day as f64 * HOURS_PER_DAY + 7.0;
        let context = InteractionContext {
            hour: 7.0,
            weather: [Weather::Sunny, Weather::Cloudy, Weather::Rainy, Weather::Stormy]
                [rng.gen_range(0..4)],
            stress: rng.gen_range(0.0..=0.6),
            busyness: rng.gen_range(0.0..=1.0),
        };
        drifted += registry.update(opening, &context);

        for (slot, name) in names.iter().enumerate() {
            if !rng.gen_bool(0.4) {
                continue;
            }
            let now = opening + slot as f64 * 0.2;
            let report = if rng.gen_bool(0.1) {
                registry.record_interaction(name.as_str(), &InteractionEvent::Ignored, &context, now)
            } else {
                let archetype = BeanArchetype::ALL[rng.gen_range(0..BeanArchetype::ALL.len())];
                let outcome = roast(
                    rng.gen_range(180.0..=235.0),
                    rng.gen_range(360.0..=900.0),
                    archetype.name(),
                    rng.gen_range(9.0..=13.0),
                    &[],
                );
                registry.serve(name.as_str(), &outcome, now)
            };
            if !(0.0..=100.0).contains(&report.loyalty) {
                loyalty_breaches += 1;
            }
            adaptations += report.adaptations.len();
        }
    }

    results.push(check(
        "shop_customers_registered",
        registry.customer_count() == SHOP_CUSTOMERS,
        format!("{} customers after {} days", registry.customer_count(), SHOP_DAYS),
    ));
    results.push(check(
        "shop_loyalty_bounded",
        loyalty_breaches == 0,
        format!("{} adaptations, {} drift steps", adaptations, drifted),
    ));

    let analytics = registry.all_analytics();
    let invariant_breaks = analytics
        .iter()
        .filter(|a| {
            !a.preferences.scalars_in_range()
                || a.preferences.history.len() > config.evolution.history_cap
                || a.adaptations > config.adaptation.history_cap
        })
        .count();
    results.push(check(
        "shop_customer_invariants",
        invariant_breaks == 0,
        format!("{}/{} customers consistent", analytics.len() - invariant_breaks, analytics.len()),
    ));

    let mut bytes = Vec::new();
    let snapshot = registry
        .save(&mut bytes)
        .map_err(|e| e.to_string())
        .and_then(|()| {
            let mut restored = CustomerRegistry::new();
            restored.load(&bytes[..]).map_err(|e| e.to_string())?;
            Ok(restored)
        });
    results.push(match snapshot {
        Ok(restored) => check(
            "shop_snapshot_round_trip",
            restored.all_analytics() == analytics && restored.metrics == registry.metrics,
            format!("{} bytes, {} customers", bytes.len(), restored.customer_count()),
        ),
        Err(e) => check("shop_snapshot_round_trip", false, e),
    });

    let mut store = MemoryStore::new();
    let mut stored = 0;
    for id in registry.customer_ids() {
        if let (Some(prefs), Some(personality)) = (registry.preferences(&id), registry.personality(&id)) {
            if store_customer(&mut store, &id, &prefs, &personality).is_ok() {
                let (p, q) = load_customer(&store, &id, config, &mut rng, registry.sim_time);
                if p == prefs && q == personality {
                    stored += 1;
                }
            }
        }
    }
    results.push(check(
        "shop_records_round_trip",
        stored == SHOP_CUSTOMERS,
        format!("{}/{} customer records restored exactly", stored, SHOP_CUSTOMERS),
    ));

    let insights = registry.insights();
    results.push(check(
        "shop_metrics_sane",
        (0.0..=100.0).contains(&registry.metrics.average_satisfaction)
            && registry.metrics.total_interactions > 0,
        format!(
            "{} interactions, avg satisfaction {:.1}, {} loyal",
            registry.metrics.total_interactions,
            registry.metrics.average_satisfaction,
            insights.loyal_customers.len()
        ),
    ));

    if verbose {
        for line in insights.strengths.iter().chain(&insights.improvements) {
            println!("    {}", line);
        }
        for a in analytics.iter().take(5) {
            println!(
                "    {}: {} visits, loyalty {:.0}, {:?}",
                a.id, a.visits, a.loyalty, a.dominant_traits
            );
        }
    }
    results
}
