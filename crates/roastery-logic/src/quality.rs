//! Cupping score, roasting phases, and the end-to-end roast pipeline.
//!
//! # Scoring
//!
//! The score follows the shape of an SCA cupping form. Seven terms are
//! each scaled from a 0–10 dimension:
//!
//! | Term | Points |
//! |------|-------:|
//! | Aroma | 15 |
//! | Flavor (mean of sweetness, acidity, body) | 15 |
//! | Aftertaste | 15 |
//! | Acidity | 15 |
//! | Body | 15 |
//! | Balance | 15 |
//! | Overall (complexity) | 10 |
//!
//! Each defect costs 2 points. The result is floored at 0 and rounded.
//!
//! # Phases
//!
//! Phase classification is a linear scan of [`ROASTING_PHASES`]. The first
//! phase whose temperature band contains the setpoint wins. Duration bands
//! are descriptive metadata and are not used to filter.
//!
//! ```
//! use roastery_logic::quality::{classify_phase, roast};
//!
//! assert_eq!(classify_phase(150.0).map(|p| p.name), Some("Drying Phase"));
//! assert!(classify_phase(260.0).is_none());
//!
//! let outcome = roast(205.0, 720.0, "arabica", 12.0, &[]);
//! assert!(outcome.quality <= 100);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flavor::{flavor_profile, BeanArchetype, FlavorProfile};

/// Points deducted per cupping defect.
pub const DEFECT_PENALTY: f64 = 2.0;

/// Roasts shorter than this (seconds) are flagged as underdeveloped.
pub const SHORT_ROAST_SECONDS: f64 = 300.0;

/// Roasts longer than this (seconds) are flagged as over-extracted.
pub const LONG_ROAST_SECONDS: f64 = 900.0;

/// Static description of one roasting phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoastingPhase {
    pub name: &'static str,
    /// Inclusive temperature band (°C).
    pub temperature_range: (f64, f64),
    /// Typical duration band (seconds). Informational only.
    pub duration_range: (f64, f64),
    pub dominant_reactions: &'static [&'static str],
    pub key_compounds_formed: &'static [&'static str],
}

impl RoastingPhase {
    pub fn contains_temperature(&self, temperature: f64) -> bool {
        temperature >= self.temperature_range.0 && temperature <= self.temperature_range.1
    }
}

/// Ordered phase catalog. Bands overlap; the earlier phase wins.
pub const ROASTING_PHASES: [RoastingPhase; 3] = [
    RoastingPhase {
        name: "Drying Phase",
        temperature_range: (80.0, 160.0),
        duration_range: (240.0, 480.0),
        dominant_reactions: &["moisture_evaporation", "protein_denaturation"],
        key_compounds_formed: &["aldehydes", "organic_acids"],
    },
    RoastingPhase {
        name: "Maillard Phase",
        temperature_range: (140.0, 200.0),
        duration_range: (180.0, 360.0),
        dominant_reactions: &["maillard_reaction", "strecker_degradation"],
        key_compounds_formed: &["maillard_products", "pyrazines", "furans"],
    },
    RoastingPhase {
        name: "Development Phase",
        temperature_range: (180.0, 230.0),
        duration_range: (60.0, 180.0),
        dominant_reactions: &["caramelization", "pyrolysis"],
        key_compounds_formed: &["caramelization_products", "quinides"],
    },
];

/// First phase whose temperature band contains `temperature`.
pub fn classify_phase(temperature: f64) -> Option<&'static RoastingPhase> {
    ROASTING_PHASES
        .iter()
        .find(|phase| phase.contains_temperature(temperature))
}

/// Unrounded cupping score before the defect penalty.
pub fn raw_score(profile: &FlavorProfile) -> f64 {
    let flavor = (profile.sweetness + profile.acidity + profile.body) / 3.0;
    (profile.aroma / 10.0) * 15.0
        + (flavor / 10.0) * 15.0
        + (profile.aftertaste / 10.0) * 15.0
        + (profile.acidity / 10.0) * 15.0
        + (profile.body / 10.0) * 15.0
        + (profile.balance / 10.0) * 15.0
        + (profile.complexity / 10.0) * 10.0
}

/// Cupping score in [0, 100].
pub fn score(profile: &FlavorProfile, defects: &[&str]) -> u32 {
    let penalty = defects.len() as f64 * DEFECT_PENALTY;
    let total = (raw_score(profile) - penalty).max(0.0);
    if total.is_nan() {
        return 0;
    }
    total.round().min(100.0) as u32
}

/// Result of one roast: profile, cupping score, phase at the setpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastOutcome {
    pub temperature: f64,
    pub time_seconds: f64,
    pub archetype: Option<BeanArchetype>,
    pub profile: FlavorProfile,
    pub quality: u32,
    pub phase: Option<&'static str>,
}

/// Full pipeline: simulate, synthesize, score, classify.
///
/// `archetype` is matched case-insensitively; unknown names apply no
/// multiplier.
pub fn roast(
    temperature: f64,
    time_seconds: f64,
    archetype: &str,
    moisture_percent: f64,
    defects: &[&str],
) -> RoastOutcome {
    let bean = BeanArchetype::parse(archetype);
    let profile = flavor_profile(temperature, time_seconds, bean, moisture_percent);
    RoastOutcome {
        temperature,
        time_seconds,
        archetype: bean,
        profile,
        quality: score(&profile, defects),
        phase: classify_phase(temperature).map(|p| p.name),
    }
}

/// Warning attached to roasts outside the usual duration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWarning {
    Underdeveloped,
    OverExtracted,
}

/// Human-readable breakdown of a roast, for the analytics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoastAnalysis {
    pub quality: u32,
    pub phase: Option<&'static RoastingPhase>,
    pub time_seconds: f64,
    pub profile: FlavorProfile,
    pub acidity_note: &'static str,
    pub sweetness_note: &'static str,
    pub body_note: &'static str,
    pub bitterness_note: &'static str,
    pub time_warning: Option<TimeWarning>,
}

impl RoastAnalysis {
    pub fn new(profile: &FlavorProfile, temperature: f64, time_seconds: f64) -> Self {
        let time_warning = if time_seconds < SHORT_ROAST_SECONDS {
            Some(TimeWarning::Underdeveloped)
        } else if time_seconds > LONG_ROAST_SECONDS {
            Some(TimeWarning::OverExtracted)
        } else {
            None
        };

        Self {
            quality: score(profile, &[]),
            phase: classify_phase(temperature),
            time_seconds,
            profile: *profile,
            acidity_note: band(profile.acidity, 4.0, 7.0, ["Flat", "Balanced", "Bright"]),
            sweetness_note: band(profile.sweetness, 4.0, 7.0, ["Lacking", "Moderate", "Sweet"]),
            body_note: band(profile.body, 4.0, 7.0, ["Light", "Medium", "Full"]),
            bitterness_note: band(profile.bitterness, 3.0, 7.0, ["Mild", "Present", "Strong"]),
            time_warning,
        }
    }
}

fn band(value: f64, low: f64, high: f64, labels: [&'static str; 3]) -> &'static str {
    if value > high {
        labels[2]
    } else if value < low {
        labels[0]
    } else {
        labels[1]
    }
}

impl fmt::Display for RoastAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.profile;
        writeln!(f, "Coffee Analysis:")?;
        writeln!(f, "SCA Score: {}/100", self.quality)?;
        writeln!(
            f,
            "Current Phase: {}",
            self.phase.map(|ph| ph.name).unwrap_or("Unknown")
        )?;
        writeln!(f, "Roast Time: {}s", self.time_seconds.round())?;
        writeln!(f)?;
        writeln!(f, "Flavor Profile:")?;
        writeln!(f, "• Acidity: {:.1}/10 ({})", p.acidity, self.acidity_note)?;
        writeln!(f, "• Sweetness: {:.1}/10 ({})", p.sweetness, self.sweetness_note)?;
        writeln!(f, "• Body: {:.1}/10 ({})", p.body, self.body_note)?;
        writeln!(f, "• Bitterness: {:.1}/10 ({})", p.bitterness, self.bitterness_note)?;
        writeln!(f, "• Balance: {:.1}/10", p.balance)?;
        writeln!(f, "• Complexity: {:.1}/10", p.complexity)?;

        match self.time_warning {
            Some(TimeWarning::Underdeveloped) => {
                writeln!(f, "\nShort roast time - may result in underdeveloped flavors")?
            }
            Some(TimeWarning::OverExtracted) => {
                writeln!(f, "\nLong roast time - risk of over-extraction and dullness")?
            }
            None => {}
        }

        if let Some(phase) = self.phase {
            writeln!(f, "Active Reactions: {}", phase.dominant_reactions.join(", "))?;
            writeln!(f, "Key Compounds: {}", phase.key_compounds_formed.join(", "))?;
        }
        Ok(())
    }
}
