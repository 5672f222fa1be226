//! Flavor synthesis: compound concentrations → sensory profile.
//!
//! Every raw dimension starts at a neutral 5.0. Each compound contributes
//! its [`FlavorImpact`](crate::compounds::FlavorImpact) scaled by an
//! intensity of `min(1, concentration / 1000)`. Bean archetype multipliers
//! are applied on top and the result is re-bounded to [0, 10].
//!
//! Two derived dimensions summarize the cup:
//! - **balance**: 10 minus the mean distance of acidity, sweetness, body and
//!   bitterness from an ideal cup (6.5 / 6.0 / 6.5 / 5.5)
//! - **complexity**: how many compounds are active and how spread out their
//!   concentrations are
//!
//! ```
//! use roastery_logic::flavor::{flavor_profile, BeanArchetype};
//!
//! let cup = flavor_profile(205.0, 720.0, Some(BeanArchetype::Arabica), 12.0);
//! assert!(cup.sweetness > 8.0);
//! assert!(cup.is_bounded());
//! ```

use serde::{Deserialize, Serialize};

use crate::compounds::CATALOG;
use crate::kinetics::{simulate, SimulationRun};

/// Neutral starting value of every raw dimension.
pub const NEUTRAL: f64 = 5.0;

/// Upper bound of every dimension.
pub const MAX_DIMENSION: f64 = 10.0;

/// Concentration (mg/kg) at which a compound reaches full intensity.
pub const FULL_INTENSITY_CONCENTRATION: f64 = 1000.0;

/// Compounds above this concentration count as active for complexity.
pub const ACTIVE_CONCENTRATION: f64 = 10.0;

/// Aftertaste contributions are normalized by this many seconds.
pub const AFTERTASTE_NORMALIZER: f64 = 30.0;

/// Ideal acidity / sweetness / body / bitterness used for balance.
pub const IDEAL_CUP: [f64; 4] = [6.5, 6.0, 6.5, 5.5];

/// Sensory summary of a roast, all dimensions on a 0–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlavorProfile {
    pub acidity: f64,
    pub sweetness: f64,
    pub body: f64,
    pub bitterness: f64,
    pub aroma: f64,
    pub aftertaste: f64,
    /// Derived: closeness to the ideal cup.
    pub balance: f64,
    /// Derived: diversity and spread of active compounds.
    pub complexity: f64,
}

impl FlavorProfile {
    /// Every dimension, derived ones included, lies in [0, 10].
    pub fn is_bounded(&self) -> bool {
        self.dimensions()
            .iter()
            .all(|v| (0.0..=MAX_DIMENSION).contains(v))
    }

    /// All eight dimensions in declaration order.
    pub fn dimensions(&self) -> [f64; 8] {
        [
            self.acidity,
            self.sweetness,
            self.body,
            self.bitterness,
            self.aroma,
            self.aftertaste,
            self.balance,
            self.complexity,
        ]
    }
}

/// One of the six raw sensory dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Acidity,
    Sweetness,
    Body,
    Bitterness,
    Aroma,
    Aftertaste,
}

/// Bean species used as a multiplicative flavor modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeanArchetype {
    Arabica,
    Robusta,
    Liberica,
    Excelsa,
}

impl BeanArchetype {
    pub const ALL: [BeanArchetype; 4] = [
        BeanArchetype::Arabica,
        BeanArchetype::Robusta,
        BeanArchetype::Liberica,
        BeanArchetype::Excelsa,
    ];

    /// Case-insensitive lookup. Unknown names yield `None` and are treated
    /// as neutral by the synthesizer.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "arabica" => Some(BeanArchetype::Arabica),
            "robusta" => Some(BeanArchetype::Robusta),
            "liberica" => Some(BeanArchetype::Liberica),
            "excelsa" => Some(BeanArchetype::Excelsa),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BeanArchetype::Arabica => "arabica",
            BeanArchetype::Robusta => "robusta",
            BeanArchetype::Liberica => "liberica",
            BeanArchetype::Excelsa => "excelsa",
        }
    }

    /// Dimension multipliers applied after the compound contributions.
    pub fn multipliers(self) -> &'static [(Dimension, f64)] {
        match self {
            BeanArchetype::Arabica => &[
                (Dimension::Acidity, 1.2),
                (Dimension::Sweetness, 1.1),
                (Dimension::Bitterness, 0.9),
            ],
            BeanArchetype::Robusta => &[
                (Dimension::Bitterness, 1.4),
                (Dimension::Body, 1.2),
                (Dimension::Acidity, 0.8),
            ],
            BeanArchetype::Liberica => &[
                (Dimension::Body, 1.3),
                (Dimension::Aroma, 1.2),
                (Dimension::Sweetness, 0.9),
            ],
            BeanArchetype::Excelsa => &[
                (Dimension::Acidity, 1.1),
                (Dimension::Aroma, 1.3),
                (Dimension::Aftertaste, 1.2),
            ],
        }
    }
}

fn clamp_dimension(v: f64) -> f64 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, MAX_DIMENSION)
}

/// Raw dimensions as an array in [`Dimension`] order.
struct RawDimensions([f64; 6]);

impl RawDimensions {
    fn get_mut(&mut self, dim: Dimension) -> &mut f64 {
        let idx = match dim {
            Dimension::Acidity => 0,
            Dimension::Sweetness => 1,
            Dimension::Body => 2,
            Dimension::Bitterness => 3,
            Dimension::Aroma => 4,
            Dimension::Aftertaste => 5,
        };
        &mut self.0[idx]
    }

    fn clamp(&mut self) {
        for v in &mut self.0 {
            *v = clamp_dimension(*v);
        }
    }
}

/// Intensity of a compound at `concentration`, in [0, 1].
pub fn intensity(concentration: f64) -> f64 {
    (concentration / FULL_INTENSITY_CONCENTRATION).clamp(0.0, 1.0)
}

/// Map a simulation run to a flavor profile.
pub fn synthesize(run: &SimulationRun, archetype: Option<BeanArchetype>) -> FlavorProfile {
    let mut raw = RawDimensions([NEUTRAL; 6]);

    for (compound, concentration) in CATALOG.iter().zip(run.concentrations.iter()) {
        let i = intensity(*concentration);
        let impact = &compound.flavor_impact;
        raw.0[0] += impact.acidity * i * 2.0;
        raw.0[1] += impact.sweetness * i * 2.0;
        raw.0[2] += impact.body * i * 2.0;
        raw.0[3] += impact.bitterness * i * 2.0;
        raw.0[4] += impact.aroma_intensity * i * 2.0;
        raw.0[5] += (impact.aftertaste_duration / AFTERTASTE_NORMALIZER) * i;
    }
    raw.clamp();

    if let Some(bean) = archetype {
        for (dim, factor) in bean.multipliers() {
            *raw.get_mut(*dim) *= factor;
        }
        raw.clamp();
    }

    let [acidity, sweetness, body, bitterness, aroma, aftertaste] = raw.0;
    let balance = balance(acidity, sweetness, body, bitterness);
    let complexity = complexity(&run.concentrations);

    FlavorProfile {
        acidity,
        sweetness,
        body,
        bitterness,
        aroma,
        aftertaste,
        balance,
        complexity,
    }
}

/// `max(0, 10 - mean absolute deviation from the ideal cup)`.
pub fn balance(acidity: f64, sweetness: f64, body: f64, bitterness: f64) -> f64 {
    let deviations = [
        (acidity - IDEAL_CUP[0]).abs(),
        (sweetness - IDEAL_CUP[1]).abs(),
        (body - IDEAL_CUP[2]).abs(),
        (bitterness - IDEAL_CUP[3]).abs(),
    ];
    let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
    clamp_dimension(MAX_DIMENSION - mean)
}

/// `min(10, diversity * 5 + min(5, variance(active) / 1000))`.
pub fn complexity(concentrations: &[f64]) -> f64 {
    if concentrations.is_empty() {
        return 0.0;
    }
    let active: Vec<f64> = concentrations
        .iter()
        .copied()
        .filter(|c| *c > ACTIVE_CONCENTRATION)
        .collect();
    let diversity = active.len() as f64 / concentrations.len() as f64;
    // f64::min ignores a NaN operand, so runaway variance saturates at 5.
    let spread = (variance(&active) / 1000.0).min(5.0);
    clamp_dimension((diversity * 5.0 + spread).min(MAX_DIMENSION))
}

/// Population variance; 0 for an empty slice.
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

/// Simulate and synthesize in one call.
pub fn flavor_profile(
    temperature: f64,
    total_time_seconds: f64,
    archetype: Option<BeanArchetype>,
    moisture_percent: f64,
) -> FlavorProfile {
    let run = simulate(temperature, total_time_seconds, moisture_percent);
    synthesize(&run, archetype)
}

/// Profile of beans that did not react (catalog baselines only).
pub fn baseline_profile(archetype: Option<BeanArchetype>) -> FlavorProfile {
    synthesize(&SimulationRun::baseline(), archetype)
}
