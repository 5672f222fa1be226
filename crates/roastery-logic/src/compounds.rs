//! Static catalog of flavor-forming compounds and their kinetic parameters.
//!
//! The catalog is an immutable template. Simulation runs copy the baseline
//! concentrations into their own working table (see [`crate::kinetics`])
//! and never write back here.
//!
//! | Compound | Threshold °C | Forms | Degrades |
//! |----------|-------------:|------:|---------:|
//! | Chlorogenic acid | 140 | 0.5 | 0.8 |
//! | Quinides | 180 | 1.2 | 0.3 |
//! | Maillard products | 150 | 0.8 | 0.2 |
//! | Caramelization products | 170 | 0.6 | 0.4 |
//! | Pyrazines | 200 | 1.0 | 0.5 |
//! | Furans | 160 | 0.7 | 0.6 |
//! | Caffeine | 240 | 0.0 | 0.1 |

use serde::{Deserialize, Serialize};

/// Identifier for each compound in the catalog, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompoundId {
    ChlorogenicAcid,
    Quinides,
    MaillardProducts,
    CaramelizationProducts,
    Pyrazines,
    Furans,
    Caffeine,
}

impl CompoundId {
    /// All compounds in catalog order.
    pub const ALL: [CompoundId; 7] = [
        CompoundId::ChlorogenicAcid,
        CompoundId::Quinides,
        CompoundId::MaillardProducts,
        CompoundId::CaramelizationProducts,
        CompoundId::Pyrazines,
        CompoundId::Furans,
        CompoundId::Caffeine,
    ];

    /// Position of this compound in [`CATALOG`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Catalog entry for this compound.
    pub fn compound(self) -> &'static ChemicalCompound {
        &CATALOG[self.index()]
    }

    /// Snake-case key used by phase metadata and reports.
    pub fn key(self) -> &'static str {
        match self {
            CompoundId::ChlorogenicAcid => "chlorogenic_acid",
            CompoundId::Quinides => "quinides",
            CompoundId::MaillardProducts => "maillard_products",
            CompoundId::CaramelizationProducts => "caramelization_products",
            CompoundId::Pyrazines => "pyrazines",
            CompoundId::Furans => "furans",
            CompoundId::Caffeine => "caffeine",
        }
    }

    /// Only the Maillard compound is slowed by bean moisture.
    pub fn is_moisture_sensitive(self) -> bool {
        matches!(self, CompoundId::MaillardProducts)
    }
}

/// Signed sensory weights a compound contributes at full intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlavorImpact {
    pub acidity: f64,
    pub sweetness: f64,
    pub body: f64,
    pub bitterness: f64,
    pub aroma_intensity: f64,
    /// Lingering finish in seconds (normalized by 30 s downstream).
    pub aftertaste_duration: f64,
}

/// Catalog entry: one compound and its kinetic parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChemicalCompound {
    pub id: CompoundId,
    pub name: &'static str,
    /// Baseline concentration in green beans (mg/kg).
    pub concentration: f64,
    /// Below this temperature (°C) the compound does not form.
    pub temperature_threshold: f64,
    /// Formation per 10-second step.
    pub formation_rate: f64,
    /// Degradation per 10-second step once 50 °C past the threshold.
    pub degradation_rate: f64,
    pub flavor_impact: FlavorImpact,
    pub health_effects: &'static [&'static str],
}

/// The compound catalog, indexed by [`CompoundId::index`].
pub const CATALOG: [ChemicalCompound; 7] = [
    ChemicalCompound {
        id: CompoundId::ChlorogenicAcid,
        name: "Chlorogenic Acid",
        concentration: 0.0,
        temperature_threshold: 140.0,
        formation_rate: 0.5,
        degradation_rate: 0.8,
        flavor_impact: FlavorImpact {
            acidity: 0.8,
            sweetness: -0.2,
            body: 0.3,
            bitterness: 0.4,
            aroma_intensity: 0.2,
            aftertaste_duration: 15.0,
        },
        health_effects: &["antioxidant", "metabolism_boost"],
    },
    ChemicalCompound {
        id: CompoundId::Quinides,
        name: "Quinides",
        concentration: 0.0,
        temperature_threshold: 180.0,
        formation_rate: 1.2,
        degradation_rate: 0.3,
        flavor_impact: FlavorImpact {
            acidity: -0.4,
            sweetness: -0.1,
            body: 0.6,
            bitterness: 0.7,
            aroma_intensity: 0.4,
            aftertaste_duration: 25.0,
        },
        health_effects: &[],
    },
    ChemicalCompound {
        id: CompoundId::MaillardProducts,
        name: "Maillard Reaction Products",
        concentration: 0.0,
        temperature_threshold: 150.0,
        formation_rate: 0.8,
        degradation_rate: 0.2,
        flavor_impact: FlavorImpact {
            acidity: -0.2,
            sweetness: 0.6,
            body: 0.8,
            bitterness: 0.1,
            aroma_intensity: 0.9,
            aftertaste_duration: 20.0,
        },
        health_effects: &[],
    },
    ChemicalCompound {
        id: CompoundId::CaramelizationProducts,
        name: "Caramelization Products",
        concentration: 0.0,
        temperature_threshold: 170.0,
        formation_rate: 0.6,
        degradation_rate: 0.4,
        flavor_impact: FlavorImpact {
            acidity: -0.3,
            sweetness: 0.9,
            body: 0.4,
            bitterness: -0.2,
            aroma_intensity: 0.7,
            aftertaste_duration: 18.0,
        },
        health_effects: &[],
    },
    ChemicalCompound {
        id: CompoundId::Pyrazines,
        name: "Pyrazines",
        concentration: 0.0,
        temperature_threshold: 200.0,
        formation_rate: 1.0,
        degradation_rate: 0.5,
        flavor_impact: FlavorImpact {
            acidity: -0.1,
            sweetness: 0.2,
            body: 0.3,
            bitterness: 0.2,
            aroma_intensity: 0.8,
            aftertaste_duration: 12.0,
        },
        health_effects: &[],
    },
    ChemicalCompound {
        id: CompoundId::Furans,
        name: "Furans",
        concentration: 0.0,
        temperature_threshold: 160.0,
        formation_rate: 0.7,
        degradation_rate: 0.6,
        flavor_impact: FlavorImpact {
            acidity: 0.1,
            sweetness: 0.4,
            body: 0.2,
            bitterness: 0.1,
            aroma_intensity: 0.6,
            aftertaste_duration: 10.0,
        },
        health_effects: &[],
    },
    ChemicalCompound {
        id: CompoundId::Caffeine,
        name: "Caffeine",
        concentration: 12000.0,
        temperature_threshold: 240.0,
        formation_rate: 0.0,
        degradation_rate: 0.1,
        flavor_impact: FlavorImpact {
            acidity: 0.1,
            sweetness: -0.1,
            body: 0.2,
            bitterness: 0.8,
            aroma_intensity: 0.1,
            aftertaste_duration: 30.0,
        },
        health_effects: &["stimulant", "alertness"],
    },
];

/// Baseline concentrations of every compound, in catalog order.
pub fn baseline_concentrations() -> [f64; 7] {
    CATALOG.map(|c| c.concentration)
}

/// Lowest formation threshold in the catalog (°C).
pub fn lowest_threshold() -> f64 {
    CATALOG
        .iter()
        .map(|c| c.temperature_threshold)
        .fold(f64::INFINITY, f64::min)
}
