//! Time-stepped compound kinetics at a fixed roasting temperature.
//!
//! Each call works on its own copy of the catalog baselines, so runs never
//! contaminate each other. The roast is integrated in fixed 10-second
//! steps. Above a compound's threshold it forms, then its whole running
//! concentration is multiplied by `min(2, T / threshold)`. That multiplier
//! compounds every step, which is what separates hot, fast roasts from slow
//! ones. More than 50 °C past the threshold the compound also degrades.
//!
//! Concentrations are not capped here; the flavor synthesizer normalizes
//! them through `min(1, c / 1000)`.
//!
//! ```
//! use roastery_logic::compounds::CompoundId;
//! use roastery_logic::kinetics::simulate;
//!
//! let cold = simulate(100.0, 600.0, 12.0);
//! assert_eq!(cold.concentration(CompoundId::MaillardProducts), 0.0);
//!
//! let hot = simulate(210.0, 600.0, 12.0);
//! assert!(hot.concentration(CompoundId::MaillardProducts) > 1000.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::compounds::{baseline_concentrations, CompoundId, CATALOG};

/// Length of one integration step in simulated seconds.
pub const STEP_SECONDS: f64 = 10.0;

/// Maximum per-step temperature acceleration.
pub const MAX_ACCELERATION: f64 = 2.0;

/// Degradation starts this many °C above a compound's threshold.
pub const DEGRADATION_MARGIN: f64 = 50.0;

/// Working concentration table for a single simulation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Concentration per compound (mg/kg), indexed by [`CompoundId::index`].
    pub concentrations: [f64; 7],
    /// Number of 10-second steps integrated.
    pub steps: u32,
}

impl SimulationRun {
    /// A run that has not reacted: catalog baselines, zero steps.
    pub fn baseline() -> Self {
        Self {
            concentrations: baseline_concentrations(),
            steps: 0,
        }
    }

    pub fn concentration(&self, id: CompoundId) -> f64 {
        self.concentrations[id.index()]
    }

    /// Iterate `(compound, concentration)` in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (CompoundId, f64)> + '_ {
        CompoundId::ALL
            .iter()
            .map(move |id| (*id, self.concentrations[id.index()]))
    }
}

/// Number of whole 10-second steps in `total_time_seconds`.
///
/// Negative, zero, or non-finite durations integrate nothing.
pub fn step_count(total_time_seconds: f64) -> u32 {
    if !total_time_seconds.is_finite() || total_time_seconds <= 0.0 {
        return 0;
    }
    (total_time_seconds / STEP_SECONDS).floor() as u32
}

/// Temperature acceleration applied to a forming compound each step.
pub fn acceleration(temperature: f64, threshold: f64) -> f64 {
    (temperature / threshold).min(MAX_ACCELERATION)
}

/// Integrate the catalog at `temperature` (°C) for `total_time_seconds`
/// with the given bean moisture (percent).
pub fn simulate(temperature: f64, total_time_seconds: f64, moisture_percent: f64) -> SimulationRun {
    let mut run = SimulationRun::baseline();
    let steps = step_count(total_time_seconds);

    for _ in 0..steps {
        for compound in &CATALOG {
            let c = &mut run.concentrations[compound.id.index()];

            if temperature >= compound.temperature_threshold {
                let moisture_factor = if compound.id.is_moisture_sensitive() {
                    1.0 - moisture_percent / 100.0
                } else {
                    1.0
                };
                let formation = compound.formation_rate * STEP_SECONDS * moisture_factor;
                *c = (*c + formation).max(0.0);
                *c = (*c * acceleration(temperature, compound.temperature_threshold)).max(0.0);
            }

            if temperature > compound.temperature_threshold + DEGRADATION_MARGIN {
                let degradation = compound.degradation_rate * STEP_SECONDS;
                *c = (*c - degradation).max(0.0);
            }
        }
    }

    run.steps = steps;
    run
}
