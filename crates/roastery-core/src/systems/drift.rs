//! Drift system - slow, service-independent wandering of customer taste

use hecs::World;
use rand::Rng;
use roastery_logic::preferences::{CustomerPreferences, EvolutionConfig};

use crate::components::CustomerId;

/// Run a natural drift step for every customer whose interval has elapsed.
///
/// Returns how many customers drifted.
pub fn drift_system(
    world: &mut World,
    now: f64,
    config: &EvolutionConfig,
    rng: &mut impl Rng,
) -> usize {
    let mut drifted = 0;
    for (_, (id, prefs)) in world.query_mut::<(&CustomerId, &mut CustomerPreferences)>() {
        let roast_before = prefs.roast;
        if prefs.drift(now, config, rng) {
            drifted += 1;
            if prefs.roast != roast_before {
                log::debug!(
                    "{} drifted from {} to {} roast",
                    id,
                    roast_before.name(),
                    prefs.roast.name()
                );
            }
        }
    }
    drifted
}
