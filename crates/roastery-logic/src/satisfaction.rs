//! Customer satisfaction for a single cup.
//!
//! Satisfaction mixes three parts:
//! - objective quality: `quality / 100 × 40`
//! - taste match: `0.4 × mean` of four attribute matches
//! - personality: additive trait bonuses and penalties
//!
//! The result is clamped to [0, 100].

use crate::flavor::FlavorProfile;
use crate::personality::TraitKind;
use crate::preferences::CustomerPreferences;
use crate::quality;

/// Target used for body and bitterness, which customers don't track.
pub const DEFAULT_TARGET: f64 = 5.0;

/// Intensity above which a trait starts to color satisfaction.
pub const STRONG_TRAIT: f32 = 0.7;

/// Read access to trait intensities, however they are stored.
///
/// Absent traits read as `0.0`.
pub trait TraitIntensities {
    fn intensity(&self, kind: TraitKind) -> f32;
}

impl TraitIntensities for [(TraitKind, f32)] {
    fn intensity(&self, kind: TraitKind) -> f32 {
        self.iter()
            .find(|(k, _)| *k == kind)
            .map_or(0.0, |(_, v)| *v)
    }
}

impl<const N: usize> TraitIntensities for [(TraitKind, f32); N] {
    fn intensity(&self, kind: TraitKind) -> f32 {
        self.as_slice().intensity(kind)
    }
}

/// A customer with no notable personality.
impl TraitIntensities for () {
    fn intensity(&self, _kind: TraitKind) -> f32 {
        0.0
    }
}

/// `max(0, 100 − 10 × |actual − target|)`.
pub fn attribute_match(actual: f64, target: f64) -> f64 {
    (100.0 - 10.0 * (actual - target).abs()).max(0.0)
}

/// Mean of the acidity, sweetness, body and bitterness matches.
pub fn taste_match(profile: &FlavorProfile, prefs: &CustomerPreferences) -> f64 {
    let matches = [
        attribute_match(profile.acidity, f64::from(prefs.acidity) * 10.0),
        attribute_match(profile.sweetness, f64::from(prefs.sweetness) * 10.0),
        attribute_match(profile.body, DEFAULT_TARGET),
        attribute_match(profile.bitterness, DEFAULT_TARGET),
    ];
    matches.iter().sum::<f64>() / matches.len() as f64
}

/// Sum of the personality bonuses and penalties that apply to this cup.
pub fn trait_modifier<T: TraitIntensities + ?Sized>(profile: &FlavorProfile, traits: &T) -> f64 {
    let mut modifier = 0.0;
    if traits.intensity(TraitKind::Adventurous) > STRONG_TRAIT && profile.complexity > 7.0 {
        modifier += 10.0;
    }
    if traits.intensity(TraitKind::Picky) > STRONG_TRAIT && profile.balance < 6.0 {
        modifier -= 15.0;
    }
    if traits.intensity(TraitKind::Patient) > STRONG_TRAIT && profile.balance > 7.0 {
        modifier += 5.0;
    }
    modifier
}

/// Satisfaction with an explicit quality score.
///
/// Non-decreasing in `quality` with everything else held fixed.
pub fn evaluate_scored<T: TraitIntensities + ?Sized>(
    profile: &FlavorProfile,
    quality: f64,
    prefs: &CustomerPreferences,
    traits: &T,
) -> f64 {
    let quality = if quality.is_nan() {
        0.0
    } else {
        quality.clamp(0.0, 100.0)
    };
    let total =
        quality / 100.0 * 40.0 + 0.4 * taste_match(profile, prefs) + trait_modifier(profile, traits);
    total.clamp(0.0, 100.0)
}

/// Satisfaction with a defect-free cupping score of `profile`.
pub fn evaluate<T: TraitIntensities + ?Sized>(
    profile: &FlavorProfile,
    prefs: &CustomerPreferences,
    traits: &T,
) -> f64 {
    let quality = f64::from(quality::score(profile, &[]));
    evaluate_scored(profile, quality, prefs, traits)
}
