//! Pure roasting and customer-behavior logic for Roastery.
//!
//! This crate contains all logic that is independent of any storage, ECS
//! world, or runtime. Functions take plain data (plus an injected `Rng` and
//! the current simulated hour where they need them) and return results,
//! making them unit-testable and deterministic under a seeded RNG.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`compounds`] | Static catalog of flavor-forming compounds |
//! | [`kinetics`] | Time-stepped compound formation and degradation |
//! | [`flavor`] | Sensory profile synthesis, bean archetypes, balance, complexity |
//! | [`quality`] | Cupping score, roasting phases, roast analysis |
//! | [`satisfaction`] | Customer satisfaction for a served cup |
//! | [`preferences`] | Taste preferences and their evolution |
//! | [`personality`] | Traits, adaptation triggers, conflict resolution, moods |

pub mod compounds;
pub mod flavor;
pub mod kinetics;
pub mod personality;
pub mod preferences;
pub mod quality;
pub mod satisfaction;

/// Simulated hours in one day. All timestamps are simulated hours.
pub const HOURS_PER_DAY: f64 = 24.0;
