//! Component definitions for the customer ECS world.
//!
//! Components are pure data structs attached to entities. Each customer
//! entity carries a [`CustomerId`], [`CustomerStats`], and the
//! `CustomerPreferences` / `PersonalityProfile` records from
//! `roastery_logic`. Behavior lives in systems and the registry.

mod customer;

pub use customer::*;
