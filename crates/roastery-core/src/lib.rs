//! Roastery Core - Customer Registry Engine
//!
//! An ECS-based registry of coffee-shop customers, each with their own
//! taste preferences, personality and loyalty, all learning from how they
//! are served.
//!
//! # Architecture
//!
//! The registry uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Customers
//! - **Components**: Pure data attached to entities (`CustomerId`,
//!   `CustomerStats`, and the preference/personality records from
//!   `roastery_logic`)
//! - **Systems**: Logic that queries and updates components (drift, mood)
//!
//! # Example
//!
//! ```rust
//! use roastery_core::prelude::*;
//! use roastery_logic::quality::roast;
//!
//! let mut registry = CustomerRegistry::with_seed(RegistryConfig::default(), 42);
//! let cup = roast(212.0, 660.0, "arabica", 11.0, &[]);
//!
//! let report = registry.serve("regular-1", &cup, 8.0);
//! assert_eq!(report.visits, 1);
//! assert!((0.0..=100.0).contains(&report.satisfaction));
//! ```

pub mod components;
pub mod config;
pub mod learning;
pub mod persistence;
pub mod registry;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::RegistryConfig;
    pub use crate::learning::{CustomerMood, InteractionEvent, ServiceReport};
    pub use crate::registry::CustomerRegistry;
}
