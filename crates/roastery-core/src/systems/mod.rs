//! Systems - logic that operates on customer components

mod drift;
mod mood;

pub use drift::*;
pub use mood::*;
