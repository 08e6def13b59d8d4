pub mod classify;
pub mod model;
pub mod smoother;
pub mod table;
pub mod tagger;
pub mod trainer;
pub mod trellis;

/// The sentence boundary state.
pub const START: &str = "START";
