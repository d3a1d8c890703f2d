/// Font registration, measurement and shaping.
pub mod fonts;
/// Scaling, padding and alignment.
pub mod layout;
/// Font requests and the measurement capability.
pub mod measure;
/// Inline-formatted text.
pub mod rich;
/// Greedy word wrapping.
pub mod wrap;
