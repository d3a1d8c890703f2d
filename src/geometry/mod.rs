/// Drag/resize/rotate state machine.
pub mod interaction;
/// Rotation-aware box arithmetic.
pub mod transform;
