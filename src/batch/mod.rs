/// Cooperative cancellation.
pub mod cancel;
/// Record batches over an immutable template snapshot.
pub mod runner;
/// Frame consumers: PNG directories and in-memory collectors.
pub mod sink;
/// Slideshow frame streams.
pub mod slideshow;
