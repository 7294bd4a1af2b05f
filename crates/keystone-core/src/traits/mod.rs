//! Trait seams shared across Keystone crates.

pub mod clock;

pub use clock::{Clock, SystemClock};
