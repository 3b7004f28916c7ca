//! Properties module (listed rentable units and their registry).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod property;

pub use property::{Property, PropertyRegistry};
