//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared entirely by their attribute
/// values; identity doesn't exist for them. A date range `[0, 10)` is the
/// same range wherever it appears, while two bookings over it are distinct
/// entities.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
