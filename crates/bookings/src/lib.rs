//! Bookings module (reserved date ranges and the booking ledger).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. The
//! no-overlap invariant per property lives here.

pub mod booking;
pub mod date_range;

pub use booking::{Booking, BookingLedger};
pub use date_range::DateRange;
