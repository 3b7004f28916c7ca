//! Transactional façade over the rental-booking ledger.
//!
//! Composes the property registry, booking ledger, and escrow engine
//! behind one mutual-exclusion boundary and exposes the public call
//! surface.

pub mod service;

pub use service::RentalService;
