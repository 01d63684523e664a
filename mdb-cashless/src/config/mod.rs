//! Configuration types
//!
//! The reader's own identity is fixed at build or provisioning time and
//! stored as postcard binary data. The VMC's display geometry and price
//! limits are negotiated over the bus and live only in RAM.

pub mod identity;
pub mod negotiated;

pub use identity::*;
pub use negotiated::*;
