//! Collaborator traits
//!
//! These traits define the interface between the protocol engine and the
//! parts of the product it does not own: payment authorization and
//! hardware debug signaling.

pub mod authorizer;
pub mod diagnostics;

pub use authorizer::{Authorization, DenyAll, FreeVend, VendAuthorizer, VendRequest};
pub use diagnostics::{
    DiagnosticCounters, DiagnosticEvent, Diagnostics, LedDiagnostics, NoDiagnostics,
};
