//! Domain layer: identifiers, payment value objects, the candidate registry,
//! and the ports through which the delegate reaches its collaborators.

pub mod capability;
pub mod identity;
pub mod payment;
pub mod ports;
pub mod registry;
