//! A payment redirection delegate.
//!
//! A delegate instance is bound once to a home project and forwards every
//! payment that project receives, in full, to one candidate picked at random
//! from an operator-maintained pool.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
