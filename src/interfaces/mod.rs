//! Outer surfaces: CSV event input, forward output and the replay driver the
//! binary runs them through.

pub mod csv;
pub mod replay;
