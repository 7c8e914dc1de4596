//! Application layer orchestrating the delegate.
//!
//! This module defines the `PaymentRouter`, the entry point the upstream
//! protocol calls once a payment has been received, along with the data-source
//! hooks it consults beforehand.

pub mod data_source;
pub mod router;
