//! Core domain types
//!
//! The remote service is the authority on a prediction's lifecycle. The
//! structures here mirror what it last reported and are shared between the
//! async and blocking clients.

pub mod prediction;
