//! Onboarding domain model.
//!
//! # Responsibility
//! - Define the persisted row shapes (`user_biometric`, `user_machine_mapping`,
//!   `user_detail`).
//! - Define the capture-side inputs handed over by the device pipeline.
//! - Own the biometric attribute lookup table.
//!
//! # Invariants
//! - A biometric row is identified by (user, attribute code, type code).
//! - Timestamps are UTC epoch milliseconds.

pub mod biometric;
pub mod capture;
pub mod machine_mapping;
pub mod user;
