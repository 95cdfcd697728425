//! Onboarding use-case services.
//!
//! # Responsibility
//! - Map capture inputs into biometric rows.
//! - Orchestrate repository writes for an onboarding save.
//!
//! # Invariants
//! - Every failure leaves the service as `OnboardError`.
//! - Service layer remains storage-agnostic; SQL lives in `repo`.

pub mod biometric_mapper;
pub mod onboard_service;
