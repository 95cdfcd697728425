//! Onboarding failure surfaced to callers.
//!
//! # Invariants
//! - Every failure of an onboarding operation is reported as `OnboardError`.
//! - `message` is the underlying failure text, unchanged.
//! - Nothing here retries; callers decide how to present or repeat the save.

use crate::model::biometric::AttributeError;
use crate::packet::SerializeError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OnboardResult<T> = Result<T, OnboardError>;

/// Fixed error codes reported with an `OnboardError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OnboardErrorCode {
    /// Biometric inserts and mapping lookups.
    UserOnboarding,
    /// Machine mapping saves.
    MachineMapping,
}

impl OnboardErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserOnboarding => "REG-UOB-001",
            Self::MachineMapping => "REG-UOB-002",
        }
    }
}

impl Display for OnboardErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of an onboarding failure.
#[derive(Debug)]
pub enum OnboardCause {
    Repo(RepoError),
    Attribute(AttributeError),
    Serialize(SerializeError),
}

impl Display for OnboardCause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Attribute(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "{err}"),
        }
    }
}

impl From<RepoError> for OnboardCause {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<AttributeError> for OnboardCause {
    fn from(value: AttributeError) -> Self {
        Self::Attribute(value)
    }
}

impl From<SerializeError> for OnboardCause {
    fn from(value: SerializeError) -> Self {
        Self::Serialize(value)
    }
}

/// Single failure type of the onboarding service.
#[derive(Debug)]
pub struct OnboardError {
    code: OnboardErrorCode,
    message: String,
    cause: OnboardCause,
}

impl OnboardError {
    pub fn new(code: OnboardErrorCode, cause: impl Into<OnboardCause>) -> Self {
        let cause = cause.into();
        Self {
            code,
            message: cause.to_string(),
            cause,
        }
    }

    pub fn code(&self) -> OnboardErrorCode {
        self.code
    }

    /// Underlying failure text.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &OnboardCause {
        &self.cause
    }
}

impl Display for OnboardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for OnboardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            OnboardCause::Repo(err) => Some(err),
            OnboardCause::Attribute(err) => Some(err),
            OnboardCause::Serialize(err) => Some(err),
        }
    }
}
