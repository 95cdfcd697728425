//! Operator onboarding store.
//! Persists operator biometrics and workstation assignments for a
//! registration client on top of SQLite.

pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod packet;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, OnboardConfig};
pub use context::{Clock, FixedClock, OnboardContext, SessionContext, SystemClock};
pub use error::{OnboardCause, OnboardError, OnboardErrorCode, OnboardResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::biometric::{
    AttributeError, BiometricAttribute, BiometricRecordRow, BiometricType, UserBiometricId,
};
pub use model::capture::{
    BdbInfo, Bir, BiometricDto, BiometricRecord, BiometricsDto, FaceDetailsDto,
    FingerprintDetailsDto, IrisDetailsDto, OperatorBiometricDto, QualityType,
};
pub use model::machine_mapping::{MachineMappingId, MachineMappingRow};
pub use model::user::UserDetail;
pub use packet::{JsonPacketSerializer, PacketSerializer, SerializeError};
pub use repo::biometric_repo::{SqliteUserBiometricRepository, UserBiometricRepository};
pub use repo::machine_mapping_repo::{MachineMappingRepository, SqliteMachineMappingRepository};
pub use repo::user_detail_repo::{SqliteUserDetailRepository, UserDetailRepository};
pub use repo::{RepoError, RepoResult};
pub use service::onboard_service::{SqliteOnboardService, UserOnboardService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
