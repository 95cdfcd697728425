//! Operator onboarding service.
//!
//! # Responsibility
//! - Persist an operator's biometric set from any capture shape.
//! - Record and look up the operator's workstation assignment.
//!
//! # Invariants
//! - Each biometric save fully replaces the session user's previous set.
//! - Failures are logged once and returned as `OnboardError`; nothing is
//!   retried here.
//! - Log lines carry an `op_id`, row counts and error text, never sample bytes.

use crate::context::OnboardContext;
use crate::error::{OnboardCause, OnboardError, OnboardErrorCode, OnboardResult};
use crate::logging::{sanitize_message, MAX_ERROR_MESSAGE_CHARS};
use crate::model::biometric::BiometricRecordRow;
use crate::model::capture::{Bir, BiometricDto, BiometricsDto};
use crate::model::machine_mapping::{MachineMappingId, MachineMappingRow};
use crate::packet::{JsonPacketSerializer, PacketSerializer};
use crate::repo::biometric_repo::{SqliteUserBiometricRepository, UserBiometricRepository};
use crate::repo::machine_mapping_repo::{MachineMappingRepository, SqliteMachineMappingRepository};
use crate::repo::RepoResult;
use crate::service::biometric_mapper::{
    map_biometric_captures, map_biometric_dto, map_extracted_templates, RowStamp,
};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;
use uuid::Uuid;

/// Service wired to SQLite repositories over one connection.
pub type SqliteOnboardService<'conn> = UserOnboardService<
    SqliteUserBiometricRepository<'conn>,
    SqliteMachineMappingRepository<'conn>,
    JsonPacketSerializer,
>;

/// Use-case entry points for operator onboarding.
pub struct UserOnboardService<B, M, P = JsonPacketSerializer> {
    biometrics: B,
    mappings: M,
    serializer: P,
    context: OnboardContext,
}

impl<'conn> SqliteOnboardService<'conn> {
    /// Builds the service over a migrated connection.
    pub fn from_connection(conn: &'conn Connection, context: OnboardContext) -> RepoResult<Self> {
        Ok(UserOnboardService::new(
            SqliteUserBiometricRepository::try_new(conn)?,
            SqliteMachineMappingRepository::try_new(conn)?,
            context,
        ))
    }
}

impl<B, M> UserOnboardService<B, M, JsonPacketSerializer>
where
    B: UserBiometricRepository,
    M: MachineMappingRepository,
{
    /// Creates a service that stores template records as JSON.
    pub fn new(biometrics: B, mappings: M, context: OnboardContext) -> Self {
        Self::with_serializer(biometrics, mappings, JsonPacketSerializer, context)
    }
}

impl<B, M, P> UserOnboardService<B, M, P>
where
    B: UserBiometricRepository,
    M: MachineMappingRepository,
    P: PacketSerializer,
{
    pub fn with_serializer(biometrics: B, mappings: M, serializer: P, context: OnboardContext) -> Self {
        Self {
            biometrics,
            mappings,
            serializer,
            context,
        }
    }

    pub fn context(&self) -> &OnboardContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut OnboardContext {
        &mut self.context
    }

    /// Replaces the session user's biometrics with a structured capture.
    ///
    /// Returns the number of rows stored.
    pub fn insert_biometric_dto(&self, dto: &BiometricDto) -> OnboardResult<usize> {
        let op = Operation::start("insert_biometric_dto");
        let rows = map_biometric_dto(dto, &self.stamp());
        self.replace(op, rows)
    }

    /// Replaces the session user's biometrics with a flat capture list.
    ///
    /// # Errors
    /// - Unknown attribute names fail the whole save before any write.
    pub fn insert_biometrics(&self, captures: &[BiometricsDto]) -> OnboardResult<usize> {
        let op = Operation::start("insert_biometrics");
        match map_biometric_captures(captures, &self.stamp()) {
            Ok(rows) => self.replace(op, rows),
            Err(err) => Err(op.fail(OnboardErrorCode::UserOnboarding, err)),
        }
    }

    /// Replaces the session user's biometrics with extracted templates.
    pub fn insert_extracted_templates(&self, templates: &[Bir]) -> OnboardResult<usize> {
        let op = Operation::start("insert_extracted_templates");
        match map_extracted_templates(templates, &self.stamp(), &self.serializer) {
            Ok(rows) => self.replace(op, rows),
            Err(err) => Err(op.fail(OnboardErrorCode::UserOnboarding, err)),
        }
    }

    /// Assigns the session user to the configured center and workstation.
    pub fn save_machine_mapping(&self) -> OnboardResult<()> {
        let op = Operation::start("save_machine_mapping");
        let now = self.context.now_epoch_ms();
        let user_id = self.context.user_id();
        let mapping = MachineMappingRow {
            id: MachineMappingId {
                user_id: user_id.to_string(),
                center_id: self.context.center_id().to_string(),
                machine_id: self.context.station_id().to_string(),
            },
            language_code: self.context.language_code().to_string(),
            is_active: true,
            created_by: user_id.to_string(),
            created_at: now,
            updated_by: Some(user_id.to_string()),
            updated_at: Some(now),
        };

        match self.mappings.save(&mapping) {
            Ok(()) => {
                op.finish(1);
                Ok(())
            }
            Err(err) => Err(op.fail(OnboardErrorCode::MachineMapping, err)),
        }
    }

    /// Time of `user_id`'s latest onboarding to a workstation, if any.
    ///
    /// `user_id` is matched ignoring case.
    pub fn last_updated_time(&self, user_id: &str) -> OnboardResult<Option<i64>> {
        let op = Operation::start("last_updated_time");
        match self.mappings.find_by_user(user_id) {
            Ok(found) => {
                op.finish(usize::from(found.is_some()));
                Ok(found.map(|mapping| mapping.created_at))
            }
            Err(err) => Err(op.fail(OnboardErrorCode::UserOnboarding, err)),
        }
    }

    /// Stored biometric rows of `user_id`.
    pub fn user_biometrics(&self, user_id: &str) -> OnboardResult<Vec<BiometricRecordRow>> {
        let op = Operation::start("user_biometrics");
        match self.biometrics.list_for_user(user_id) {
            Ok(rows) => {
                op.finish(rows.len());
                Ok(rows)
            }
            Err(err) => Err(op.fail(OnboardErrorCode::UserOnboarding, err)),
        }
    }

    fn stamp(&self) -> RowStamp<'_> {
        RowStamp {
            user_id: self.context.user_id(),
            created_at: self.context.now_epoch_ms(),
        }
    }

    fn replace(&self, op: Operation, rows: Vec<BiometricRecordRow>) -> OnboardResult<usize> {
        match self
            .biometrics
            .replace_for_user(self.context.user_id(), &rows)
        {
            Ok(stored) => {
                op.finish(stored);
                Ok(stored)
            }
            Err(err) => Err(op.fail(OnboardErrorCode::UserOnboarding, err)),
        }
    }
}

/// Log correlation for one service call.
struct Operation {
    name: &'static str,
    op_id: Uuid,
    started_at: Instant,
}

impl Operation {
    fn start(name: &'static str) -> Self {
        let op = Self {
            name,
            op_id: Uuid::new_v4(),
            started_at: Instant::now(),
        };
        info!(
            "event={} module=service status=start op_id={}",
            op.name, op.op_id
        );
        op
    }

    fn finish(self, rows: usize) {
        info!(
            "event={} module=service status=ok op_id={} rows={} duration_ms={}",
            self.name,
            self.op_id,
            rows,
            self.started_at.elapsed().as_millis()
        );
    }

    fn fail(self, code: OnboardErrorCode, cause: impl Into<OnboardCause>) -> OnboardError {
        let err = OnboardError::new(code, cause);
        error!(
            "event={} module=service status=error op_id={} duration_ms={} error_code={} error={}",
            self.name,
            self.op_id,
            self.started_at.elapsed().as_millis(),
            code,
            sanitize_message(err.message(), MAX_ERROR_MESSAGE_CHARS)
        );
        err
    }
}
