//! Machine mapping repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Upsert the user/center/workstation assignment.
//! - Look up a user's assignment case-insensitively.
//!
//! # Invariants
//! - Each save is one onboarding: a repeated save on the same key restamps
//!   `cr_by`/`cr_dtime` along with the update audit fields.
//! - When several mappings exist for one user, lookups return the most
//!   recently onboarded one.

use crate::model::machine_mapping::{MachineMappingId, MachineMappingRow};
use crate::repo::{bool_to_int, ensure_table_ready, int_to_bool, RepoResult};
use rusqlite::{params, Connection, Row};

const MAPPING_COLUMNS: &[&str] = &[
    "usr_id",
    "regcntr_id",
    "machine_id",
    "lang_code",
    "is_active",
    "cr_by",
    "cr_dtime",
    "upd_by",
    "upd_dtimes",
];

/// Repository interface for `user_machine_mapping`.
pub trait MachineMappingRepository {
    /// Inserts the mapping, or overwrites the existing row for the same key.
    fn save(&self, mapping: &MachineMappingRow) -> RepoResult<()>;
    /// Finds a user's mapping ignoring case of `user_id`.
    fn find_by_user(&self, user_id: &str) -> RepoResult<Option<MachineMappingRow>>;
}

/// SQLite-backed machine mapping repository.
pub struct SqliteMachineMappingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMachineMappingRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "user_machine_mapping", MAPPING_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl MachineMappingRepository for SqliteMachineMappingRepository<'_> {
    fn save(&self, mapping: &MachineMappingRow) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO user_machine_mapping (
                usr_id,
                regcntr_id,
                machine_id,
                lang_code,
                is_active,
                cr_by,
                cr_dtime,
                upd_by,
                upd_dtimes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (usr_id, regcntr_id, machine_id) DO UPDATE SET
                cr_by = excluded.cr_by,
                cr_dtime = excluded.cr_dtime,
                lang_code = excluded.lang_code,
                is_active = excluded.is_active,
                upd_by = excluded.upd_by,
                upd_dtimes = excluded.upd_dtimes;",
            params![
                mapping.id.user_id.as_str(),
                mapping.id.center_id.as_str(),
                mapping.id.machine_id.as_str(),
                mapping.language_code.as_str(),
                bool_to_int(mapping.is_active),
                mapping.created_by.as_str(),
                mapping.created_at,
                mapping.updated_by.as_deref(),
                mapping.updated_at,
            ],
        )?;
        Ok(())
    }

    fn find_by_user(&self, user_id: &str) -> RepoResult<Option<MachineMappingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                usr_id,
                regcntr_id,
                machine_id,
                lang_code,
                is_active,
                cr_by,
                cr_dtime,
                upd_by,
                upd_dtimes
             FROM user_machine_mapping
             WHERE usr_id = ?1 COLLATE NOCASE
             ORDER BY cr_dtime DESC, regcntr_id ASC, machine_id ASC
             LIMIT 1;",
        )?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_mapping_row(row)?));
        }
        Ok(None)
    }
}

fn parse_mapping_row(row: &Row<'_>) -> RepoResult<MachineMappingRow> {
    Ok(MachineMappingRow {
        id: MachineMappingId {
            user_id: row.get("usr_id")?,
            center_id: row.get("regcntr_id")?,
            machine_id: row.get("machine_id")?,
        },
        language_code: row.get("lang_code")?,
        is_active: int_to_bool(row.get("is_active")?, "user_machine_mapping.is_active")?,
        created_by: row.get("cr_by")?,
        created_at: row.get("cr_dtime")?,
        updated_by: row.get("upd_by")?,
        updated_at: row.get("upd_dtimes")?,
    })
}
