//! User biometric repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist a user's biometric set with full-replacement semantics.
//! - Read back stored rows for a user.
//!
//! # Invariants
//! - `replace_for_user` detaches, deletes and inserts in one IMMEDIATE
//!   transaction; readers never observe a partial set.
//! - Every row handed to `replace_for_user` belongs to the target user.
//! - Rows sharing a key collapse to the last one; the save still succeeds.
//! - New rows are linked to the user's active `user_detail` row when one exists.

use crate::model::biometric::{BiometricRecordRow, BiometricType, UserBiometricId};
use crate::repo::{bool_to_int, ensure_table_ready, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;

pub(crate) const BIOMETRIC_SELECT_SQL: &str = "SELECT
    usr_id,
    bmatt_code,
    bmtyp_code,
    bio_iso_image,
    bio_raw_image,
    quality_score,
    no_of_retry,
    is_active,
    cr_by,
    cr_dtime
FROM user_biometric";

const BIOMETRIC_COLUMNS: &[&str] = &[
    "usr_id",
    "bmatt_code",
    "bmtyp_code",
    "bio_iso_image",
    "bio_raw_image",
    "quality_score",
    "no_of_retry",
    "user_detail_id",
    "is_active",
    "cr_by",
    "cr_dtime",
];

/// Repository interface for `user_biometric`.
pub trait UserBiometricRepository {
    /// Replaces every stored row of `user_id` with `rows`.
    ///
    /// Rows repeating a key replace the earlier entry. Returns the number of
    /// rows inserted.
    fn replace_for_user(&self, user_id: &str, rows: &[BiometricRecordRow]) -> RepoResult<usize>;
    /// Lists stored rows of one user ordered by type code, then attribute code.
    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<BiometricRecordRow>>;
}

/// SQLite-backed biometric repository.
pub struct SqliteUserBiometricRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserBiometricRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "user_biometric", BIOMETRIC_COLUMNS)?;
        ensure_table_ready(conn, "user_detail", &["id", "is_active"])?;
        Ok(Self { conn })
    }
}

impl UserBiometricRepository for SqliteUserBiometricRepository<'_> {
    fn replace_for_user(&self, user_id: &str, rows: &[BiometricRecordRow]) -> RepoResult<usize> {
        if let Some(foreign) = rows.iter().find(|row| row.id.user_id != user_id) {
            return Err(RepoError::InvalidData(format!(
                "biometric row for `{}` cannot be stored under `{user_id}`",
                foreign.id.user_id
            )));
        }

        let rows = last_wins(rows);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        // Detach from the owning user before delete.
        tx.execute(
            "UPDATE user_biometric SET user_detail_id = NULL WHERE usr_id = ?1;",
            [user_id],
        )?;
        tx.execute("DELETE FROM user_biometric WHERE usr_id = ?1;", [user_id])?;

        let owner = active_owner_id(&tx, user_id)?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO user_biometric (
                    usr_id,
                    bmatt_code,
                    bmtyp_code,
                    bio_iso_image,
                    bio_raw_image,
                    quality_score,
                    no_of_retry,
                    user_detail_id,
                    is_active,
                    cr_by,
                    cr_dtime
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            )?;
            for row in &rows {
                insert.execute(params![
                    row.id.user_id.as_str(),
                    row.id.attribute_code.as_str(),
                    row.id.type_code.code(),
                    row.iso_image.as_slice(),
                    row.raw_record.as_deref(),
                    row.quality_score,
                    row.retry_count,
                    owner.as_deref(),
                    bool_to_int(row.is_active),
                    row.created_by.as_str(),
                    row.created_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(rows.len())
    }

    fn list_for_user(&self, user_id: &str) -> RepoResult<Vec<BiometricRecordRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BIOMETRIC_SELECT_SQL}
             WHERE usr_id = ?1
             ORDER BY bmtyp_code ASC, bmatt_code ASC;"
        ))?;
        let mut rows = stmt.query([user_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_biometric_row(row)?);
        }
        Ok(items)
    }
}

/// Keeps the last row of each key, at the position the key first appeared.
fn last_wins(rows: &[BiometricRecordRow]) -> Vec<&BiometricRecordRow> {
    let mut slots: HashMap<&UserBiometricId, usize> = HashMap::with_capacity(rows.len());
    let mut kept: Vec<&BiometricRecordRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match slots.get(&row.id) {
            Some(&slot) => kept[slot] = row,
            None => {
                slots.insert(&row.id, kept.len());
                kept.push(row);
            }
        }
    }
    kept
}

pub(crate) fn parse_biometric_row(row: &Row<'_>) -> RepoResult<BiometricRecordRow> {
    let type_text: String = row.get("bmtyp_code")?;
    let type_code = BiometricType::from_code(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid biometric type `{type_text}` in user_biometric.bmtyp_code"
        ))
    })?;

    Ok(BiometricRecordRow {
        id: UserBiometricId {
            user_id: row.get("usr_id")?,
            attribute_code: row.get("bmatt_code")?,
            type_code,
        },
        iso_image: row.get("bio_iso_image")?,
        raw_record: row.get("bio_raw_image")?,
        quality_score: row.get("quality_score")?,
        retry_count: row.get("no_of_retry")?,
        is_active: int_to_bool(row.get("is_active")?, "user_biometric.is_active")?,
        created_by: row.get("cr_by")?,
        created_at: row.get("cr_dtime")?,
    })
}

fn active_owner_id(tx: &Transaction<'_>, user_id: &str) -> RepoResult<Option<String>> {
    let owner = tx
        .query_row(
            "SELECT id FROM user_detail WHERE id = ?1 AND is_active = 1;",
            [user_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(owner)
}
