//! User detail repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create operator aggregates and find active ones by id.
//! - Expose the biometric rows an operator currently owns.
//!
//! # Invariants
//! - `id` lookups ignore case (`COLLATE NOCASE` on the column).
//! - Inactive users are invisible to `find_active_user`.

use crate::model::biometric::BiometricRecordRow;
use crate::model::user::UserDetail;
use crate::repo::biometric_repo::{parse_biometric_row, BIOMETRIC_SELECT_SQL};
use crate::repo::{bool_to_int, ensure_table_ready, int_to_bool, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_COLUMNS: &[&str] = &[
    "id",
    "name",
    "email",
    "mobile",
    "status_code",
    "lang_code",
    "is_active",
    "cr_by",
    "cr_dtime",
];

/// Repository interface for `user_detail`.
pub trait UserDetailRepository {
    fn create_user(&self, user: &UserDetail) -> RepoResult<()>;
    fn find_active_user(&self, user_id: &str) -> RepoResult<Option<UserDetail>>;
    /// Lists biometric rows linked to the user through the owner column.
    fn list_owned_biometrics(&self, user_id: &str) -> RepoResult<Vec<BiometricRecordRow>>;
}

/// SQLite-backed user detail repository.
pub struct SqliteUserDetailRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserDetailRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(conn, "user_detail", USER_COLUMNS)?;
        ensure_table_ready(conn, "user_biometric", &["user_detail_id"])?;
        Ok(Self { conn })
    }
}

impl UserDetailRepository for SqliteUserDetailRepository<'_> {
    fn create_user(&self, user: &UserDetail) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO user_detail (
                id,
                name,
                email,
                mobile,
                status_code,
                lang_code,
                is_active,
                cr_by,
                cr_dtime
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                user.id.as_str(),
                user.name.as_str(),
                user.email.as_deref(),
                user.mobile.as_deref(),
                user.status_code.as_str(),
                user.language_code.as_str(),
                bool_to_int(user.is_active),
                user.created_by.as_str(),
                user.created_at,
            ],
        )?;
        Ok(())
    }

    fn find_active_user(&self, user_id: &str) -> RepoResult<Option<UserDetail>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                id,
                name,
                email,
                mobile,
                status_code,
                lang_code,
                is_active,
                cr_by,
                cr_dtime
             FROM user_detail
             WHERE id = ?1
               AND is_active = 1;",
        )?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn list_owned_biometrics(&self, user_id: &str) -> RepoResult<Vec<BiometricRecordRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BIOMETRIC_SELECT_SQL}
             WHERE user_detail_id = ?1 COLLATE NOCASE
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

fn parse_user_row(row: &Row<'_>) -> RepoResult<UserDetail> {
    Ok(UserDetail {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        mobile: row.get("mobile")?,
        status_code: row.get("status_code")?,
        language_code: row.get("lang_code")?,
        is_active: int_to_bool(row.get("is_active")?, "user_detail.is_active")?,
        created_by: row.get("cr_by")?,
        created_at: row.get("cr_dtime")?,
    })
}
