use sqlx::PgPool;

use crate::models::admin_user::{AdminUser, CreateAdminUser, UpdateAdminUser};
use glow_core::types::{DbId, Timestamp};

const COLUMNS: &str = "id, username, email, password_hash, role_id, is_active, \
     last_login_at, failed_login_count, locked_until, created_at, updated_at";

pub struct AdminUserRepo;

impl AdminUserRepo {
    pub async fn create(pool: &PgPool, data: &CreateAdminUser) -> Result<AdminUser, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_users (username, email, password_hash, role_id) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(&data.username)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(data.role_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_users WHERE id = $1");
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_users WHERE username = $1");
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AdminUser>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM admin_users ORDER BY username LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        data: &UpdateAdminUser,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!(
            "UPDATE admin_users SET \
                username = COALESCE($2, username), \
                email = COALESCE($3, email), \
                role_id = COALESCE($4, role_id), \
                is_active = COALESCE($5, is_active) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(id)
            .bind(&data.username)
            .bind(&data.email)
            .bind(data.role_id)
            .bind(data.is_active)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE admin_users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reset the failure counter and stamp the login time.
    pub async fn record_login_success(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE admin_users SET \
                last_login_at = NOW(), failed_login_count = 0, locked_until = NULL \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await
        .map(|_| ())
    }

    /// Bump the failure counter, locking the account until `lock_until`
    /// once it reaches `max_attempts`.
    pub async fn record_login_failure(
        pool: &PgPool,
        id: DbId,
        max_attempts: i32,
        lock_until: Timestamp,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!(
            "UPDATE admin_users SET \
                failed_login_count = failed_login_count + 1, \
                locked_until = CASE \
                    WHEN failed_login_count + 1 >= $2 THEN $3 \
                    ELSE locked_until \
                END \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(id)
            .bind(max_attempts)
            .bind(lock_until)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM admin_users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Whether the account is currently locked out.
pub fn is_locked(user: &AdminUser, now: Timestamp) -> bool {
    user.locked_until.map(|until| now < until).unwrap_or(false)
}
