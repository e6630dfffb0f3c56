//! Performer database queries
//!
//! Account creation, roster listing and lifecycle transitions. Username
//! and email uniqueness is enforced by the table constraints; violations
//! surface as [`Error::DuplicateIdentity`].

use crate::db::models::{Performer, PerformerOverview, PerformerStatus};
use crate::{Error, Result};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Input for creating a performer account
#[derive(Debug, Clone)]
pub struct NewPerformer {
    pub username: String,
    pub email: String,
    pub password: String,
    pub dj_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub status: PerformerStatus,
}

/// Generate a random per-account salt (16 bytes, hex)
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with its salt (SHA-256, hex digest)
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Check a password against the stored salt and hash
pub fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

fn performer_from_row(row: &SqliteRow) -> Result<Performer> {
    let status_raw: String = row.get("status");
    let status = PerformerStatus::parse(&status_raw)
        .ok_or_else(|| Error::Internal(format!("Unknown performer status: {}", status_raw)))?;

    Ok(Performer {
        guid: row.get("guid"),
        username: row.get("username"),
        email: row.get("email"),
        dj_name: row.get("dj_name"),
        phone: row.get("phone"),
        is_admin: row.get::<i64, _>("is_admin") != 0,
        status,
    })
}

/// Create a performer account
///
/// Username/email collisions are reported as DuplicateIdentity, whether
/// caught here or by the storage constraint under a racing registration.
pub async fn create(pool: &SqlitePool, new: NewPerformer) -> Result<Performer> {
    let guid = Uuid::new_v4().to_string();
    let salt = generate_salt();
    let hash = hash_password(&new.password, &salt);

    let result = sqlx::query(
        r#"
        INSERT INTO performers (guid, username, email, password_hash, password_salt, dj_name, phone, is_admin, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(&new.username)
    .bind(&new.email)
    .bind(&hash)
    .bind(&salt)
    .bind(&new.dj_name)
    .bind(&new.phone)
    .bind(new.is_admin as i64)
    .bind(new.status.as_str())
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(Performer {
            guid,
            username: new.username,
            email: new.email,
            dj_name: new.dj_name,
            phone: new.phone,
            is_admin: new.is_admin,
            status: new.status,
        }),
        Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE constraint failed") => {
            let identity = if db_err.message().contains("performers.email") {
                new.email
            } else {
                new.username
            };
            Err(Error::DuplicateIdentity(identity))
        }
        Err(e) => Err(e.into()),
    }
}

/// Get a performer by guid
pub async fn get(pool: &SqlitePool, guid: &str) -> Result<Performer> {
    let row = sqlx::query("SELECT * FROM performers WHERE guid = ?")
        .bind(guid)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("performer {}", guid)))?;

    performer_from_row(&row)
}

/// Roster listing with per-performer assignment counts
pub async fn list_with_counts(pool: &SqlitePool) -> Result<Vec<PerformerOverview>> {
    let rows = sqlx::query(
        r#"
        SELECT p.*, COUNT(a.guid) AS assignment_count
        FROM performers p
        LEFT JOIN assignments a ON a.performer_id = p.guid
        GROUP BY p.guid
        ORDER BY p.dj_name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        out.push(PerformerOverview {
            performer: performer_from_row(row)?,
            assignment_count: row.get("assignment_count"),
        });
    }
    Ok(out)
}

/// Soft-deactivate a performer (keeps history)
pub async fn deactivate(pool: &SqlitePool, guid: &str) -> Result<()> {
    let updated = sqlx::query(
        "UPDATE performers SET status = 'inactive', updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
    )
    .bind(guid)
    .execute(pool)
    .await?
    .rows_affected();

    if updated == 0 {
        return Err(Error::NotFound(format!("performer {}", guid)));
    }
    Ok(())
}

/// Hard-delete a performer; availabilities and assignments cascade
pub async fn remove(pool: &SqlitePool, guid: &str) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM performers WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(Error::NotFound(format!("performer {}", guid)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let salt = generate_salt();
        let hash = hash_password("s3cret", &salt);
        assert!(verify_password("s3cret", &salt, &hash));
        assert!(!verify_password("wrong", &salt, &hash));
    }

    #[test]
    fn salts_are_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
