use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::authz::{can_mutate, Action};
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Chirp;
use crate::hooks::{ChirpCreatedHook, LogChirpCreated};
use crate::services::validation::{validate_message, ValidationFailure};

#[derive(Debug, Error)]
pub enum ChirpError {
    #[error("chirp {0} not found")]
    NotFound(Uuid),

    #[error("user {requester} may not {action} this chirp")]
    Forbidden { requester: Uuid, action: Action },

    #[error("user {owner} already has {limit} chirps")]
    QuotaExceeded { owner: Uuid, limit: i64 },

    #[error(transparent)]
    Invalid(#[from] ValidationFailure),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Store operations on the chirps table. Every operation runs as a single
/// transaction so quota counting, ownership checks, and the write they
/// guard cannot interleave with a concurrent request.
pub struct ChirpService {
    pool: PgPool,
    hooks: Vec<Arc<dyn ChirpCreatedHook>>,
}

impl ChirpService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hooks: vec![Arc::new(LogChirpCreated)],
        }
    }

    pub fn with_hooks(pool: PgPool, hooks: Vec<Arc<dyn ChirpCreatedHook>>) -> Self {
        Self { pool, hooks }
    }

    pub async fn from_manager() -> Result<Self, DatabaseError> {
        Ok(Self::new(DatabaseManager::pool().await?))
    }

    /// All chirps ordered by creation time. When a recency window is
    /// configured, only chirps created within the last N days are listed.
    pub async fn list(&self) -> Result<Vec<Chirp>, ChirpError> {
        let chirps = match config::config().chirps.recent_window_days {
            Some(days) => {
                let cutoff = Utc::now() - Duration::days(days);
                sqlx::query_as::<_, Chirp>(
                    "SELECT id, user_id, message, created_at, updated_at FROM chirps \
                     WHERE created_at >= $1 ORDER BY created_at, id",
                )
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Chirp>(
                    "SELECT id, user_id, message, created_at, updated_at FROM chirps \
                     ORDER BY created_at, id",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(chirps)
    }

    /// Fetch a single chirp for its owner's edit view. Non-owners get
    /// Forbidden, matching the update capability they would lack anyway.
    pub async fn get_for_edit(
        &self,
        chirp_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Chirp, ChirpError> {
        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, user_id, message, created_at, updated_at FROM chirps WHERE id = $1",
        )
        .bind(chirp_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ChirpError::NotFound(chirp_id))?;

        if !can_mutate(requester_id, &chirp, Action::Update) {
            return Err(ChirpError::Forbidden {
                requester: requester_id,
                action: Action::Update,
            });
        }

        Ok(chirp)
    }

    /// Create a chirp for `owner_id`, subject to the per-user quota.
    pub async fn create(&self, owner_id: Uuid, message: &str) -> Result<Chirp, ChirpError> {
        let rules = &config::config().chirps;
        validate_message(message, rules.max_message_chars)?;

        let mut tx = self.pool.begin().await?;

        // Serialize creates for this owner so the count below and the
        // insert act as one unit under concurrent requests.
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(advisory_lock_key(owner_id))
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chirps WHERE user_id = $1")
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        if count >= rules.max_per_user {
            return Err(ChirpError::QuotaExceeded {
                owner: owner_id,
                limit: rules.max_per_user,
            });
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            user_id: owner_id,
            message: message.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO chirps (id, user_id, message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(chirp.id)
        .bind(chirp.user_id)
        .bind(&chirp.message)
        .bind(chirp.created_at)
        .bind(chirp.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        for hook in &self.hooks {
            hook.chirp_created(&chirp).await;
        }

        Ok(chirp)
    }

    /// Replace the message of an owned chirp.
    pub async fn update(
        &self,
        chirp_id: Uuid,
        requester_id: Uuid,
        new_message: &str,
    ) -> Result<Chirp, ChirpError> {
        let mut tx = self.pool.begin().await?;

        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, user_id, message, created_at, updated_at FROM chirps \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(chirp_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ChirpError::NotFound(chirp_id))?;

        if !can_mutate(requester_id, &chirp, Action::Update) {
            return Err(ChirpError::Forbidden {
                requester: requester_id,
                action: Action::Update,
            });
        }

        validate_message(new_message, config::config().chirps.max_message_chars)?;

        let now = Utc::now();
        sqlx::query("UPDATE chirps SET message = $1, updated_at = $2 WHERE id = $3")
            .bind(new_message)
            .bind(now)
            .bind(chirp_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Chirp {
            message: new_message.to_string(),
            updated_at: now,
            ..chirp
        })
    }

    /// Permanently remove an owned chirp. No soft delete.
    pub async fn delete(&self, chirp_id: Uuid, requester_id: Uuid) -> Result<(), ChirpError> {
        let mut tx = self.pool.begin().await?;

        let chirp = sqlx::query_as::<_, Chirp>(
            "SELECT id, user_id, message, created_at, updated_at FROM chirps \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(chirp_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ChirpError::NotFound(chirp_id))?;

        if !can_mutate(requester_id, &chirp, Action::Delete) {
            return Err(ChirpError::Forbidden {
                requester: requester_id,
                action: Action::Delete,
            });
        }

        sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(chirp_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// pg_advisory_xact_lock takes a bigint; fold the owner uuid down to one.
/// Collisions only cost unnecessary serialization, never correctness.
fn advisory_lock_key(user_id: Uuid) -> i64 {
    let bytes = user_id.as_bytes();
    let mut key = [0u8; 8];
    key.copy_from_slice(&bytes[..8]);
    i64::from_be_bytes(key)
}
