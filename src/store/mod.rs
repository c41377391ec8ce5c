//! Nonce record persistence
//!
//! The core needs a keyed load plus an atomic "create if absent, else
//! conditional update" so two concurrent callers cannot both believe they
//! minted the authoritative nonce. Two implementations are provided: a
//! Postgres store for deployments and an in-memory store for embedding and
//! tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::NonceRecord;

/// Keyed persistence for [`NonceRecord`]s, unique per account address
#[async_trait]
pub trait NonceStore: Send + Sync {
    /// Load the record for an account address, if one was ever issued.
    async fn load(&self, account_address: &str) -> Result<Option<NonceRecord>, StoreError>;

    /// Write `candidate` if no record exists for its address or the existing
    /// record was created at or before `stale_before`, then return whichever
    /// record is live afterwards. A caller that loses the race gets the
    /// winner's record back. Updates touch only `nonce` and `created_at`;
    /// the `user_id` association belongs to the identity layer.
    async fn upsert_if_stale(
        &self,
        candidate: NonceRecord,
        stale_before: DateTime<Utc>,
    ) -> Result<NonceRecord, StoreError>;

    /// Identity-layer hook: attach a local user to the record. The link is
    /// written once and never overridden; returns whether a link was made.
    /// The verification core itself never calls this.
    async fn link_user(&self, account_address: &str, user_id: i64) -> Result<bool, StoreError>;
}

/// Postgres-backed nonce store.
///
/// Expected schema:
///
/// ```sql
/// CREATE TABLE auth_nonces (
///     account_address TEXT PRIMARY KEY,
///     nonce           CHAR(6)     NOT NULL,
///     created_at      TIMESTAMPTZ NOT NULL,
///     user_id         BIGINT
/// );
/// ```
#[derive(Clone)]
pub struct PgNonceStore {
    pool: PgPool,
}

impl PgNonceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NonceStore for PgNonceStore {
    async fn load(&self, account_address: &str) -> Result<Option<NonceRecord>, StoreError> {
        let record: Option<NonceRecord> = sqlx::query_as(
            r#"
            SELECT account_address, nonce, created_at, user_id
            FROM auth_nonces
            WHERE account_address = $1
            "#,
        )
        .bind(account_address)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert_if_stale(
        &self,
        candidate: NonceRecord,
        stale_before: DateTime<Utc>,
    ) -> Result<NonceRecord, StoreError> {
        // Single-statement compare-and-swap: the update only lands when the
        // existing record is stale, so concurrent refreshes elect one winner.
        let written: Option<NonceRecord> = sqlx::query_as(
            r#"
            INSERT INTO auth_nonces (account_address, nonce, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (account_address) DO UPDATE
            SET nonce = EXCLUDED.nonce, created_at = EXCLUDED.created_at
            WHERE auth_nonces.created_at <= $4
            RETURNING account_address, nonce, created_at, user_id
            "#,
        )
        .bind(&candidate.account_address)
        .bind(&candidate.nonce)
        .bind(candidate.created_at)
        .bind(stale_before)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(record) = written {
            return Ok(record);
        }

        // Lost the race: hand back the concurrent winner's record.
        self.load(&candidate.account_address)
            .await?
            .ok_or_else(|| {
                StoreError::Database("nonce record vanished during conditional upsert".to_string())
            })
    }

    async fn link_user(&self, account_address: &str, user_id: i64) -> Result<bool, StoreError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE auth_nonces
            SET user_id = $2
            WHERE account_address = $1 AND user_id IS NULL
            "#,
        )
        .bind(account_address)
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(rows_affected > 0)
    }
}

/// In-memory nonce store for embedding and tests
#[derive(Clone, Default)]
pub struct MemoryNonceStore {
    records: Arc<RwLock<HashMap<String, NonceRecord>>>,
}

impl MemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NonceStore for MemoryNonceStore {
    async fn load(&self, account_address: &str) -> Result<Option<NonceRecord>, StoreError> {
        Ok(self.records.read().await.get(account_address).cloned())
    }

    async fn upsert_if_stale(
        &self,
        candidate: NonceRecord,
        stale_before: DateTime<Utc>,
    ) -> Result<NonceRecord, StoreError> {
        let mut records = self.records.write().await;

        match records.get_mut(&candidate.account_address) {
            Some(existing) if existing.created_at > stale_before => Ok(existing.clone()),
            Some(existing) => {
                existing.nonce = candidate.nonce;
                existing.created_at = candidate.created_at;
                Ok(existing.clone())
            }
            None => {
                records.insert(candidate.account_address.clone(), candidate.clone());
                Ok(candidate)
            }
        }
    }

    async fn link_user(&self, account_address: &str, user_id: i64) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;

        match records.get_mut(account_address) {
            Some(record) if record.user_id.is_none() => {
                record.user_id = Some(user_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(address: &str, nonce: &str, created_at: DateTime<Utc>) -> NonceRecord {
        NonceRecord {
            account_address: address.to_string(),
            nonce: nonce.to_string(),
            created_at,
            user_id: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_when_absent() {
        let store = MemoryNonceStore::new();
        let now = Utc::now();

        let live = store
            .upsert_if_stale(record("addr", "000001", now), now - Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(live.nonce, "000001");
        assert_eq!(store.load("addr").await.unwrap().unwrap().nonce, "000001");
    }

    #[tokio::test]
    async fn test_upsert_keeps_fresh_record() {
        let store = MemoryNonceStore::new();
        let now = Utc::now();

        store
            .upsert_if_stale(record("addr", "000001", now), now - Duration::minutes(10))
            .await
            .unwrap();

        // A second writer with a fresh existing record loses and observes
        // the winner's nonce.
        let live = store
            .upsert_if_stale(record("addr", "999999", now), now - Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(live.nonce, "000001");
    }

    #[tokio::test]
    async fn test_upsert_replaces_stale_record() {
        let store = MemoryNonceStore::new();
        let now = Utc::now();
        let old = now - Duration::minutes(30);

        store
            .upsert_if_stale(record("addr", "000001", old), old - Duration::minutes(10))
            .await
            .unwrap();

        let live = store
            .upsert_if_stale(record("addr", "999999", now), now - Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(live.nonce, "999999");
        assert_eq!(live.created_at, now);
    }

    #[tokio::test]
    async fn test_refresh_preserves_user_link() {
        let store = MemoryNonceStore::new();
        let now = Utc::now();
        let old = now - Duration::minutes(30);

        store
            .upsert_if_stale(record("addr", "000001", old), old - Duration::minutes(10))
            .await
            .unwrap();
        assert!(store.link_user("addr", 42).await.unwrap());

        let live = store
            .upsert_if_stale(record("addr", "999999", now), now - Duration::minutes(10))
            .await
            .unwrap();

        assert_eq!(live.user_id, Some(42));
    }

    #[tokio::test]
    async fn test_link_user_is_write_once() {
        let store = MemoryNonceStore::new();
        let now = Utc::now();

        store
            .upsert_if_stale(record("addr", "000001", now), now - Duration::minutes(10))
            .await
            .unwrap();

        assert!(store.link_user("addr", 42).await.unwrap());
        assert!(!store.link_user("addr", 43).await.unwrap());
        assert_eq!(store.load("addr").await.unwrap().unwrap().user_id, Some(42));
    }

    #[tokio::test]
    async fn test_link_user_without_record() {
        let store = MemoryNonceStore::new();
        assert!(!store.link_user("missing", 42).await.unwrap());
    }
}
