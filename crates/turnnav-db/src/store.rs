//! The document-store collaborator interface.
//!
//! The plan service never talks to a database directly; it holds a
//! `dyn PlanStore` handed in at construction time. Production uses
//! [`crate::postgres::PgPlanStore`]; tests and local development use
//! [`crate::memory::MemoryPlanStore`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::PlanRecord;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure inside a store implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store failed (connection, query, encode/decode).
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),

    /// A persisted record could not be mapped back into a [`PlanRecord`].
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Key-value plan storage with document-store semantics.
///
/// Implementations must be `Send + Sync`; the service shares one instance
/// across request handlers behind an `Arc`.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert or replace a record (put semantics: create and update both
    /// land here).
    async fn put(&self, record: &PlanRecord) -> Result<(), StoreError>;

    /// Fetch a record by id. Absence is `Ok(None)`, never an error.
    async fn get(&self, id: Uuid) -> Result<Option<PlanRecord>, StoreError>;

    /// List records, most recently created first, capped at `limit`.
    async fn scan(&self, limit: usize) -> Result<Vec<PlanRecord>, StoreError>;

    /// Remove a record by id; returns whether a record existed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

// Compile-time check that the trait stays object-safe, since the service
// holds it as `Arc<dyn PlanStore>`.
const _: () = {
    fn _assert_object_safe(_: &dyn PlanStore) {}
};
