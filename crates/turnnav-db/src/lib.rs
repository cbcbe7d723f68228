//! Persistence layer for turnnav.
//!
//! Holds the plan record model, the storage-form document type with its
//! decimal/float conversions, the [`store::PlanStore`] collaborator trait,
//! and the Postgres and in-memory implementations of it.

pub mod config;
pub mod document;
pub mod memory;
pub mod models;
pub mod pool;
pub mod postgres;
pub mod store;

pub use config::DbConfig;
pub use document::{DocValue, DocumentError};
pub use memory::MemoryPlanStore;
pub use models::{PlanRecord, PlanStatus, PlanStatusParseError};
pub use postgres::PgPlanStore;
pub use store::{PlanStore, StoreError};
