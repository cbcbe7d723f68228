//! Error taxonomy for plan operations.
//!
//! Every fallible plan-service call returns [`PlanError`]; the HTTP layer
//! maps variants onto status codes (validation and malformed updates 400,
//! not-found 404, state and transition conflicts 409, upstream 502, store
//! 500). Completion-output parse failures are deliberately absent: the
//! interpreter degrades to a fallback structure instead of erroring.

use uuid::Uuid;

use crate::llm::CompletionError;
use turnnav_db::{DocumentError, PlanStatus, StoreError};

/// Convenience alias used throughout the plan service.
pub type Result<T> = std::result::Result<T, PlanError>;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Required generation fields absent or of the wrong type. The display
    /// string doubles as the HTTP response message.
    #[error("Missing required fields: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// No record with this id.
    #[error("plan {id} not found")]
    NotFound { id: Uuid },

    /// The record's current status forbids this edit.
    #[error("plan {id} is {status} and can no longer be edited")]
    InvalidState { id: Uuid, status: PlanStatus },

    /// The requested status change is not an edge of the lifecycle graph.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: PlanStatus, to: PlanStatus },

    /// An update named a status that does not exist.
    #[error("invalid status value: {value:?}")]
    InvalidStatus { value: String },

    /// An update payload that cannot be applied to the typed record.
    #[error("{reason}")]
    InvalidUpdate { reason: String },

    /// A numeric leaf could not be normalized to a decimal.
    #[error("invalid numeric value: {0}")]
    Numeric(#[from] DocumentError),

    /// The completion collaborator failed.
    #[error("completion service failed: {0}")]
    Upstream(#[from] CompletionError),

    /// The store collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
