//! Core turnaround-plan logic: generation, lifecycle, and knowledge queries.
//!
//! This crate contains everything between the HTTP surface and the
//! document store:
//!
//! - plan input validation and scope analysis against industry benchmarks
//! - prompt construction and interpretation of raw completion output
//! - the plan lifecycle service (create, get, list, update, delete) with
//!   status-transition enforcement
//! - retrieval-grounded question answering with citation formatting
//!
//! External services (completion endpoint, document retrieval) sit behind
//! object-safe traits so the whole crate is testable with scripted doubles.

pub mod benchmark;
pub mod error;
pub mod input;
pub mod interpret;
pub mod knowledge;
pub mod lifecycle;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod scope;
pub mod service;

// Re-export the primary public API at the crate root.
pub use benchmark::{IndustryBenchmark, benchmark_for};
pub use error::{PlanError, Result};
pub use input::{PlanInput, REQUIRED_FIELDS};
pub use interpret::{LIFTED_SECTIONS, fallback_plan, interpret_completion};
pub use knowledge::{KnowledgeAnswer, KnowledgeService, SourceCitation};
pub use lifecycle::{is_edit_locked, is_valid_transition};
pub use llm::{CompletionClient, CompletionError, HttpCompletionClient};
pub use prompt::build_prompt;
pub use retrieval::{DocumentRetriever, HttpRetriever, RetrievalError, SourceDocument};
pub use scope::{ScopeAnalysis, analyze_scope};
pub use service::{DEFAULT_LIST_LIMIT, PlanService};
