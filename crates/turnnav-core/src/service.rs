//! Plan lifecycle service: generation, retrieval, update, listing, deletion.
//!
//! The service orchestrates the full generation sequence (validate, analyze
//! scope, prompt, complete, interpret, persist) and enforces the status
//! lifecycle on updates. Storage and generation are collaborators handed in
//! at construction time, so the service itself is backend-agnostic.

use std::sync::Arc;

use serde_json::{Value, json};
use uuid::Uuid;

use turnnav_db::{DocValue, PlanRecord, PlanStatus, PlanStore};

use crate::benchmark::benchmark_for;
use crate::error::{PlanError, Result};
use crate::input::PlanInput;
use crate::interpret::{LIFTED_SECTIONS, interpret_completion};
use crate::lifecycle::{is_edit_locked, is_valid_transition};
use crate::llm::CompletionClient;
use crate::prompt::build_prompt;
use crate::scope::analyze_scope;

/// Records returned by [`PlanService::list`] when the caller gives no limit.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Plan operations against a store and a completion service.
pub struct PlanService {
    store: Arc<dyn PlanStore>,
    completion: Arc<dyn CompletionClient>,
}

impl PlanService {
    pub fn new(store: Arc<dyn PlanStore>, completion: Arc<dyn CompletionClient>) -> Self {
        Self { store, completion }
    }

    /// Generate a plan from the request fields and persist it as a draft.
    ///
    /// Steps:
    /// 1. Validate required input fields
    /// 2. Analyze scope against the industry benchmark
    /// 3. Build the prompt and invoke the completion service
    /// 4. Interpret the raw completion into plan structure
    /// 5. Assemble the stored details
    /// 6. Persist with draft status
    pub async fn create_and_save(&self, details: &Value) -> Result<PlanRecord> {
        // 1. Validate required input fields.
        let input = PlanInput::from_details(details)?;

        tracing::info!(
            title = %input.title,
            plant_type = %input.plant_type,
            duration = input.duration,
            "generating plan"
        );

        // 2. Analyze scope against the industry benchmark.
        let benchmark = benchmark_for(&input.plant_type);
        let analysis = analyze_scope(&input, benchmark);

        // 3. Build the prompt and invoke the completion service.
        let prompt = build_prompt(&input, &analysis);
        let raw = self.completion.complete(&prompt).await?;

        // 4. Interpret the raw completion into plan structure.
        let generated = interpret_completion(details, &raw);

        // 5. Assemble the stored details: the request fields, the generated
        //    sections lifted to the top level, the full generated plan, the
        //    scope analysis, and the benchmark figures.
        let mut assembled = details.as_object().cloned().unwrap_or_default();
        for key in LIFTED_SECTIONS {
            if let Some(section) = generated.get(key) {
                assembled.insert(key.to_owned(), section.clone());
            }
        }
        assembled.insert("generated_plan".to_owned(), generated);
        assembled.insert(
            "scope_analysis".to_owned(),
            json!({
                "is_realistic": analysis.is_realistic,
                "benchmark_comparison": analysis.benchmark_comparison,
                "recommendations": analysis.recommendations,
            }),
        );
        assembled.insert(
            "industry_benchmarks".to_owned(),
            json!({
                "cost_per_day": benchmark.cost_per_day,
                "safety_incident_rate": benchmark.safety_incident_rate,
            }),
        );

        // 6. Persist with draft status.
        let record = PlanRecord::new(
            input.title.clone(),
            DocValue::from_json(&Value::Object(assembled))?,
        );
        self.store.put(&record).await?;

        tracing::info!(id = %record.id, title = %record.title, "plan created");
        Ok(record)
    }

    /// Fetch a plan by id. Absence is `Ok(None)`, never an error.
    pub async fn get(&self, id: Uuid) -> Result<Option<PlanRecord>> {
        Ok(self.store.get(id).await?)
    }

    /// List plans, most recently created first.
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<PlanRecord>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        Ok(self.store.scan(limit).await?)
    }

    /// Apply field updates to a plan, enforcing the status lifecycle.
    ///
    /// Editable records (`draft`, `in_progress`) accept `title`, `details`,
    /// and a valid `status` step; other keys are ignored. Locked records
    /// (`approved`, `completed`) accept exactly one update shape: a payload
    /// whose sole key is a permitted forward status transition.
    pub async fn update(&self, id: Uuid, updates: &Value) -> Result<PlanRecord> {
        let Some(mut record) = self.store.get(id).await? else {
            return Err(PlanError::NotFound { id });
        };

        let Some(updates) = updates.as_object() else {
            return Err(PlanError::InvalidUpdate {
                reason: "update payload must be a JSON object".to_owned(),
            });
        };

        let requested_status = match updates.get("status") {
            Some(value) => Some(parse_status(value)?),
            None => None,
        };

        let locked = is_edit_locked(record.status);
        if locked {
            let sole_transition = updates.len() == 1
                && requested_status.is_some_and(|to| is_valid_transition(record.status, to));
            if !sole_transition {
                return Err(PlanError::InvalidState {
                    id,
                    status: record.status,
                });
            }
        }

        if let Some(to) = requested_status {
            if !is_valid_transition(record.status, to) {
                return Err(PlanError::InvalidTransition {
                    from: record.status,
                    to,
                });
            }
            record.status = to;
        }

        if !locked {
            if let Some(title) = updates.get("title") {
                record.title = title
                    .as_str()
                    .ok_or_else(|| PlanError::InvalidUpdate {
                        reason: "title must be a string".to_owned(),
                    })?
                    .to_owned();
            }
            if let Some(details) = updates.get("details") {
                record.details = DocValue::from_json(details)?;
            }
        }

        record.touch();
        self.store.put(&record).await?;

        tracing::info!(id = %record.id, status = %record.status, "plan updated");
        Ok(record)
    }

    /// Hard-delete a plan; returns whether a record existed.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let existed = self.store.delete(id).await?;
        if existed {
            tracing::info!(%id, "plan deleted");
        }
        Ok(existed)
    }
}

fn parse_status(value: &Value) -> Result<PlanStatus> {
    let text = value.as_str().ok_or_else(|| PlanError::InvalidStatus {
        value: value.to_string(),
    })?;
    text.parse().map_err(|_| PlanError::InvalidStatus {
        value: text.to_owned(),
    })
}
