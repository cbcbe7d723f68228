//! Integration tests for the plan lifecycle service.
//!
//! Exercises the full generation sequence and the status lifecycle against
//! the in-memory store, with scripted completion doubles standing in for
//! the generative endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use uuid::Uuid;

use turnnav_core::error::PlanError;
use turnnav_core::llm::{CompletionClient, CompletionError};
use turnnav_core::service::PlanService;
use turnnav_db::{MemoryPlanStore, PlanStatus};

/// Completion double that returns a fixed reply and counts invocations.
struct ScriptedCompletion {
    reply: String,
    calls: AtomicUsize,
}

impl ScriptedCompletion {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

/// Completion double whose endpoint is always down.
struct FailingCompletion;

#[async_trait]
impl CompletionClient for FailingCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
        Err(CompletionError::Api {
            status: 500,
            message: "model offline".to_owned(),
        })
    }
}

fn request_details() -> Value {
    json!({
        "title": "Unit 12 Hydrotreater Turnaround",
        "plantType": "refinery",
        "duration": 45,
        "budget": 60_000_000.0,
        "scope": "Full catalyst change-out and exchanger retube",
        "constraints": "Crane availability limited to weeks 2-4"
    })
}

fn service_with(completion: Arc<dyn CompletionClient>) -> (PlanService, Arc<MemoryPlanStore>) {
    let store = Arc::new(MemoryPlanStore::new());
    (PlanService::new(store.clone(), completion), store)
}

async fn draft_plan(service: &PlanService) -> Uuid {
    service
        .create_and_save(&request_details())
        .await
        .expect("create should succeed")
        .id
}

// -----------------------------------------------------------------------
// Generation
// -----------------------------------------------------------------------

#[tokio::test]
async fn generate_assembles_the_full_details() {
    let completion = ScriptedCompletion::new(
        r#"Here you go: {"milestones": [{"title": "Shutdown", "duration": 5}],
           "cost_breakdown": [{"category": "labor", "amount": 2.5}]}"#,
    );
    let (service, _store) = service_with(completion.clone());

    let record = service
        .create_and_save(&request_details())
        .await
        .expect("create should succeed");

    assert_eq!(record.status, PlanStatus::Draft);
    assert_eq!(record.title, "Unit 12 Hydrotreater Turnaround");

    let wire = record.to_wire();
    let details = &wire["details"];

    // Request fields survive.
    assert_eq!(details["plantType"], json!("refinery"));
    assert_eq!(details["constraints"], json!("Crane availability limited to weeks 2-4"));

    // Generated sections are lifted to the top level, with defaults for
    // the ones the model omitted.
    assert_eq!(details["milestones"][0]["title"], json!("Shutdown"));
    assert_eq!(details["cost_breakdown"][0]["amount"], json!(2.5));
    assert_eq!(details["resources"], json!({}));
    assert_eq!(details["safety_plan"], json!({}));

    // The full generated plan nests the request fields as well.
    assert_eq!(details["generated_plan"]["plantType"], json!("refinery"));
    assert_eq!(details["generated_plan"]["milestones"][0]["duration"], json!(5));

    // Scope analysis and benchmark figures ride along.
    assert_eq!(details["scope_analysis"]["is_realistic"], json!(true));
    assert_eq!(details["industry_benchmarks"]["cost_per_day"], json!(1_500_000.0));
    assert_eq!(details["industry_benchmarks"]["safety_incident_rate"], json!(0.5));

    assert_eq!(completion.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_fields_fail_before_any_generation_call() {
    let completion = ScriptedCompletion::new("{}");
    let (service, store) = service_with(completion.clone());

    let err = service
        .create_and_save(&json!({
            "title": "No budget",
            "plantType": "refinery",
            "scope": "exchanger retube"
        }))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Missing required fields: duration, budget");
    assert_eq!(completion.calls.load(Ordering::SeqCst), 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_completion_falls_back_but_still_saves() {
    let (service, store) = service_with(ScriptedCompletion::new("I cannot answer that."));

    let record = service
        .create_and_save(&request_details())
        .await
        .expect("create should succeed despite unusable output");

    let wire = record.to_wire();
    let generated = &wire["details"]["generated_plan"];
    assert_eq!(
        generated["warning"],
        json!("Response was not in expected format, applying default structure")
    );
    assert!(generated["TurnaroundProject"]["ProjectSchedule"]["MajorPhases"].is_array());

    // Nothing was lifted out of the fallback skeleton.
    assert!(wire["details"].get("milestones").is_none());

    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn completion_failure_surfaces_as_upstream_error() {
    let (service, store) = service_with(Arc::new(FailingCompletion));

    let err = service.create_and_save(&request_details()).await.unwrap_err();

    assert!(matches!(err, PlanError::Upstream(_)));
    assert!(err.to_string().contains("model offline"));
    assert!(store.is_empty().await);
}

// -----------------------------------------------------------------------
// Status lifecycle
// -----------------------------------------------------------------------

#[tokio::test]
async fn status_advances_through_the_full_lifecycle() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;

    for next in ["approved", "in_progress", "completed"] {
        let updated = service
            .update(id, &json!({"status": next}))
            .await
            .expect("forward step should succeed");
        assert_eq!(updated.status.to_string(), next);
    }
}

#[tokio::test]
async fn skipping_a_status_step_is_rejected() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;

    let err = service
        .update(id, &json!({"status": "in_progress"}))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidTransition { .. }));

    // The record is untouched.
    let fetched = service.get(id).await.unwrap().unwrap();
    assert_eq!(fetched.status, PlanStatus::Draft);
}

#[tokio::test]
async fn approved_plans_reject_content_edits() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;
    service.update(id, &json!({"status": "approved"})).await.unwrap();

    let err = service
        .update(id, &json!({"title": "Renamed after approval"}))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidState { .. }));
}

#[tokio::test]
async fn approved_plans_still_accept_the_next_status_step() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;
    service.update(id, &json!({"status": "approved"})).await.unwrap();

    let updated = service
        .update(id, &json!({"status": "in_progress"}))
        .await
        .expect("sole status step should be allowed");
    assert_eq!(updated.status, PlanStatus::InProgress);
}

#[tokio::test]
async fn status_step_bundled_with_edits_is_rejected_when_locked() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;
    service.update(id, &json!({"status": "approved"})).await.unwrap();

    let err = service
        .update(id, &json!({"status": "in_progress", "title": "sneaky"}))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidState { .. }));
}

#[tokio::test]
async fn completed_plans_reject_every_update() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;
    for next in ["approved", "in_progress", "completed"] {
        service.update(id, &json!({"status": next})).await.unwrap();
    }

    for updates in [
        json!({"title": "too late"}),
        json!({"status": "draft"}),
        json!({"details": {}}),
    ] {
        let err = service.update(id, &updates).await.unwrap_err();
        assert!(matches!(err, PlanError::InvalidState { .. }), "updates: {updates}");
    }
}

#[tokio::test]
async fn draft_edits_replace_title_and_details() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let record = service.create_and_save(&request_details()).await.unwrap();
    let id = record.id;

    let updated = service
        .update(
            id,
            &json!({
                "title": "Revised turnaround",
                "details": {"scope": "reduced", "budget": 1_000_000.5},
                "ignored_key": true
            }),
        )
        .await
        .expect("draft edit should succeed");

    assert_eq!(updated.title, "Revised turnaround");
    assert_eq!(updated.id, id);
    assert_eq!(updated.created_at, record.created_at);
    assert!(updated.updated_at >= record.updated_at);

    // Details are replaced wholesale; unknown payload keys are ignored.
    let wire = updated.to_wire();
    assert_eq!(wire["details"], json!({"scope": "reduced", "budget": 1_000_000.5}));
}

#[tokio::test]
async fn unknown_status_values_are_rejected() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;

    let err = service
        .update(id, &json!({"status": "archived"}))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::InvalidStatus { .. }));
}

#[tokio::test]
async fn non_object_update_payloads_are_rejected() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;

    let err = service.update(id, &json!("approved")).await.unwrap_err();
    assert!(matches!(err, PlanError::InvalidUpdate { .. }));
}

// -----------------------------------------------------------------------
// Fetch, list, delete
// -----------------------------------------------------------------------

#[tokio::test]
async fn get_and_update_report_absence_distinctly() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));

    assert!(service.get(Uuid::new_v4()).await.unwrap().is_none());

    let err = service
        .update(Uuid::new_v4(), &json!({"title": "ghost"}))
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::NotFound { .. }));
}

#[tokio::test]
async fn delete_reports_whether_a_record_existed() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));
    let id = draft_plan(&service).await;

    assert!(service.delete(id).await.unwrap());
    assert!(service.get(id).await.unwrap().is_none());
    assert!(!service.delete(id).await.unwrap());
}

#[tokio::test]
async fn list_returns_newest_first_and_honors_the_cap() {
    let (service, _store) = service_with(ScriptedCompletion::new("{}"));

    for i in 0..4 {
        let mut details = request_details();
        details["title"] = json!(format!("Plan {i}"));
        service.create_and_save(&details).await.unwrap();
        // Distinct creation timestamps for a deterministic order.
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let all = service.list(None).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].title, "Plan 3");
    assert_eq!(all[3].title, "Plan 0");

    let capped = service.list(Some(2)).await.unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0].title, "Plan 3");
}
