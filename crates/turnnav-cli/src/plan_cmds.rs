//! Operator-mode CLI handlers for `turnnav plan` subcommands.
//!
//! Implements:
//! - `turnnav plan show [plan-id]`   -- show plan details or list all plans
//! - `turnnav plan delete <plan-id>` -- remove a plan from the store

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use turnnav_core::DEFAULT_LIST_LIMIT;
use turnnav_db::{PgPlanStore, PlanStore};

use crate::PlanCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(command: PlanCommands, pool: &PgPool) -> Result<()> {
    let store = PgPlanStore::new(pool.clone());
    match command {
        PlanCommands::Show { plan_id } => match plan_id {
            Some(id) => cmd_show_one(&store, &id).await,
            None => cmd_show_all(&store).await,
        },
        PlanCommands::Delete { plan_id } => cmd_delete(&store, &plan_id).await,
    }
}

// -----------------------------------------------------------------------
// turnnav plan show (list all)
// -----------------------------------------------------------------------

/// List the most recent plans with summary info.
async fn cmd_show_all(store: &PgPlanStore) -> Result<()> {
    let plans = store.scan(DEFAULT_LIST_LIMIT).await?;

    if plans.is_empty() {
        println!("No plans found. Start the API with `turnnav serve` and POST to /api/plans/generate.");
        return Ok(());
    }

    // Compute column widths for a clean table.
    // ID is always 36 chars (UUID). Status max is 11 (in_progress).
    let id_w = 36;
    let title_w = plans.iter().map(|p| p.title.len()).max().unwrap_or(5).max(5);
    let status_w = 11;

    // Header
    println!(
        "{:<id_w$}  {:<title_w$}  {:<status_w$}  CREATED",
        "ID", "TITLE", "STATUS",
    );

    // Rows
    for plan in &plans {
        let status = plan.status.to_string();
        let created = plan.created_at.format("%Y-%m-%d %H:%M");
        println!(
            "{:<id_w$}  {:<title_w$}  {:<status_w$}  {}",
            plan.id, plan.title, status, created,
        );
    }

    if plans.len() == DEFAULT_LIST_LIMIT {
        println!();
        println!("Showing the {DEFAULT_LIST_LIMIT} most recent plans.");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// turnnav plan show <plan-id>
// -----------------------------------------------------------------------

/// Show detailed info for a single plan, including its stored details.
async fn cmd_show_one(store: &PgPlanStore, plan_id_str: &str) -> Result<()> {
    let plan_id: Uuid = plan_id_str
        .parse()
        .with_context(|| format!("invalid plan ID: {:?}", plan_id_str))?;

    let Some(plan) = store.get(plan_id).await? else {
        anyhow::bail!("plan {plan_id} not found");
    };

    println!("Plan: {}", plan.title);
    println!("  ID:       {}", plan.id);
    println!("  Status:   {}", plan.status);
    println!(
        "  Created:  {}",
        plan.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  Updated:  {}",
        plan.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    println!();
    println!("Details:");
    let pretty = serde_json::to_string_pretty(&plan.details.to_wire())
        .context("failed to render plan details")?;
    for line in pretty.lines() {
        println!("  {line}");
    }

    Ok(())
}

// -----------------------------------------------------------------------
// turnnav plan delete <plan-id>
// -----------------------------------------------------------------------

/// Remove a plan by id.
async fn cmd_delete(store: &PgPlanStore, plan_id_str: &str) -> Result<()> {
    let plan_id: Uuid = plan_id_str
        .parse()
        .with_context(|| format!("invalid plan ID: {:?}", plan_id_str))?;

    let deleted = store.delete(plan_id).await?;
    if !deleted {
        anyhow::bail!("plan {plan_id} not found");
    }

    println!("Plan deleted.");
    println!();
    println!("  Plan ID: {plan_id}");

    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_uuid() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        let parsed: Uuid = id.parse().unwrap();
        assert_eq!(parsed.to_string(), id);
    }

    #[test]
    fn parse_invalid_uuid() {
        let id = "not-a-uuid";
        let result: Result<Uuid, _> = id.parse();
        assert!(result.is_err());
    }
}
