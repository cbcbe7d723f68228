//! Interpretation of raw completion output into plan structure.
//!
//! Model output is untrusted text: it may wrap the JSON in prose, truncate
//! it, or contain no JSON at all. Interpretation is total -- any shape of
//! input produces *some* plan structure, falling back to a fixed skeleton
//! with a warning when no usable JSON is found. Parse problems are logged,
//! never raised.

use serde_json::{Value, json};
use tracing::warn;

/// Section keys lifted from parsed output to the top level of plan details.
pub const LIFTED_SECTIONS: [&str; 5] = [
    "milestones",
    "resources",
    "risk_assessment",
    "cost_breakdown",
    "safety_plan",
];

/// Extract the JSON object spanning the first `{` to the last `}`.
///
/// Returns `None` when either brace is missing, the window is empty, or the
/// slice is not strict JSON. Both delimiters are ASCII, so byte-index
/// slicing stays on char boundaries regardless of what surrounds them.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Interpret a raw completion against the request's base fields.
///
/// On a successful parse the five [`LIFTED_SECTIONS`] are merged over the
/// base object (missing sections get empty defaults). Otherwise the result
/// is [`fallback_plan`].
pub fn interpret_completion(base: &Value, raw: &str) -> Value {
    match extract_json_object(raw) {
        Some(Value::Object(parsed)) => {
            let mut details = base.as_object().cloned().unwrap_or_default();
            for key in LIFTED_SECTIONS {
                let value = parsed.get(key).cloned().unwrap_or_else(|| default_for(key));
                details.insert(key.to_owned(), value);
            }
            Value::Object(details)
        }
        _ => {
            warn!(
                raw_len = raw.len(),
                "completion output had no parseable JSON object, applying default structure"
            );
            fallback_plan()
        }
    }
}

/// Default structure stored when the completion cannot be interpreted.
pub fn fallback_plan() -> Value {
    json!({
        "TurnaroundProject": {
            "ProjectSchedule": {
                "MajorPhases": []
            },
            "ResourceAllocation": {
                "RequiredPersonnel": [],
                "EquipmentNeeds": []
            },
            "RiskAssessment": {
                "PotentialRisks": []
            },
            "BudgetBreakdown": {
                "LaborCosts": 0,
                "EquipmentCosts": 0,
                "MaterialCosts": 0
            },
            "Constraints": []
        },
        "warning": "Response was not in expected format, applying default structure"
    })
}

fn default_for(section: &str) -> Value {
    match section {
        "milestones" | "cost_breakdown" => json!([]),
        _ => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Value {
        json!({"title": "Unit 4 Crossover", "plantType": "refinery"})
    }

    #[test]
    fn prose_around_valid_json_still_parses() {
        let raw = "Sure, here is the plan you asked for:\n\
                   {\"milestones\": [{\"title\": \"Preparation\", \"duration\": 10}]}\n\
                   Let me know if you need anything else.";
        let result = interpret_completion(&base(), raw);

        assert_eq!(result["title"], json!("Unit 4 Crossover"));
        assert_eq!(result["milestones"][0]["title"], json!("Preparation"));
        assert_eq!(result["resources"], json!({}));
        assert_eq!(result["cost_breakdown"], json!([]));
        assert!(result.get("warning").is_none());
    }

    #[test]
    fn missing_sections_get_empty_defaults() {
        let result = interpret_completion(&base(), "{}");
        assert_eq!(result["milestones"], json!([]));
        assert_eq!(result["resources"], json!({}));
        assert_eq!(result["risk_assessment"], json!({}));
        assert_eq!(result["cost_breakdown"], json!([]));
        assert_eq!(result["safety_plan"], json!({}));
    }

    #[test]
    fn reversed_braces_fall_back() {
        let result = interpret_completion(&base(), "}{");
        assert_eq!(
            result["warning"],
            json!("Response was not in expected format, applying default structure")
        );
        assert!(result["TurnaroundProject"]["ProjectSchedule"]["MajorPhases"].is_array());
    }

    #[test]
    fn brace_free_text_falls_back() {
        let result = interpret_completion(&base(), "I am unable to produce a plan right now.");
        assert!(result.get("warning").is_some());
    }

    #[test]
    fn unparseable_window_falls_back() {
        let result = interpret_completion(&base(), "{this is not json}");
        assert!(result.get("warning").is_some());
    }

    #[test]
    fn truncated_json_falls_back() {
        let result = interpret_completion(&base(), "{\"milestones\": [");
        assert!(result.get("warning").is_some());
    }

    #[test]
    fn two_objects_make_the_window_unparseable() {
        // The window is greedy: first `{` to last `}` spans both objects
        // and the text between them.
        let result = interpret_completion(&base(), "{\"a\": 1} and also {\"b\": 2}");
        assert!(result.get("warning").is_some());
    }

    #[test]
    fn multibyte_text_around_the_braces_is_safe() {
        let raw = "承知しました 🙂 {\"milestones\": []} 以上です 🙂";
        let result = interpret_completion(&base(), raw);
        assert_eq!(result["milestones"], json!([]));
    }

    #[test]
    fn closing_brace_inside_a_string_is_fine() {
        let raw = "{\"safety_plan\": {\"safety_protocols\": [\"use the } sign\"]}}";
        let result = interpret_completion(&base(), raw);
        assert_eq!(
            result["safety_plan"]["safety_protocols"][0],
            json!("use the } sign")
        );
    }

    #[test]
    fn fallback_has_the_full_skeleton() {
        let plan = fallback_plan();
        let project = &plan["TurnaroundProject"];
        assert_eq!(project["ResourceAllocation"]["RequiredPersonnel"], json!([]));
        assert_eq!(project["BudgetBreakdown"]["LaborCosts"], json!(0));
        assert_eq!(project["Constraints"], json!([]));
    }

    #[test]
    fn non_object_base_still_lifts_sections() {
        let result = interpret_completion(&json!(null), "{\"milestones\": []}");
        assert_eq!(result["milestones"], json!([]));
    }
}
