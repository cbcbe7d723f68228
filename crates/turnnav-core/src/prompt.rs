//! Prompt construction for plan generation.
//!
//! The prompt interpolates the validated input and the scope analysis, then
//! pins the output format with a literal schema template. Downstream
//! consumers key on the schema's field names, so the template text is a
//! constant, never assembled dynamically.

use crate::input::PlanInput;
use crate::scope::ScopeAnalysis;

/// Schema template the model is instructed to follow exactly.
///
/// `milestones`, `resources`, `risk_assessment`, `cost_breakdown` and
/// `safety_plan` are lifted into plan details verbatim by the interpreter;
/// renaming anything here breaks stored plans.
pub const PLAN_SCHEMA: &str = r#"{
    "milestones": [
        {
            "title": string,
            "duration": number,
            "deliverables": [string],
            "dependencies": [string]
        }
    ],
    "resources": {
        "personnel": [
            {
                "role": string,
                "count": number,
                "skills": string
            }
        ],
        "equipment": [
            {
                "type": string,
                "quantity": number
            }
        ]
    },
    "risk_assessment": {
        "high_risks": [
            {
                "title": string,
                "description": string,
                "mitigation": string
            }
        ]
    },
    "cost_breakdown": [
        {
            "category": string,
            "amount": number,
            "details": string
        }
    ],
    "safety_plan": {
        "required_permits": [string],
        "safety_protocols": [string]
    }
}"#;

/// Build the generation prompt for a validated input and its scope analysis.
///
/// Deterministic: equal inputs produce byte-identical prompts.
pub fn build_prompt(input: &PlanInput, analysis: &ScopeAnalysis) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str("Given the following turnaround project details:\n\n");
    prompt.push_str(&format!("Title: {}\n", input.title));
    prompt.push_str(&format!("Plant Type: {}\n", input.plant_type));
    prompt.push_str(&format!("Duration: {} days\n", input.duration));
    prompt.push_str(&format!("Budget: {}\n", format_currency(input.budget)));
    prompt.push_str(&format!("Scope: {}\n", input.scope));
    prompt.push_str(&format!(
        "Constraints: {}\n",
        input.constraints.as_deref().unwrap_or("None specified")
    ));

    prompt.push_str("\nIndustry context:\n");
    prompt.push_str(&format!(
        "- Budget per day comparison: {:.2}x industry average\n",
        analysis.benchmark_comparison
    ));
    prompt.push_str(&format!(
        "- Recommendations: {}\n",
        analysis.recommendations.join(", ")
    ));

    prompt.push_str("\nGenerate a structured turnaround plan with:\n\n");
    prompt.push_str("1. Milestones: Break down into phases, each with:\n");
    prompt.push_str("   - Title of the phase\n");
    prompt.push_str("   - Duration in days\n");
    prompt.push_str("   - Key deliverables\n");
    prompt.push_str("   - Dependencies on other phases\n\n");
    prompt.push_str("2. Resource Requirements:\n");
    prompt.push_str("   - Personnel with roles, count needed, and required skills\n");
    prompt.push_str("   - Equipment with types and quantities\n\n");
    prompt.push_str("3. Risk Assessment:\n");
    prompt.push_str("   - High-risk items with titles\n");
    prompt.push_str("   - Detailed descriptions\n");
    prompt.push_str("   - Mitigation strategies\n\n");
    prompt.push_str("4. Cost Breakdown:\n");
    prompt.push_str("   - Category of expense\n");
    prompt.push_str("   - Amount allocated\n");
    prompt.push_str("   - Additional details\n\n");
    prompt.push_str("5. Safety Plan:\n");
    prompt.push_str("   - Required permits and certifications\n");
    prompt.push_str("   - Safety protocols and procedures\n\n");

    prompt.push_str("Format your response exactly according to this schema:\n");
    prompt.push_str(PLAN_SCHEMA);

    prompt
}

/// Render a dollar amount with thousands separators and two decimals.
fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u128;
    let dollars = (cents / 100).to_string();
    let rem = cents % 100;

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{rem:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::REFINERY;
    use crate::scope::analyze_scope;

    fn sample_input() -> PlanInput {
        PlanInput {
            title: "Unit 4 Crossover".to_owned(),
            plant_type: "refinery".to_owned(),
            duration: 45,
            budget: 50_000_000.0,
            scope: "Full unit inspection and catalyst replacement".to_owned(),
            constraints: None,
        }
    }

    #[test]
    fn prompt_contains_schema_markers() {
        let input = sample_input();
        let analysis = analyze_scope(&input, &REFINERY);
        let prompt = build_prompt(&input, &analysis);

        assert!(prompt.contains("Format your response exactly according to this schema:"));
        assert!(prompt.contains("\"milestones\""));
        assert!(prompt.contains("\"resources\""));
        assert!(prompt.contains("\"risk_assessment\""));
        assert!(prompt.contains("\"cost_breakdown\""));
        assert!(prompt.contains("\"safety_plan\""));
    }

    #[test]
    fn prompt_interpolates_input_fields() {
        let input = sample_input();
        let analysis = analyze_scope(&input, &REFINERY);
        let prompt = build_prompt(&input, &analysis);

        assert!(prompt.contains("Title: Unit 4 Crossover"));
        assert!(prompt.contains("Plant Type: refinery"));
        assert!(prompt.contains("Duration: 45 days"));
        assert!(prompt.contains("Budget: $50,000,000.00"));
        assert!(prompt.contains("Scope: Full unit inspection"));
    }

    #[test]
    fn prompt_includes_scope_analysis() {
        let input = sample_input();
        let analysis = analyze_scope(&input, &REFINERY);
        let prompt = build_prompt(&input, &analysis);

        assert!(prompt.contains("- Budget per day comparison: 0.74x industry average"));
        assert!(prompt.contains("- Recommendations: Budget aligns with industry benchmarks"));
    }

    #[test]
    fn constraints_default_when_absent() {
        let input = sample_input();
        let analysis = analyze_scope(&input, &REFINERY);
        let prompt = build_prompt(&input, &analysis);
        assert!(prompt.contains("Constraints: None specified"));

        let mut constrained = sample_input();
        constrained.constraints = Some("No hot work during shift A".to_owned());
        let prompt = build_prompt(&constrained, &analysis);
        assert!(prompt.contains("Constraints: No hot work during shift A"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let input = sample_input();
        let analysis = analyze_scope(&input, &REFINERY);
        assert_eq!(build_prompt(&input, &analysis), build_prompt(&input, &analysis));
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(50_000_000.0), "$50,000,000.00");
        assert_eq!(format_currency(1_234.5), "$1,234.50");
        assert_eq!(format_currency(999.0), "$999.00");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-2_500.75), "-$2,500.75");
    }
}
