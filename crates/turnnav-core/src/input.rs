//! Generation input parameters and required-field validation.

use serde_json::Value;

use crate::error::PlanError;

/// Fields every generation request must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 5] = ["title", "plantType", "duration", "budget", "scope"];

/// The typed view of a generation request body.
///
/// The raw JSON object is kept alongside by the caller; this struct only
/// carries the fields the pipeline computes with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanInput {
    pub title: String,
    pub plant_type: String,
    /// Planned turnaround length in days.
    pub duration: u32,
    /// Total budget, USD.
    pub budget: f64,
    pub scope: String,
    pub constraints: Option<String>,
}

impl PlanInput {
    /// Validate and extract the required fields from a request body.
    ///
    /// A field that is absent *or* of the wrong type is reported; the error
    /// lists offenders in [`REQUIRED_FIELDS`] order. Extra keys are left
    /// untouched for the caller to carry through into the stored details.
    pub fn from_details(details: &Value) -> Result<Self, PlanError> {
        let obj = details.as_object();

        let title = obj.and_then(|o| o.get("title")).and_then(Value::as_str);
        let plant_type = obj.and_then(|o| o.get("plantType")).and_then(Value::as_str);
        let duration = obj
            .and_then(|o| o.get("duration"))
            .and_then(Value::as_u64)
            .and_then(|d| u32::try_from(d).ok());
        let budget = obj.and_then(|o| o.get("budget")).and_then(Value::as_f64);
        let scope = obj.and_then(|o| o.get("scope")).and_then(Value::as_str);

        let present = [
            title.is_some(),
            plant_type.is_some(),
            duration.is_some(),
            budget.is_some(),
            scope.is_some(),
        ];
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, ok)| !*ok)
            .map(|(field, _)| (*field).to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(PlanError::Validation { fields: missing });
        }

        let constraints = obj
            .and_then(|o| o.get("constraints"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        let (Some(title), Some(plant_type), Some(duration), Some(budget), Some(scope)) =
            (title, plant_type, duration, budget, scope)
        else {
            return Err(PlanError::Validation { fields: missing });
        };

        Ok(Self {
            title: title.to_owned(),
            plant_type: plant_type.to_owned(),
            duration,
            budget,
            scope: scope.to_owned(),
            constraints,
        })
    }
}
