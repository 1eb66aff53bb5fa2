use serde::{Deserialize, Serialize};
use time::Date;

use super::iso_date;
use super::model::FitnessRecord;

#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub activity_type: String,
    pub duration_minutes: i64,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(default)]
    pub intensity: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDietRequest {
    pub meal_type: String,
    pub description: String,
    pub calories: i64,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

/// Partial update; at least one field must be present.
///
/// `category` and `measure` apply to either kind. The kind-specific names
/// are only accepted on a record of that kind.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub measure: Option<i64>,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub intensity: Option<String>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub calories: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
}

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordCreated {
    pub message: &'static str,
    pub record: FitnessRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn workout_request_date_is_optional() {
        let req: CreateWorkoutRequest =
            serde_json::from_str(r#"{"activity_type":"run","duration_minutes":30}"#).unwrap();
        assert_eq!(req.date, None);

        let req: CreateWorkoutRequest = serde_json::from_str(
            r#"{"activity_type":"run","duration_minutes":30,"date":"2024-06-02","intensity":"low"}"#,
        )
        .unwrap();
        assert_eq!(req.date, Some(date!(2024 - 06 - 02)));
        assert_eq!(req.intensity.as_deref(), Some("low"));
    }

    #[test]
    fn diet_request_requires_description() {
        let err = serde_json::from_str::<CreateDietRequest>(r#"{"meal_type":"lunch","calories":600}"#);
        assert!(err.is_err());
    }

    #[test]
    fn update_keeps_kind_specific_names_apart() {
        let req: UpdateRecordRequest =
            serde_json::from_str(r#"{"duration_minutes":50,"activity_type":"swim"}"#).unwrap();
        assert_eq!(req.duration_minutes, Some(50));
        assert_eq!(req.activity_type.as_deref(), Some("swim"));
        assert_eq!(req.measure, None);
        assert_eq!(req.calories, None);
    }
}
