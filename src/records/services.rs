use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::dto::{CreateDietRequest, CreateWorkoutRequest, UpdateRecordRequest};
use super::model::{DateRange, FitnessRecord, NewRecord, RecordKind, RecordPatch};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

const MAX_CATEGORY_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 200;
const MAX_MEASURE: i64 = 1_000_000;

fn required_text(field: &str, value: &str, max: usize) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> AppResult<Option<String>> {
    value.map(|v| required_text(field, v, max)).transpose()
}

fn measure(field: &str, value: i64) -> AppResult<i64> {
    if value <= 0 || value > MAX_MEASURE {
        return Err(AppError::Validation(format!(
            "{field} must be between 1 and {MAX_MEASURE}"
        )));
    }
    Ok(value)
}

fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

pub fn new_workout(username: &str, req: CreateWorkoutRequest) -> AppResult<NewRecord> {
    Ok(NewRecord {
        username: username.to_string(),
        kind: RecordKind::Workout,
        date: req.date.unwrap_or_else(today),
        category: required_text("activity_type", &req.activity_type, MAX_CATEGORY_LEN)?,
        measure: measure("duration_minutes", req.duration_minutes)?,
        description: None,
        intensity: optional_text("intensity", req.intensity.as_deref(), MAX_CATEGORY_LEN)?,
    })
}

pub fn new_diet(username: &str, req: CreateDietRequest) -> AppResult<NewRecord> {
    Ok(NewRecord {
        username: username.to_string(),
        kind: RecordKind::Diet,
        date: req.date.unwrap_or_else(today),
        category: required_text("meal_type", &req.meal_type, MAX_CATEGORY_LEN)?,
        measure: measure("calories", req.calories)?,
        description: Some(required_text(
            "description",
            &req.description,
            MAX_DESCRIPTION_LEN,
        )?),
        intensity: None,
    })
}

fn one_of<T>(field: &str, neutral: Option<T>, specific: Option<T>) -> AppResult<Option<T>> {
    match (neutral, specific) {
        (Some(_), Some(_)) => Err(AppError::Validation(format!(
            "{field} duplicates a field already given"
        ))),
        (neutral, specific) => Ok(neutral.or(specific)),
    }
}

/// Builds a patch for a record of `kind`. Fields belonging to the other
/// kind are rejected rather than silently mapped.
pub fn patch_from(kind: RecordKind, req: UpdateRecordRequest) -> AppResult<RecordPatch> {
    let (category_field, measure_field, category, measure_value, foreign) = match kind {
        RecordKind::Workout => (
            "activity_type",
            "duration_minutes",
            one_of("activity_type", req.category, req.activity_type)?,
            one_of("duration_minutes", req.measure, req.duration_minutes)?,
            [
                ("meal_type", req.meal_type.is_some()),
                ("calories", req.calories.is_some()),
                ("description", req.description.is_some()),
            ],
        ),
        RecordKind::Diet => (
            "meal_type",
            "calories",
            one_of("meal_type", req.category, req.meal_type)?,
            one_of("calories", req.measure, req.calories)?,
            [
                ("activity_type", req.activity_type.is_some()),
                ("duration_minutes", req.duration_minutes.is_some()),
                ("intensity", req.intensity.is_some()),
            ],
        ),
    };
    if let Some((field, _)) = foreign.iter().find(|(_, given)| *given) {
        return Err(AppError::Validation(format!(
            "{field} does not apply to {kind} records"
        )));
    }

    let patch = RecordPatch {
        date: req.date,
        category: optional_text(category_field, category.as_deref(), MAX_CATEGORY_LEN)?,
        measure: measure_value.map(|m| measure(measure_field, m)).transpose()?,
        description: optional_text(
            "description",
            req.description.as_deref(),
            MAX_DESCRIPTION_LEN,
        )?,
        intensity: optional_text("intensity", req.intensity.as_deref(), MAX_CATEGORY_LEN)?,
    };
    if patch.is_empty() {
        return Err(AppError::Validation("no fields to update".into()));
    }
    Ok(patch)
}

// Every mutation below invalidates the owner's stats before returning, so
// the response is never observable ahead of the invalidation.

pub async fn create_record(state: &AppState, new: NewRecord) -> AppResult<FitnessRecord> {
    let record = state.records.insert(new).await?;
    state.stats.invalidate(&record.username);
    info!(user = %record.username, id = %record.id, kind = %record.kind, "record created");
    Ok(record)
}

/// Validates `req` against the stored record's kind, then applies it.
pub async fn update_record(
    state: &AppState,
    username: &str,
    id: Uuid,
    req: UpdateRecordRequest,
) -> AppResult<FitnessRecord> {
    let existing = state
        .records
        .find(id, username)
        .await?
        .ok_or_else(|| AppError::NotFound("Record".into()))?;
    let patch = patch_from(existing.kind, req)?;
    let record = state
        .records
        .update(id, username, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Record".into()))?;
    state.stats.invalidate(username);
    info!(user = %username, %id, "record updated");
    Ok(record)
}

pub async fn delete_record(state: &AppState, username: &str, id: Uuid) -> AppResult<()> {
    if !state.records.delete(id, username).await? {
        return Err(AppError::NotFound("Record".into()));
    }
    state.stats.invalidate(username);
    info!(user = %username, %id, "record deleted");
    Ok(())
}

pub async fn list_records(
    state: &AppState,
    username: &str,
    kind: RecordKind,
    range: Option<DateRange>,
) -> AppResult<Vec<FitnessRecord>> {
    let records = match range {
        Some(range) => {
            state
                .records
                .query_by_identity_and_range(username, range)
                .await?
        }
        None => state.records.query_by_identity(username).await?,
    };
    Ok(records.into_iter().filter(|r| r.kind == kind).collect())
}
