use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use super::iso_date;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Workout,
    Diet,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Workout => "workout",
            RecordKind::Diet => "diet",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "workout" => Ok(RecordKind::Workout),
            "diet" => Ok(RecordKind::Diet),
            other => anyhow::bail!("unknown record kind `{other}`"),
        }
    }
}

/// A workout or diet entry owned by one user.
///
/// `category` is the activity type for workouts and the meal type for diet
/// entries; `measure` is minutes or calories respectively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FitnessRecord {
    pub id: Uuid,
    pub username: String,
    pub kind: RecordKind,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub category: String,
    pub measure: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewRecord {
    pub username: String,
    pub kind: RecordKind,
    pub date: Date,
    pub category: String,
    pub measure: i64,
    pub description: Option<String>,
    pub intensity: Option<String>,
}

/// Fields to overwrite on an existing record; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct RecordPatch {
    pub date: Option<Date>,
    pub category: Option<String>,
    pub measure: Option<i64>,
    pub description: Option<String>,
    pub intensity: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.category.is_none()
            && self.measure.is_none()
            && self.description.is_none()
            && self.intensity.is_none()
    }

    pub fn apply(&self, record: &mut FitnessRecord) {
        if let Some(date) = self.date {
            record.date = date;
        }
        if let Some(category) = &self.category {
            record.category = category.clone();
        }
        if let Some(measure) = self.measure {
            record.measure = measure;
        }
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
        if let Some(intensity) = &self.intensity {
            record.intensity = Some(intensity.clone());
        }
    }
}

/// Inclusive calendar window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Builds a range from optional `YYYY-MM-DD` bounds. Both or neither
    /// must be present, and `start` may not be after `end`.
    pub fn from_bounds(start: Option<&str>, end: Option<&str>) -> AppResult<Option<Self>> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_date("start", start)?;
                let end = parse_date("end", end)?;
                if start > end {
                    return Err(AppError::Validation("start must not be after end".into()));
                }
                Ok(Some(Self { start, end }))
            }
            _ => Err(AppError::Validation(
                "start and end must be given together".into(),
            )),
        }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

pub fn parse_date(field: &str, raw: &str) -> AppResult<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::Validation(format!("{field} must be a YYYY-MM-DD date")))
}
