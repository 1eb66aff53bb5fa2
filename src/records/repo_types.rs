use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::model::FitnessRecord;

#[derive(Debug, FromRow)]
pub struct FitnessRecordRow {
    pub id: Uuid,
    pub username: String,
    pub kind: String,
    pub record_date: Date,
    pub category: String,
    pub measure: i64,
    pub description: Option<String>,
    pub intensity: Option<String>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<FitnessRecordRow> for FitnessRecord {
    type Error = anyhow::Error;

    fn try_from(r: FitnessRecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            username: r.username,
            kind: r.kind.parse()?,
            date: r.record_date,
            category: r.category,
            measure: r.measure,
            description: r.description,
            intensity: r.intensity,
            created_at: r.created_at,
        })
    }
}
