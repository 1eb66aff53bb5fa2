use serde::Serialize;

use crate::records::{FitnessRecord, RecordKind};

/// Totals over a user's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Aggregate {
    pub total_workout_duration: i64,
    pub total_calories_consumed: i64,
    pub workout_count: u64,
    pub diet_count: u64,
}

impl Aggregate {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a FitnessRecord>,
    {
        records.into_iter().fold(Self::default(), |mut acc, r| {
            match r.kind {
                RecordKind::Workout => {
                    acc.total_workout_duration += r.measure;
                    acc.workout_count += 1;
                }
                RecordKind::Diet => {
                    acc.total_calories_consumed += r.measure;
                    acc.diet_count += 1;
                }
            }
            acc
        })
    }
}
