//! Routine authoring - turns raw form input into routines
//!
//! Drafts carry the values exactly as typed. Validation either produces a
//! complete `Routine` or names the offending exercise; nothing is written
//! on failure.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::DocumentStore;
use crate::model::{AppConfig, Drill, Exercise, ExerciseBody, Routine, SubExercise, Target, UserProfile};
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Routine name is required")]
    MissingRoutineName,

    #[error("Add at least one exercise")]
    NoExercises,

    #[error("Exercise name is required")]
    MissingExerciseName,

    #[error("Sub-exercise name is required in {exercise}")]
    MissingSubExerciseName { exercise: String },

    #[error("Invalid set count in {exercise}")]
    InvalidSets { exercise: String },

    #[error("Invalid rest time in {exercise}")]
    InvalidRest { exercise: String },

    #[error("Invalid numeric values in {exercise}")]
    InvalidValues { exercise: String },

    #[error("Superset {exercise} has no sub-exercises")]
    EmptySuperset { exercise: String },

    #[error("Name cannot be empty")]
    EmptyProfileName,

    #[error("Active routine count must be a number greater than 0")]
    InvalidActiveCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    #[default]
    Reps,
    Time,
    Superset,
}

/// Fixed: one value used for every set. Variable: one value per set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueMode {
    #[default]
    Fixed,
    Variable,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubDraft {
    pub id: Option<String>,
    pub name: String,
    pub kind: DraftKind,
    pub mode: ValueMode,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseDraft {
    pub id: Option<String>,
    pub name: String,
    pub kind: DraftKind,
    pub sets: String,
    pub rest: String,
    pub mode: ValueMode,
    pub values: Vec<String>,
    pub subs: Vec<SubDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutineDraft {
    pub id: Option<String>,
    pub name: String,
    pub exercises: Vec<ExerciseDraft>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Parse typed values into a target. Variable sequences longer than the
/// set count are cut; shorter ones are kept and reuse their last value.
fn parse_target(values: &[String], mode: ValueMode, sets: u32, exercise: &str) -> Result<Target, ValidationError> {
    let invalid = || ValidationError::InvalidValues {
        exercise: exercise.to_string(),
    };

    let mut nums = values
        .iter()
        .map(|v| v.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<u32>, _>>()?;
    if nums.is_empty() {
        return Err(invalid());
    }

    match mode {
        ValueMode::Fixed => Ok(Target::Fixed(nums[0])),
        ValueMode::Variable => {
            nums.truncate(sets as usize);
            Ok(Target::PerSet(nums))
        }
    }
}

impl SubDraft {
    fn validate(&self, sets: u32, parent: &str) -> Result<SubExercise, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingSubExerciseName {
                exercise: parent.to_string(),
            });
        }
        let target = parse_target(&self.values, self.mode, sets, parent)?;
        let drill = match self.kind {
            DraftKind::Time => Drill::Time { target },
            DraftKind::Reps | DraftKind::Superset => Drill::Reps { target },
        };
        Ok(SubExercise {
            id: self.id.clone().unwrap_or_else(new_id),
            name: name.to_string(),
            drill,
        })
    }
}

impl ExerciseDraft {
    pub fn validate(&self) -> Result<Exercise, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingExerciseName);
        }

        let sets = match self.sets.trim().parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => {
                return Err(ValidationError::InvalidSets {
                    exercise: name.to_string(),
                });
            }
        };
        let rest = self
            .rest
            .trim()
            .parse::<u32>()
            .map_err(|_| ValidationError::InvalidRest {
                exercise: name.to_string(),
            })?;

        let body = match self.kind {
            DraftKind::Reps => ExerciseBody::Reps {
                target: parse_target(&self.values, self.mode, sets, name)?,
            },
            DraftKind::Time => ExerciseBody::Time {
                target: parse_target(&self.values, self.mode, sets, name)?,
            },
            DraftKind::Superset => {
                if self.subs.is_empty() {
                    return Err(ValidationError::EmptySuperset {
                        exercise: name.to_string(),
                    });
                }
                let sub_exercises = self
                    .subs
                    .iter()
                    .map(|sub| sub.validate(sets, name))
                    .collect::<Result<Vec<_>, _>>()?;
                ExerciseBody::Superset { sub_exercises }
            }
        };

        Ok(Exercise {
            id: self.id.clone().unwrap_or_else(new_id),
            name: name.to_string(),
            set_count: sets,
            rest_between_sets_seconds: rest,
            body,
        })
    }
}

impl RoutineDraft {
    pub fn validate(&self) -> Result<Routine, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingRoutineName);
        }
        if self.exercises.is_empty() {
            return Err(ValidationError::NoExercises);
        }

        let exercises = self
            .exercises
            .iter()
            .map(ExerciseDraft::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Routine {
            id: self.id.clone().unwrap_or_else(new_id),
            name: name.to_string(),
            exercises,
        })
    }
}

/// Routine collection edits
pub struct RoutineBook<'a, S: DocumentStore> {
    storage: &'a mut Storage<S>,
}

impl<'a, S: DocumentStore> RoutineBook<'a, S> {
    pub fn new(storage: &'a mut Storage<S>) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Result<Vec<Routine>> {
        self.storage.routines()
    }

    pub fn find(&self, id: &str) -> Result<Option<Routine>> {
        Ok(self.list()?.into_iter().find(|r| r.id == id))
    }

    /// Validate and store. An existing id is replaced in place, a new one is
    /// appended. Validation errors come back in `Ok(Err(..))` and leave the
    /// stored list untouched.
    pub fn save(&mut self, draft: &RoutineDraft) -> Result<Result<Routine, ValidationError>> {
        let routine = match draft.validate() {
            Ok(routine) => routine,
            Err(e) => return Ok(Err(e)),
        };

        let mut routines = self.storage.routines()?;
        match routines.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => *existing = routine.clone(),
            None => routines.push(routine.clone()),
        }
        self.storage.save_routines(&routines)?;
        info!(id = %routine.id, name = %routine.name, "Routine saved");
        Ok(Ok(routine))
    }

    /// Remove by id. History entries pointing at it are kept.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut routines = self.storage.routines()?;
        let before = routines.len();
        routines.retain(|r| r.id != id);
        if routines.len() == before {
            return Ok(false);
        }
        self.storage.save_routines(&routines)?;
        info!(id, "Routine deleted");
        Ok(true)
    }
}

/// Validate and store the user's name
pub fn save_profile<S: DocumentStore>(storage: &mut Storage<S>, name: &str) -> Result<Result<UserProfile, ValidationError>> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(Err(ValidationError::EmptyProfileName));
    }
    let profile = UserProfile { name: name.to_string() };
    storage.save_profile(&profile)?;
    Ok(Ok(profile))
}

/// Validate and store the rotation pool size
pub fn save_config<S: DocumentStore>(storage: &mut Storage<S>, active_count: &str) -> Result<Result<AppConfig, ValidationError>> {
    let active_routine_count = match active_count.trim().parse::<i64>() {
        Ok(n) if n > 0 => n,
        _ => return Ok(Err(ValidationError::InvalidActiveCount)),
    };
    let config = AppConfig { active_routine_count };
    storage.save_config(&config)?;
    Ok(Ok(config))
}
