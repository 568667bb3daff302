//! Routine model - exercises, routines, history and the in-progress snapshot

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-set goal: the same value every set, or one value per set.
///
/// Serialized as a bare integer or an array of integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    Fixed(u32),
    PerSet(Vec<u32>),
}

impl Target {
    /// Value for a 1-indexed set. Sets past the end of a per-set
    /// sequence reuse its last value; an empty sequence yields 0.
    pub fn for_set(&self, set: u32) -> u32 {
        match self {
            Target::Fixed(value) => *value,
            Target::PerSet(values) => {
                let idx = set.saturating_sub(1) as usize;
                values.get(idx).or(values.last()).copied().unwrap_or(0)
            }
        }
    }

    /// Short label for previews: "10" or "Var"
    pub fn label(&self) -> String {
        match self {
            Target::Fixed(value) => value.to_string(),
            Target::PerSet(_) => "Var".to_string(),
        }
    }
}

/// What a target counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Reps,
    /// Seconds
    Time,
}

/// Body of a sub-exercise inside a superset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Drill {
    Reps { target: Target },
    Time { target: Target },
}

impl Drill {
    pub fn measure(&self) -> Measure {
        match self {
            Drill::Reps { .. } => Measure::Reps,
            Drill::Time { .. } => Measure::Time,
        }
    }

    pub fn target(&self) -> &Target {
        match self {
            Drill::Reps { target } | Drill::Time { target } => target,
        }
    }
}

/// One member of a superset; inherits set count and rest from its parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubExercise {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub drill: Drill,
}

/// Exercise kind with its payload. The kind decides whether there is a
/// target or a list of sub-exercises, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExerciseBody {
    Reps {
        target: Target,
    },
    Time {
        target: Target,
    },
    Superset {
        #[serde(rename = "subExercises")]
        sub_exercises: Vec<SubExercise>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub set_count: u32,
    pub rest_between_sets_seconds: u32,
    #[serde(flatten)]
    pub body: ExerciseBody,
}

/// The thing the user is asked to do right now: a simple exercise, or one
/// sub-exercise of a superset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
    pub name: &'a str,
    pub measure: Measure,
    pub target: &'a Target,
}

impl Exercise {
    pub fn kind_label(&self) -> &'static str {
        match self.body {
            ExerciseBody::Reps { .. } => "reps",
            ExerciseBody::Time { .. } => "time",
            ExerciseBody::Superset { .. } => "superset",
        }
    }

    pub fn is_superset(&self) -> bool {
        matches!(self.body, ExerciseBody::Superset { .. })
    }

    /// Sub-exercises of a superset, empty for simple exercises
    pub fn sub_exercises(&self) -> &[SubExercise] {
        match &self.body {
            ExerciseBody::Superset { sub_exercises } => sub_exercises,
            ExerciseBody::Reps { .. } | ExerciseBody::Time { .. } => &[],
        }
    }

    /// Actionable descriptor. `sub_index` is ignored for simple exercises.
    pub fn descriptor(&self, sub_index: usize) -> Option<Descriptor<'_>> {
        match &self.body {
            ExerciseBody::Reps { target } => Some(Descriptor {
                name: &self.name,
                measure: Measure::Reps,
                target,
            }),
            ExerciseBody::Time { target } => Some(Descriptor {
                name: &self.name,
                measure: Measure::Time,
                target,
            }),
            ExerciseBody::Superset { sub_exercises } => {
                sub_exercises.get(sub_index).map(|sub| Descriptor {
                    name: &sub.name,
                    measure: sub.drill.measure(),
                    target: sub.drill.target(),
                })
            }
        }
    }

    /// One-line preview, e.g. "3 x 10 reps" or "3 sets: Curl + Press"
    pub fn summary(&self) -> String {
        match &self.body {
            ExerciseBody::Reps { target } => format!("{} x {} reps", self.set_count, target.label()),
            ExerciseBody::Time { target } => format!("{} x {}s", self.set_count, target.label()),
            ExerciseBody::Superset { sub_exercises } => {
                let names: Vec<&str> = sub_exercises.iter().map(|s| s.name.as_str()).collect();
                format!("{} sets: {}", self.set_count, names.join(" + "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub exercises: Vec<Exercise>,
}

/// Completed (or terminated) session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub date: NaiveDate,
    /// None or dangling once the routine is deleted; name/index stay usable
    pub routine_id: Option<String>,
    pub routine_name: String,
    pub routine_index: usize,
}

/// Rotation pool configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub active_routine_count: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            active_routine_count: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

/// Logical position inside a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub exercise_index: usize,
    /// 1-indexed
    pub current_set: u32,
    pub sub_exercise_index: usize,
}

impl Position {
    pub fn start() -> Self {
        Self {
            exercise_index: 0,
            current_set: 1,
            sub_exercise_index: 0,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

/// Persisted position of an unfinished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub routine_id: String,
    pub date: NaiveDate,
    pub exercise_index: usize,
    pub current_set: u32,
    pub sub_exercise_index: usize,
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn position(&self) -> Position {
        Position {
            exercise_index: self.exercise_index,
            current_set: self.current_set,
            sub_exercise_index: self.sub_exercise_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn superset() -> Exercise {
        Exercise {
            id: "ss".to_string(),
            name: "Arms".to_string(),
            set_count: 3,
            rest_between_sets_seconds: 60,
            body: ExerciseBody::Superset {
                sub_exercises: vec![
                    SubExercise {
                        id: "a".to_string(),
                        name: "Curl".to_string(),
                        drill: Drill::Reps { target: Target::Fixed(12) },
                    },
                    SubExercise {
                        id: "b".to_string(),
                        name: "Hang".to_string(),
                        drill: Drill::Time { target: Target::PerSet(vec![20, 30]) },
                    },
                ],
            },
        }
    }

    #[test]
    fn test_target_fixed_same_every_set() {
        let target = Target::Fixed(10);
        assert_eq!(target.for_set(1), 10);
        assert_eq!(target.for_set(5), 10);
    }

    #[test]
    fn test_target_per_set_clamps_to_last() {
        let target = Target::PerSet(vec![10, 12]);
        assert_eq!(target.for_set(1), 10);
        assert_eq!(target.for_set(2), 12);
        assert_eq!(target.for_set(3), 12);
    }

    #[test]
    fn test_target_empty_sequence_is_zero() {
        assert_eq!(Target::PerSet(vec![]).for_set(1), 0);
    }

    #[test]
    fn test_descriptor_simple_ignores_sub_index() {
        let exercise = Exercise {
            id: "p".to_string(),
            name: "Pushups".to_string(),
            set_count: 3,
            rest_between_sets_seconds: 0,
            body: ExerciseBody::Reps { target: Target::Fixed(15) },
        };
        let desc = exercise.descriptor(4).unwrap();
        assert_eq!(desc.name, "Pushups");
        assert_eq!(desc.measure, Measure::Reps);
    }

    #[test]
    fn test_descriptor_superset_picks_sub() {
        let exercise = superset();
        let desc = exercise.descriptor(1).unwrap();
        assert_eq!(desc.name, "Hang");
        assert_eq!(desc.measure, Measure::Time);
        assert_eq!(desc.target.for_set(2), 30);
        assert!(exercise.descriptor(2).is_none());
    }

    #[test]
    fn test_summary() {
        assert_eq!(superset().summary(), "3 sets: Curl + Hang");
    }

    #[test]
    fn test_exercise_json_shape() {
        let json = serde_json::to_value(superset()).unwrap();
        assert_eq!(json["kind"], "superset");
        assert_eq!(json["setCount"], 3);
        assert_eq!(json["restBetweenSetsSeconds"], 60);
        assert_eq!(json["subExercises"][0]["kind"], "reps");
        assert_eq!(json["subExercises"][0]["target"], 12);
        assert_eq!(json["subExercises"][1]["target"][1], 30);
        assert!(json.get("target").is_none());
    }

    #[test]
    fn test_exercise_parses_per_set_target() {
        let json = r#"{"id":"x","name":"Plank","kind":"time","setCount":3,
            "restBetweenSetsSeconds":30,"target":[30,45,60]}"#;
        let exercise: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(exercise.body, ExerciseBody::Time { target: Target::PerSet(vec![30, 45, 60]) });
    }

    #[test]
    fn test_default_config() {
        assert_eq!(AppConfig::default().active_routine_count, 3);
    }
}
