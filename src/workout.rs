use crate::catalog::BodyPart;
use serde::{Deserialize, Serialize};

/// Stable identifier for an exercise within one session. Never reused,
/// so completion records keyed by id survive list mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExerciseId(pub u64);

/// Stable identifier for a set within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SetId(pub u64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    pub id: SetId,
    pub reps: u32,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    pub id: ExerciseId,
    pub name: String,
    pub body_part: BodyPart,
    /// Optional reference back into the exercise catalog (icon lookup etc.)
    pub catalog_key: Option<String>,
    pub sets: Vec<SetEntry>,
    pub rest_secs: u32,
}

/// Inbound workout definition used to seed a session. Builtin workouts are
/// deserialized from embedded JSON; the same shape works for user files.
#[derive(Clone, Debug, Deserialize)]
pub struct Workout {
    pub id: String,
    pub name: String,
    pub exercises: Vec<WorkoutExercise>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorkoutExercise {
    pub name: String,
    pub body_part: BodyPart,
    #[serde(default)]
    pub catalog_key: Option<String>,
    #[serde(default)]
    pub sets: Vec<SetTemplate>,
    #[serde(default)]
    pub rest_secs: Option<u32>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct SetTemplate {
    pub reps: u32,
    pub weight: f64,
}

/// Outcome of a set-removal attempt. Removing the last set of an exercise
/// is rejected, surfaced to the user as a warning rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoveSet {
    Removed,
    LastSet,
    NotFound,
}

/// Owns the ordered, mutable list of exercises for one session and is the
/// single source of truth for what exercises/sets exist right now. All
/// mutation goes through the session controller, which renormalizes the
/// cursor afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExercisesManager {
    entries: Vec<ExerciseEntry>,
    next_id: u64,
}

impl ExercisesManager {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Seed from a workout definition. Exercises without set templates get
    /// a single default set; `default_rest_secs` fills in missing rest.
    pub fn from_workout(workout: &Workout, default_rest_secs: u32) -> Self {
        let mut manager = Self::new();
        for ex in &workout.exercises {
            if let Some(id) = manager.append(
                &ex.name,
                ex.body_part,
                ex.catalog_key.clone(),
                ex.rest_secs.unwrap_or(default_rest_secs),
            ) {
                if !ex.sets.is_empty() {
                    // append() created one default set; overwrite it with the
                    // templates so ids stay dense.
                    let entry = manager.entry_mut(id).unwrap();
                    entry.sets.clear();
                    for tpl in &ex.sets {
                        let sid = SetId(manager.next_id);
                        manager.next_id += 1;
                        let entry = manager.entry_mut(id).unwrap();
                        entry.sets.push(SetEntry {
                            id: sid,
                            reps: tpl.reps,
                            weight: tpl.weight.max(0.0),
                        });
                    }
                }
            }
        }
        manager
    }

    /// Append a new exercise with one default (zero reps/weight) set.
    /// A blank name is treated as an invalid entry and ignored.
    pub fn append(
        &mut self,
        name: &str,
        body_part: BodyPart,
        catalog_key: Option<String>,
        rest_secs: u32,
    ) -> Option<ExerciseId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = ExerciseId(self.next_id);
        self.next_id += 1;
        let set_id = SetId(self.next_id);
        self.next_id += 1;

        self.entries.push(ExerciseEntry {
            id,
            name: name.to_string(),
            body_part,
            catalog_key,
            sets: vec![SetEntry {
                id: set_id,
                reps: 0,
                weight: 0.0,
            }],
            rest_secs,
        });
        Some(id)
    }

    /// Remove an exercise, returning it so the caller can drop its
    /// completion records.
    pub fn remove(&mut self, id: ExerciseId) -> Option<ExerciseEntry> {
        let idx = self.index_of(id)?;
        Some(self.entries.remove(idx))
    }

    /// Append a default set to an exercise.
    pub fn add_set(&mut self, exercise_id: ExerciseId) -> Option<SetId> {
        let sid = SetId(self.next_id);
        let entry = self.entry_mut(exercise_id)?;
        entry.sets.push(SetEntry {
            id: sid,
            reps: 0,
            weight: 0.0,
        });
        self.next_id += 1;
        Some(sid)
    }

    /// Remove a set unless it is the exercise's last remaining one.
    pub fn remove_set(&mut self, exercise_id: ExerciseId, set_id: SetId) -> RemoveSet {
        let Some(entry) = self.entry_mut(exercise_id) else {
            return RemoveSet::NotFound;
        };
        let Some(idx) = entry.sets.iter().position(|s| s.id == set_id) else {
            return RemoveSet::NotFound;
        };
        if entry.sets.len() == 1 {
            return RemoveSet::LastSet;
        }
        entry.sets.remove(idx);
        RemoveSet::Removed
    }

    /// In-place reps/weight update. Does not touch completion state.
    pub fn update_set(
        &mut self,
        exercise_id: ExerciseId,
        set_id: SetId,
        reps: u32,
        weight: f64,
    ) -> bool {
        if let Some(entry) = self.entry_mut(exercise_id) {
            if let Some(set) = entry.sets.iter_mut().find(|s| s.id == set_id) {
                set.reps = reps;
                set.weight = weight.max(0.0);
                return true;
            }
        }
        false
    }

    pub fn entries(&self) -> &[ExerciseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ExerciseId) -> Option<&ExerciseEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn exercise_at(&self, index: usize) -> Option<&ExerciseEntry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: ExerciseId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn total_sets(&self) -> usize {
        self.entries.iter().map(|e| e.sets.len()).sum()
    }

    fn entry_mut(&mut self, id: ExerciseId) -> Option<&mut ExerciseEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

impl Default for ExercisesManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_with(names: &[&str]) -> ExercisesManager {
        let mut m = ExercisesManager::new();
        for name in names {
            m.append(name, BodyPart::Chest, None, 90).unwrap();
        }
        m
    }

    #[test]
    fn test_append_creates_one_default_set() {
        let m = manager_with(&["Bench Press"]);

        assert_eq!(m.len(), 1);
        let entry = &m.entries()[0];
        assert_eq!(entry.name, "Bench Press");
        assert_eq!(entry.sets.len(), 1);
        assert_eq!(entry.sets[0].reps, 0);
        assert_eq!(entry.sets[0].weight, 0.0);
        assert_eq!(entry.rest_secs, 90);
    }

    #[test]
    fn test_append_blank_name_rejected() {
        let mut m = ExercisesManager::new();

        assert_eq!(m.append("", BodyPart::Back, None, 60), None);
        assert_eq!(m.append("   ", BodyPart::Back, None, 60), None);
        assert!(m.is_empty());
    }

    #[test]
    fn test_ids_are_unique_across_exercises_and_sets() {
        let mut m = manager_with(&["A", "B"]);
        let a = m.entries()[0].id;
        m.add_set(a).unwrap();

        let mut seen = std::collections::HashSet::new();
        for e in m.entries() {
            assert!(seen.insert(e.id.0));
            for s in &e.sets {
                assert!(seen.insert(s.id.0));
            }
        }
    }

    #[test]
    fn test_remove_returns_entry() {
        let mut m = manager_with(&["A", "B", "C"]);
        let b = m.entries()[1].id;

        let removed = m.remove(b).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(m.len(), 2);
        assert_eq!(m.entries()[1].name, "C");
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut m = manager_with(&["A"]);
        assert!(m.remove(ExerciseId(999)).is_none());
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_add_set_appends() {
        let mut m = manager_with(&["A"]);
        let a = m.entries()[0].id;

        let sid = m.add_set(a).unwrap();
        assert_eq!(m.entries()[0].sets.len(), 2);
        assert_eq!(m.entries()[0].sets[1].id, sid);
    }

    #[test]
    fn test_remove_set() {
        let mut m = manager_with(&["A"]);
        let a = m.entries()[0].id;
        let extra = m.add_set(a).unwrap();

        assert_eq!(m.remove_set(a, extra), RemoveSet::Removed);
        assert_eq!(m.entries()[0].sets.len(), 1);
    }

    #[test]
    fn test_remove_last_set_rejected() {
        let mut m = manager_with(&["A"]);
        let a = m.entries()[0].id;
        let only = m.entries()[0].sets[0].id;

        assert_eq!(m.remove_set(a, only), RemoveSet::LastSet);
        assert_eq!(m.entries()[0].sets.len(), 1);
    }

    #[test]
    fn test_remove_set_unknown_ids() {
        let mut m = manager_with(&["A"]);
        let a = m.entries()[0].id;

        assert_eq!(m.remove_set(ExerciseId(999), SetId(1)), RemoveSet::NotFound);
        assert_eq!(m.remove_set(a, SetId(999)), RemoveSet::NotFound);
    }

    #[test]
    fn test_update_set_clamps_weight() {
        let mut m = manager_with(&["A"]);
        let a = m.entries()[0].id;
        let s = m.entries()[0].sets[0].id;

        assert!(m.update_set(a, s, 8, -10.0));
        assert_eq!(m.entries()[0].sets[0].reps, 8);
        assert_eq!(m.entries()[0].sets[0].weight, 0.0);

        assert!(m.update_set(a, s, 5, 62.5));
        assert_eq!(m.entries()[0].sets[0].weight, 62.5);
    }

    #[test]
    fn test_update_set_unknown() {
        let mut m = manager_with(&["A"]);
        let a = m.entries()[0].id;
        assert!(!m.update_set(a, SetId(999), 5, 10.0));
    }

    #[test]
    fn test_from_workout_with_templates() {
        let workout = Workout {
            id: "w1".into(),
            name: "Push Day".into(),
            exercises: vec![
                WorkoutExercise {
                    name: "Bench Press".into(),
                    body_part: BodyPart::Chest,
                    catalog_key: Some("bench-press".into()),
                    sets: vec![
                        SetTemplate {
                            reps: 8,
                            weight: 60.0,
                        },
                        SetTemplate {
                            reps: 8,
                            weight: 60.0,
                        },
                        SetTemplate {
                            reps: 6,
                            weight: 65.0,
                        },
                    ],
                    rest_secs: Some(120),
                },
                WorkoutExercise {
                    name: "Overhead Press".into(),
                    body_part: BodyPart::Shoulders,
                    catalog_key: None,
                    sets: vec![],
                    rest_secs: None,
                },
            ],
        };

        let m = ExercisesManager::from_workout(&workout, 90);
        assert_eq!(m.len(), 2);
        assert_eq!(m.entries()[0].sets.len(), 3);
        assert_eq!(m.entries()[0].sets[2].reps, 6);
        assert_eq!(m.entries()[0].rest_secs, 120);
        // no templates -> one default set, default rest
        assert_eq!(m.entries()[1].sets.len(), 1);
        assert_eq!(m.entries()[1].rest_secs, 90);
        assert_eq!(m.total_sets(), 4);
    }

    #[test]
    fn test_index_of_tracks_positions() {
        let mut m = manager_with(&["A", "B", "C"]);
        let c = m.entries()[2].id;
        assert_eq!(m.index_of(c), Some(2));

        let a = m.entries()[0].id;
        m.remove(a);
        assert_eq!(m.index_of(c), Some(1));
    }
}
