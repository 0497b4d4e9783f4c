use crate::workout::{ExerciseEntry, ExerciseId, ExercisesManager, SetId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tracks which (exercise, set) pairs are done and where the cursor sits.
///
/// Completion is keyed by stable ids, never by position; list mutation
/// leaves other exercises' completion marks untouched. The cursor is
/// positional and is clamped back into bounds after every list mutation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressTracker {
    exercise_index: usize,
    set_index: usize,
    completed: HashSet<(ExerciseId, SetId)>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    pub fn set_index(&self) -> usize {
        self.set_index
    }

    /// Ids under the cursor, or None when the exercise list is empty.
    pub fn current_ids(&self, manager: &ExercisesManager) -> Option<(ExerciseId, SetId)> {
        let exercise = manager.exercise_at(self.exercise_index)?;
        let set = exercise.sets.get(self.set_index)?;
        Some((exercise.id, set.id))
    }

    /// Flip membership of (exercise, set) in the completed set.
    /// Returns true when the pair is now completed.
    pub fn toggle_completion(&mut self, exercise_id: ExerciseId, set_id: SetId) -> bool {
        let key = (exercise_id, set_id);
        if self.completed.remove(&key) {
            false
        } else {
            self.completed.insert(key);
            true
        }
    }

    pub fn is_completed(&self, exercise_id: ExerciseId, set_id: SetId) -> bool {
        self.completed.contains(&(exercise_id, set_id))
    }

    /// True iff every set of the exercise is completed; vacuously true for
    /// an exercise with zero sets (the manager never produces one, but the
    /// definition is kept total).
    pub fn is_exercise_complete(&self, exercise: &ExerciseEntry) -> bool {
        exercise
            .sets
            .iter()
            .all(|s| self.completed.contains(&(exercise.id, s.id)))
    }

    pub fn completed_count_for(&self, exercise: &ExerciseEntry) -> usize {
        exercise
            .sets
            .iter()
            .filter(|s| self.completed.contains(&(exercise.id, s.id)))
            .count()
    }

    pub fn completed_total(&self) -> usize {
        self.completed.len()
    }

    /// Drop completion records belonging to a removed exercise.
    pub fn forget_exercise(&mut self, exercise: &ExerciseEntry) {
        self.completed.retain(|(eid, _)| *eid != exercise.id);
    }

    /// Drop the completion record of a removed set.
    pub fn forget_set(&mut self, exercise_id: ExerciseId, set_id: SetId) {
        self.completed.remove(&(exercise_id, set_id));
    }

    /// Next set within the exercise, else first set of the next exercise,
    /// else stay put. No wraparound. Returns true when the cursor moved.
    pub fn advance_to_next_set(&mut self, manager: &ExercisesManager) -> bool {
        let Some(exercise) = manager.exercise_at(self.exercise_index) else {
            return false;
        };
        if self.set_index + 1 < exercise.sets.len() {
            self.set_index += 1;
            true
        } else if self.exercise_index + 1 < manager.len() {
            self.exercise_index += 1;
            self.set_index = 0;
            true
        } else {
            false
        }
    }

    /// Previous set, crossing exercise boundaries onto the last set of the
    /// previous exercise. Floors at (0, 0).
    pub fn advance_to_previous_set(&mut self, manager: &ExercisesManager) -> bool {
        if self.set_index > 0 {
            self.set_index -= 1;
            true
        } else if self.exercise_index > 0 {
            self.exercise_index -= 1;
            self.set_index = manager
                .exercise_at(self.exercise_index)
                .map(|e| e.sets.len().saturating_sub(1))
                .unwrap_or(0);
            true
        } else {
            false
        }
    }

    /// Move the exercise cursor forward, resetting the set cursor,
    /// independent of set-level completion.
    pub fn advance_to_next_exercise(&mut self, manager: &ExercisesManager) -> bool {
        if self.exercise_index + 1 < manager.len() {
            self.exercise_index += 1;
            self.set_index = 0;
            true
        } else {
            false
        }
    }

    pub fn advance_to_previous_exercise(&mut self, _manager: &ExercisesManager) -> bool {
        if self.exercise_index > 0 {
            self.exercise_index -= 1;
            self.set_index = 0;
            true
        } else {
            false
        }
    }

    /// Clamp the cursor back into bounds after any list mutation. With an
    /// empty list the cursor parks at (0, 0) and is treated as undefined
    /// by the controller.
    pub fn renormalize(&mut self, manager: &ExercisesManager) {
        if manager.is_empty() {
            self.exercise_index = 0;
            self.set_index = 0;
            return;
        }
        self.exercise_index = self.exercise_index.min(manager.len() - 1);
        let set_count = manager
            .exercise_at(self.exercise_index)
            .map(|e| e.sets.len())
            .unwrap_or(1);
        self.set_index = self.set_index.min(set_count.saturating_sub(1));
    }
}
