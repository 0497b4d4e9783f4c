use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, SystemTime};

use repset::catalog::{BodyPart, CatalogEntry, CatalogSource, EmbeddedCatalog};
use repset::session::{ResultSink, SaveError, Session, SessionResult};
use repset::workout::{SetTemplate, Workout, WorkoutExercise};

/// Sink that records saved results so tests can inspect what finish() wrote.
#[derive(Clone, Default)]
struct VecSink {
    saved: Rc<RefCell<Vec<SessionResult>>>,
}

impl ResultSink for VecSink {
    fn save(&mut self, result: &SessionResult) -> Result<(), SaveError> {
        self.saved.borrow_mut().push(result.clone());
        Ok(())
    }
}

fn push_day() -> Workout {
    Workout {
        id: "test-push".into(),
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
                ],
                rest_secs: Some(90),
            },
            WorkoutExercise {
                name: "Overhead Press".into(),
                body_part: BodyPart::Shoulders,
                catalog_key: Some("overhead-press".into()),
                sets: vec![SetTemplate {
                    reps: 10,
                    weight: 30.0,
                }],
                rest_secs: Some(60),
            },
        ],
    }
}

fn start_session(sink: VecSink) -> Session {
    Session::start(
        &push_day(),
        90,
        Box::new(EmbeddedCatalog::new()),
        Box::new(sink),
    )
}

#[test]
fn full_session_records_results() {
    let sink = VecSink::default();
    let mut session = start_session(sink.clone());
    let t0 = session.started_at();

    // Complete both bench sets; each completion starts a rest which we skip
    session.toggle_current(t0 + Duration::from_secs(10));
    session.skip_rest(t0 + Duration::from_secs(40));
    session.toggle_current(t0 + Duration::from_secs(60));
    session.skip_rest(t0 + Duration::from_secs(100));

    // Cursor should now be on the overhead press
    assert_eq!(session.progress().exercise_index(), 1);
    session.toggle_current(t0 + Duration::from_secs(120));
    session.skip_rest(t0 + Duration::from_secs(140));

    session.finish(t0 + Duration::from_secs(200)).unwrap();
    assert!(session.is_ended());

    let saved = sink.saved.borrow();
    assert_eq!(saved.len(), 1);
    let result = &saved[0];
    assert_eq!(result.workout_name, "Push Day");
    assert_eq!(result.completed_sets(), 3);
    assert_eq!(result.total_sets(), 3);
    assert!((result.total_elapsed_secs - 200.0).abs() < 1.0);
    // Rest banked from the three skips: 30s + 40s + 20s
    assert!((result.total_rest_secs - 90.0).abs() < 1.0);
}

#[test]
fn commands_after_finish_are_ignored() {
    let sink = VecSink::default();
    let mut session = start_session(sink.clone());
    let t0 = session.started_at();

    session.finish(t0 + Duration::from_secs(5)).unwrap();
    let before = session.exercises().len();

    session.add_exercise("Curls", BodyPart::Arms);
    session.toggle_current(t0 + Duration::from_secs(6));
    session.advance_to_next_set();

    assert_eq!(session.exercises().len(), before);
    assert_eq!(session.progress().completed_total(), 0);
    assert_eq!(sink.saved.borrow().len(), 1);
}

#[test]
fn completion_survives_list_mutation() {
    let sink = VecSink::default();
    let mut session = start_session(sink);
    let t0 = session.started_at();

    // Complete the first bench set
    session.toggle_current(t0 + Duration::from_secs(5));
    let bench = session.exercises().exercise_at(0).unwrap().id;
    let done_before = session.progress().completed_count_for(
        session.exercises().get(bench).unwrap(),
    );
    assert_eq!(done_before, 1);

    // Insert a new exercise in front of nothing (appends), then remove the
    // shoulder press: bench completion must be untouched
    session.add_exercise("Dips", BodyPart::Chest);
    let ohp = session.exercises().exercise_at(1).unwrap().id;
    session.remove_exercise(ohp);

    let done_after = session.progress().completed_count_for(
        session.exercises().get(bench).unwrap(),
    );
    assert_eq!(done_after, 1);
    assert_eq!(session.exercises().len(), 2);
}

#[test]
fn removing_current_exercise_renormalizes_cursor() {
    let sink = VecSink::default();
    let mut session = start_session(sink);

    session.advance_to_next_exercise();
    assert_eq!(session.progress().exercise_index(), 1);

    let ohp = session.exercises().exercise_at(1).unwrap().id;
    session.remove_exercise(ohp);

    // Cursor clamped back onto a live exercise
    assert_eq!(session.progress().exercise_index(), 0);
    assert!(session
        .progress()
        .current_ids(session.exercises())
        .is_some());
}

#[test]
fn rest_adjustment_floors_and_skip_banks() {
    let sink = VecSink::default();
    let mut session = start_session(sink);
    let t0 = session.started_at();

    session.toggle_current(t0 + Duration::from_secs(5));
    assert!(session.rest_timer().is_running());

    // 90s configured, -90 floors at 15
    session.adjust_rest(-90, t0 + Duration::from_secs(6));
    let remaining = session
        .rest_remaining_secs()
        .expect("rest should still run");
    assert!(remaining <= 15.0);

    session.skip_rest(t0 + Duration::from_secs(10));
    assert!(!session.rest_timer().is_running());
    assert!((session.total_rest_secs() - 5.0).abs() < 0.01);
}

#[test]
fn added_catalog_exercise_is_usable_immediately() {
    let sink = VecSink::default();
    let mut session = start_session(sink);
    let t0 = session.started_at();

    let results = session.search_catalog("squat", None);
    assert!(!results.is_empty());
    let entry: CatalogEntry = results[0].clone();
    session.add_exercise_from_catalog(&entry);

    let added = session
        .exercises()
        .exercise_at(session.exercises().len() - 1)
        .unwrap();
    assert_eq!(added.name, entry.name);
    assert!(!added.sets.is_empty());

    // Jump to it and complete its first set
    session.advance_to_next_exercise();
    session.advance_to_next_exercise();
    assert_eq!(
        session.progress().exercise_index(),
        session.exercises().len() - 1
    );
    session.toggle_current(t0 + Duration::from_secs(5));
    assert_eq!(session.progress().completed_total(), 1);
}

#[test]
fn catalog_search_filters_by_body_part() {
    let catalog = EmbeddedCatalog::new();
    let all = catalog.search("", None);
    let legs = catalog.search("", Some(BodyPart::Legs));
    assert!(!legs.is_empty());
    assert!(legs.len() < all.len());
    assert!(legs.iter().all(|e| e.body_part == BodyPart::Legs));
}
