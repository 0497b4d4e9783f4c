use crate::app_dirs::AppDirs;
use crate::catalog::CatalogSource;
use crate::clock::SessionClock;
use crate::progress::ProgressTracker;
use crate::rest::{ActiveRest, RestTimer};
use crate::session::{ResultSink, Session};
use crate::workout::{ExerciseId, ExercisesManager};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Flat serialization of the whole in-progress session, sufficient to
/// reconstruct it verbatim after the process is killed. Timestamps are
/// absolute (RFC3339) so the restored clock and rest deadline are correct
/// regardless of how long the process was gone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub workout_id: String,
    pub workout_name: String,
    pub started_at: DateTime<Utc>,
    /// Elapsed at the moment of the snapshot; informational, the restored
    /// clock recomputes from `started_at`.
    pub elapsed_secs: f64,
    pub total_rest_secs: f64,
    pub default_rest_secs: u32,
    pub exercises: ExercisesManager,
    pub progress: ProgressTracker,
    pub rest: Option<RestSnapshot>,
}

/// Active countdown at snapshot time. The absolute deadline lets resumption
/// decide whether it already expired while suspended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestSnapshot {
    pub exercise_id: ExerciseId,
    pub started_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub configured_secs: f64,
}

impl SessionSnapshot {
    pub fn capture(session: &Session, now: SystemTime) -> Self {
        Self {
            workout_id: session.workout_id().to_string(),
            workout_name: session.workout_name().to_string(),
            started_at: session.started_at().into(),
            elapsed_secs: now
                .duration_since(session.started_at())
                .unwrap_or_default()
                .as_secs_f64(),
            total_rest_secs: session.total_rest_secs(),
            default_rest_secs: session.default_rest_secs(),
            exercises: session.exercises().clone(),
            progress: session.progress().clone(),
            rest: session.rest_timer().active().map(|rest| RestSnapshot {
                exercise_id: rest.exercise_id,
                started_at: rest.started_at.into(),
                deadline: rest.deadline.into(),
                configured_secs: rest.configured_secs,
            }),
        }
    }

    /// Rehydrate a live session. A rest deadline that passed while the
    /// process was gone expires on the first tick, banking its configured
    /// duration and advancing the cursor exactly once.
    pub fn restore(
        &self,
        catalog: Box<dyn CatalogSource>,
        sink: Box<dyn ResultSink>,
    ) -> Session {
        let mut rest = RestTimer::new();
        if let Some(snap) = &self.rest {
            rest.resume(ActiveRest {
                exercise_id: snap.exercise_id,
                started_at: snap.started_at.into(),
                deadline: snap.deadline.into(),
                configured_secs: snap.configured_secs,
            });
        }

        Session::rebuild(
            self.workout_id.clone(),
            self.workout_name.clone(),
            SessionClock::resumed(self.started_at.into()),
            self.exercises.clone(),
            self.progress.clone(),
            rest,
            self.total_rest_secs,
            self.default_rest_secs,
            catalog,
            sink,
        )
    }
}

/// Where snapshots live. Trait seam so tests can point at a tempdir.
pub trait SnapshotStore {
    fn load(&self) -> Option<SessionSnapshot>;
    fn save(&self, snapshot: &SessionSnapshot) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::snapshot_path().unwrap_or_else(|| PathBuf::from("repset_session.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Option<SessionSnapshot> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice::<SessionSnapshot>(&bytes).ok()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(snapshot).unwrap_or_default();
        fs::write(&self.path, data)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
