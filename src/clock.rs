use std::time::SystemTime;

/// Continuously running elapsed-time counter for the whole session,
/// including rest. Never paused. Every tick recomputes
/// `elapsed = now - started_at` from the absolute start instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionClock {
    started_at: SystemTime,
    elapsed_secs: f64,
}

impl SessionClock {
    pub fn start_now() -> Self {
        Self::resumed(SystemTime::now())
    }

    /// Rebuild the clock from a snapshotted start instant.
    pub fn resumed(started_at: SystemTime) -> Self {
        let mut clock = Self {
            started_at,
            elapsed_secs: 0.0,
        };
        clock.on_tick(SystemTime::now());
        clock
    }

    pub fn on_tick(&mut self, now: SystemTime) -> f64 {
        self.elapsed_secs = now
            .duration_since(self.started_at)
            .unwrap_or_default()
            .as_secs_f64();
        self.elapsed_secs
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }
}
