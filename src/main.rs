mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyCode,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, SystemTime},
};

use repset::{
    catalog::{builtin_workout, builtin_workout_names, BodyPart, CatalogEntry, EmbeddedCatalog},
    config::{Config, ConfigStore, FileConfigStore},
    history::HistoryDb,
    runtime::{CrosstermEventSource, Runner, SessionEvent, SessionEventSource},
    session::Session,
    snapshot::{FileSnapshotStore, SessionSnapshot, SnapshotStore},
    util::format_duration,
    workout::Workout,
};

const NOTICE_SECS: u64 = 3;

/// terminal workout session runner
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Runs you through a workout in the terminal: live session clock, per-exercise rest countdowns, set-by-set progress tracking, and a local history of finished sessions."
)]
pub struct Cli {
    /// builtin workout to start (see --list-workouts)
    #[clap(short = 'w', long, default_value = "push")]
    workout: String,

    /// start from a workout definition file (JSON) instead of a builtin
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// resume the last interrupted session if a snapshot exists
    #[clap(short = 'r', long)]
    resume: bool,

    /// override the default rest period in seconds
    #[clap(long)]
    rest: Option<u32>,

    /// list recent sessions and exit
    #[clap(long)]
    history: bool,

    /// export the whole session history as CSV and exit
    #[clap(long, value_name = "PATH")]
    export_csv: Option<PathBuf>,

    /// list builtin workouts and exit
    #[clap(long)]
    list_workouts: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Active,
    Search,
    Summary,
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub query: String,
    pub body_part: Option<BodyPart>,
    pub results: Vec<CatalogEntry>,
    pub selected: usize,
}

pub struct App {
    pub session: Session,
    pub config: Config,
    pub state: AppState,
    pub search: SearchState,
    pub notice: Option<String>,
    notice_until: Option<SystemTime>,
    snapshot_store: FileSnapshotStore,
}

impl App {
    pub fn new(session: Session, config: Config, snapshot_store: FileSnapshotStore) -> Self {
        Self {
            session,
            config,
            state: AppState::Active,
            search: SearchState::default(),
            notice: None,
            notice_until: None,
            snapshot_store,
        }
    }

    /// Pull queued notices out of the session, keep the latest one visible.
    fn surface_notices(&mut self, now: SystemTime) {
        if let Some(notice) = self.session.drain_notices().pop() {
            self.notice = Some(notice.to_string());
            self.notice_until = Some(now + Duration::from_secs(NOTICE_SECS));
        }
    }

    fn expire_notice(&mut self, now: SystemTime) {
        if let Some(until) = self.notice_until {
            if now >= until {
                self.notice = None;
                self.notice_until = None;
            }
        }
    }

    /// Keep a recovery snapshot on disk while the session is live.
    fn autosave(&mut self, now: SystemTime) {
        if self.config.autosave_snapshot {
            self.suspend(now);
        }
    }

    /// Persist the snapshot for --resume, or drop it once the session ended.
    fn suspend(&mut self, now: SystemTime) {
        if self.session.is_ended() {
            let _ = self.snapshot_store.clear();
        } else {
            let snapshot = SessionSnapshot::capture(&self.session, now);
            let _ = self.snapshot_store.save(&snapshot);
        }
    }

    fn refresh_search(&mut self) {
        self.search.results = self
            .session
            .search_catalog(&self.search.query, self.search.body_part);
        if self.search.selected >= self.search.results.len() {
            self.search.selected = self.search.results.len().saturating_sub(1);
        }
    }

    fn current_set(&self) -> Option<(repset::workout::ExerciseId, repset::workout::SetId)> {
        self.session.progress().current_ids(self.session.exercises())
    }

    fn nudge_reps(&mut self, delta: i32) {
        if let Some((eid, sid)) = self.current_set() {
            let entry = self.session.exercises().get(eid).unwrap();
            let set = entry.sets.iter().find(|s| s.id == sid).unwrap();
            let reps = (set.reps as i32 + delta).max(0) as u32;
            let weight = set.weight;
            self.session.update_set(eid, sid, reps, weight);
        }
    }

    fn nudge_weight(&mut self, delta: f64) {
        if let Some((eid, sid)) = self.current_set() {
            let entry = self.session.exercises().get(eid).unwrap();
            let set = entry.sets.iter().find(|s| s.id == sid).unwrap();
            let reps = set.reps;
            let weight = (set.weight + delta).max(0.0);
            self.session.update_set(eid, sid, reps, weight);
        }
    }
}

fn load_workout(cli: &Cli) -> Result<Workout, Box<dyn Error>> {
    if let Some(path) = &cli.file {
        let contents = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&contents)?);
    }
    builtin_workout(&cli.workout)
        .ok_or_else(|| format!("unknown workout '{}' (see --list-workouts)", cli.workout).into())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_workouts {
        for name in builtin_workout_names() {
            println!("{name}");
        }
        return Ok(());
    }

    if cli.history {
        let db = HistoryDb::new()?;
        for row in db.recent_sessions(20)? {
            println!(
                "{}  {:<24} {:>8}  {}/{} sets",
                row.started_at.format("%Y-%m-%d %H:%M"),
                row.workout_name,
                format_duration(row.elapsed_secs),
                row.completed_sets,
                row.total_sets,
            );
        }
        return Ok(());
    }

    if let Some(path) = &cli.export_csv {
        let db = HistoryDb::new()?;
        db.export_csv(path)?;
        println!("history exported to {}", path.display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut config = FileConfigStore::new().load();
    if let Some(rest) = cli.rest {
        config.default_rest_secs = rest;
    }

    let catalog = Box::new(EmbeddedCatalog::new());
    let sink = Box::new(HistoryDb::new()?);
    let snapshot_store = FileSnapshotStore::new();

    let session = if cli.resume {
        match snapshot_store.load() {
            Some(snapshot) => snapshot.restore(catalog, sink),
            None => return Err("no session snapshot to resume".into()),
        }
    } else {
        let workout = load_workout(&cli)?;
        Session::start(&workout, config.default_rest_secs, catalog, sink)
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, config, snapshot_store);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(app.config.tick_ms),
    );
    let res = run_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_tui<B: Backend, E: SessionEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            SessionEvent::Tick => {
                let now = SystemTime::now();
                app.session.on_tick(now);
                app.surface_notices(now);
                app.expire_notice(now);
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            SessionEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            SessionEvent::Suspend => {
                app.suspend(SystemTime::now());
                break;
            }
            SessionEvent::Key(key) => {
                let now = SystemTime::now();

                let quit = match app.state {
                    AppState::Active => handle_active_key(app, key.code, now),
                    AppState::Search => handle_search_key(app, key.code),
                    AppState::Summary => matches!(
                        key.code,
                        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
                    ),
                };

                app.surface_notices(now);
                if quit {
                    app.suspend(now);
                    break;
                }
                app.autosave(now);
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

/// Keys while the session runs. Returns true to quit.
fn handle_active_key(app: &mut App, code: KeyCode, now: SystemTime) -> bool {
    match code {
        // quitting mid-session keeps the snapshot for --resume
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Char(' ') => app.session.toggle_current(now),
        KeyCode::Down | KeyCode::Char('j') => app.session.advance_to_next_set(),
        KeyCode::Up | KeyCode::Char('k') => app.session.advance_to_previous_set(),
        KeyCode::Right | KeyCode::Char(']') => app.session.advance_to_next_exercise(),
        KeyCode::Left | KeyCode::Char('[') => app.session.advance_to_previous_exercise(),
        KeyCode::Char('a') => {
            if let Some((eid, _)) = app.current_set() {
                app.session.add_set(eid);
            }
        }
        KeyCode::Char('d') => {
            if let Some((eid, sid)) = app.current_set() {
                app.session.remove_set(eid, sid);
            }
        }
        KeyCode::Char('x') => {
            if let Some((eid, _)) = app.current_set() {
                app.session.remove_exercise(eid);
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => app.session.adjust_rest(15, now),
        KeyCode::Char('-') | KeyCode::Char('_') => app.session.adjust_rest(-15, now),
        KeyCode::Char('s') => app.session.skip_rest(now),
        KeyCode::Char('r') => app.nudge_reps(-1),
        KeyCode::Char('R') => app.nudge_reps(1),
        KeyCode::Char('w') => app.nudge_weight(-2.5),
        KeyCode::Char('W') => app.nudge_weight(2.5),
        KeyCode::Char('e') => {
            app.state = AppState::Search;
            app.search = SearchState::default();
            app.refresh_search();
        }
        KeyCode::Char('f') => {
            if app.session.finish(now).is_ok() {
                let _ = app.snapshot_store.clear();
                app.state = AppState::Summary;
            }
        }
        KeyCode::Char('D') => {
            app.session.discard();
            let _ = app.snapshot_store.clear();
            return true;
        }
        _ => {}
    }
    false
}

/// Keys in the add-exercise overlay. Returns true to quit.
fn handle_search_key(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Esc => app.state = AppState::Active,
        KeyCode::Enter => {
            if let Some(entry) = app.search.results.get(app.search.selected).cloned() {
                app.session.add_exercise_from_catalog(&entry);
            }
            app.state = AppState::Active;
        }
        KeyCode::Up => {
            app.search.selected = app.search.selected.saturating_sub(1);
        }
        KeyCode::Down => {
            if app.search.selected + 1 < app.search.results.len() {
                app.search.selected += 1;
            }
        }
        KeyCode::Backspace => {
            app.search.query.pop();
            app.refresh_search();
        }
        KeyCode::Char(c) => {
            app.search.query.push(c);
            app.refresh_search();
        }
        _ => {}
    }
    false
}
