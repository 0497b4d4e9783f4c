use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Unified event type consumed by the session loop. Timer ticks arrive
/// through the same channel as keystrokes.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// A key press to dispatch as a session command.
    Key(KeyEvent),
    /// Terminal geometry changed; redraw only.
    Resize,
    /// Tick interval elapsed with no input.
    Tick,
    /// Interrupt (Ctrl-C): persist the recovery snapshot and leave.
    Suspend,
}

/// Maps raw terminal input to session events. Key releases/repeats are
/// dropped so a command fires once per press.
fn translate(event: CtEvent) -> Option<SessionEvent> {
    match event {
        CtEvent::Key(key) if key.kind == KeyEventKind::Press => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                Some(SessionEvent::Suspend)
            } else {
                Some(SessionEvent::Key(key))
            }
        }
        CtEvent::Resize(_, _) => Some(SessionEvent::Resize),
        _ => None,
    }
}

/// Source of input events; `None` means the timeout elapsed.
pub trait SessionEventSource {
    fn poll(&self, timeout: Duration) -> Option<SessionEvent>;
}

/// Production source: a reader thread translating crossterm input.
pub struct CrosstermEventSource {
    rx: Receiver<SessionEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(raw) => {
                    if let Some(ev) = translate(raw) {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                }
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEventSource for CrosstermEventSource {
    fn poll(&self, timeout: Duration) -> Option<SessionEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Test source fed from an mpsc channel.
pub struct TestEventSource {
    rx: Receiver<SessionEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SessionEvent>) -> Self {
        Self { rx }
    }
}

impl SessionEventSource for TestEventSource {
    fn poll(&self, timeout: Duration) -> Option<SessionEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}

/// Advances the session one event at a time; an empty tick interval
/// becomes a `Tick` so the clock and rest countdown stay current.
pub struct Runner<E: SessionEventSource> {
    events: E,
    tick: Duration,
}

impl<E: SessionEventSource> Runner<E> {
    pub fn new(events: E, tick: Duration) -> Self {
        Self { events, tick }
    }

    /// Blocks up to the tick interval and returns the next event, or
    /// `Tick` on timeout.
    pub fn step(&self) -> SessionEvent {
        self.events.poll(self.tick).unwrap_or(SessionEvent::Tick)
    }
}
