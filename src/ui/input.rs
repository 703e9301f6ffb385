/// Input state tracker.
///
/// Turns the terminal's key and mouse events into one `FrameInput` per
/// tick:
///   - Movement keys count while held, so walking is continuous
///   - Restart (R) and confirm (Enter / Space / mouse click) are
///     edge-triggered, firing once per press
///   - Shift on a direction key (or its uppercase letter) is a dash
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};

use crate::domain::entity::{Direction, FrameInput};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Priority when several movement keys are held at once.
const MOVE_PRIORITY: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each (lowercased) key.
    last_active: HashMap<KeyCode, Instant>,
    /// Last time a direction key arrived with Shift.
    dash_active: Option<Instant>,

    /// Keys that went from "not held" to "held" during the most recent
    /// drain_events() call.
    fresh_presses: Vec<KeyCode>,
    clicked: bool,

    /// Raw key events collected during drain, for meta-key handling.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            dash_active: None,
            fresh_presses: Vec::with_capacity(8),
            clicked: false,
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.clicked = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => self.on_key(key, Instant::now()),
                Ok(Event::Mouse(mouse)) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        self.clicked = true;
                    }
                }
                _ => {}
            }
        }

        self.expire(Instant::now());
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        let code = normalize(key.code);

        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&code);
                if is_dash(&key) {
                    self.dash_active = None;
                }
            }
            // Without enhancement, rely on timeout-based expiry
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held(code);
                self.last_active.insert(code, now);
                if !was_held {
                    self.fresh_presses.push(code);
                }
                if direction_for(code).is_some() {
                    self.dash_active = is_dash(&key).then_some(now);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
        if self.dash_active.is_some_and(|t| now.duration_since(t) >= HOLD_TIMEOUT) {
            self.dash_active = None;
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// The input for this tick.
    pub fn frame_input(&self) -> FrameInput {
        let restart = self.fresh_presses.iter()
            .any(|&c| direction_for(c) == Some(Direction::Restart));

        let direction = if restart {
            Some(Direction::Restart)
        } else {
            MOVE_PRIORITY.into_iter().find(|&dir| {
                self.last_active.keys().any(|&c| direction_for(c) == Some(dir) && self.is_held(c))
            })
        };

        let click = self.clicked
            || self.was_pressed(KeyCode::Enter)
            || self.was_pressed(KeyCode::Char(' '));

        FrameInput { direction, dash: self.dash_active.is_some(), click }
    }

    /// Check if any raw event this frame is a quit request (Ctrl+C or Esc).
    pub fn quit_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.kind != KeyEventKind::Release
                && (k.code == KeyCode::Esc
                    || (k.modifiers.contains(KeyModifiers::CONTROL) && normalize(k.code) == KeyCode::Char('c')))
        })
    }
}

/// Shifted letters arrive as uppercase chars; fold them so 'D' and 'd'
/// share one held entry.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn is_dash(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::SHIFT)
        || matches!(key.code, KeyCode::Char(c) if c.is_ascii_uppercase())
}

pub fn direction_for(code: KeyCode) -> Option<Direction> {
    match normalize(code) {
        KeyCode::Char('r') => Some(Direction::Restart),
        KeyCode::Char('w') | KeyCode::Up => Some(Direction::Up),
        KeyCode::Char('s') | KeyCode::Down => Some(Direction::Down),
        KeyCode::Char('a') | KeyCode::Left => Some(Direction::Left),
        KeyCode::Char('d') | KeyCode::Right => Some(Direction::Right),
        _ => None,
    }
}
