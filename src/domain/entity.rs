/// Entities: Actor, ResourcePool, DropSpike (as a lifecycle entity).
/// State machines are minimal and only move forward.

use std::time::Duration;

use super::physics::Rect;

pub const START_HEALTH: f64 = 5.0;
pub const MAX_STAMINA: f64 = 100.0;
/// Below this the HUD reports the actor as stalled.
pub const STALL_HEALTH: f64 = -299.0;

/// Held direction. "No direction" is `None` at the call site.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Restart,
}

impl Direction {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Frame input: direction is continuous (held key), click is edge-triggered.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub direction: Option<Direction>,
    pub dash: bool,
    pub click: bool,
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub on_ground: bool,
    pub direction: Option<Direction>,
    /// Set by the first key press; cleared only on a fresh world.
    pub acting: bool,
}

impl Actor {
    pub fn new(x: f64, y: f64) -> Self {
        Actor {
            x, y,
            width: 0.0,
            height: 0.0,
            on_ground: false,
            direction: None,
            acting: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn hitbox(&self) -> Rect {
        self.rect().hitbox()
    }
}

/// Health and stamina.
///
/// Health has no floor: it keeps dropping below zero and feeds the speed
/// penalty curve in `rules::move_speed`. Stamina lives in `[0, 100]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourcePool {
    pub health: f64,
    pub stamina: f64,
}

impl ResourcePool {
    pub fn new() -> Self {
        ResourcePool { health: START_HEALTH, stamina: MAX_STAMINA }
    }

    pub fn damage(&mut self, amount: f64) {
        self.health -= amount;
    }

    /// Spend stamina for a dash. Returns false (and spends nothing) when
    /// the pool was already empty before the attempt.
    pub fn consume_stamina(&mut self, amount: f64) -> bool {
        if self.stamina <= 0.0 {
            return false;
        }
        self.stamina = (self.stamina - amount).clamp(0.0, MAX_STAMINA);
        true
    }

    pub fn has_stamina(&self) -> bool {
        self.stamina > 0.0
    }

    pub fn restore(&mut self) {
        self.health = START_HEALTH;
        self.stamina = MAX_STAMINA;
    }

    pub fn is_stalled(&self) -> bool {
        self.health < STALL_HEALTH
    }
}

impl Default for ResourcePool {
    fn default() -> Self {
        ResourcePool::new()
    }
}

/// Drop-spike lifecycle.
///
///   Armed ──(actor beneath)──▶ Dropping { lands_at } ──(now ≥ lands_at)──▶ Landed
///
/// Landed is terminal until restart. Only a Landed spike hurts.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DropState {
    Armed,
    Dropping { lands_at: Duration },
    Landed,
}

#[derive(Clone, Debug)]
pub struct DropSpike {
    pub state: DropState,
}

impl DropSpike {
    pub fn new() -> Self {
        DropSpike { state: DropState::Armed }
    }

    /// The `passed` flag: has the spike finished its fall?
    pub fn passed(&self) -> bool {
        self.state == DropState::Landed
    }

    /// Armed → Dropping. Returns true only on the transition itself.
    pub fn trigger(&mut self, now: Duration, delay: Duration) -> bool {
        if self.state != DropState::Armed {
            return false;
        }
        self.state = DropState::Dropping { lands_at: now + delay };
        true
    }

    /// Advance the timer. Returns true if the spike just landed.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.state {
            DropState::Dropping { lands_at } if now >= lands_at => {
                self.state = DropState::Landed;
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.state = DropState::Armed;
    }
}

impl Default for DropSpike {
    fn default() -> Self {
        DropSpike::new()
    }
}
