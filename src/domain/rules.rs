/// Movement rules, truth-table driven.
///
/// Pure functions: they compute a new x and report what was spent,
/// the caller applies it to the world.
///
/// ## Speed from health
/// ┌──────────────────┬──────────────────────────────────────────┐
/// │ Health           │ Speed                                     │
/// ├──────────────────┼──────────────────────────────────────────┤
/// │ h > 0            │ h                                         │
/// │ h == 0           │ random jitter in [0, 1)                   │
/// │ h < 0            │ |h| / 10^(len(|h| as decimal) + 12)       │
/// └──────────────────┴──────────────────────────────────────────┘
///
/// `len` counts characters of the shortest decimal rendering, so `0.5`
/// has length 3 and `12` has length 2. The more characters, the closer
/// the speed gets to zero.
///
/// ## Horizontal step
/// ┌──────────────────────────────┬──────────────────────────────┐
/// │ Condition                     │ Result                        │
/// ├──────────────────────────────┼──────────────────────────────┤
/// │ direction not Left/Right      │ x unchanged                   │
/// │ dash held, stamina > 0        │ speed += DASH_BONUS           │
/// │ candidate < 0                 │ x = 1 (nudge off left wall)   │
/// │ candidate + w > world_w       │ x = world_w - w - 1           │
/// │ otherwise                     │ x = candidate                 │
/// └──────────────────────────────┴──────────────────────────────┘

use rand::Rng;

use super::entity::Direction;

pub const DASH_BONUS: f64 = 3.5;
pub const DASH_COST: f64 = 1.0;
/// Distance the wall pushes the actor back inside.
const WALL_NUDGE: f64 = 1.0;

/// Tunable movement numbers (loaded from `[rules]` in config.toml).
#[derive(Clone, Debug)]
pub struct MoveRules {
    pub dash_bonus: f64,
    pub dash_cost: f64,
}

impl Default for MoveRules {
    fn default() -> Self {
        MoveRules { dash_bonus: DASH_BONUS, dash_cost: DASH_COST }
    }
}

/// Result of one controller step.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Movement {
    pub x: f64,
    /// Dash was applied this frame; the caller spends stamina.
    pub dashed: bool,
}

/// Everything the controller reads about the world.
#[derive(Clone, Copy, Debug)]
pub struct MoveContext {
    pub health: f64,
    pub has_stamina: bool,
    pub world_width: f64,
    pub actor_width: f64,
}

pub fn move_speed<R: Rng + ?Sized>(health: f64, rng: &mut R) -> f64 {
    if health == 0.0 {
        return rng.random::<f64>();
    }
    if health < 0.0 {
        let magnitude = -health;
        let digits = magnitude.to_string().len() as i32;
        return magnitude / 10f64.powi(digits + 12);
    }
    health
}

pub fn step_actor<R: Rng + ?Sized>(
    x: f64,
    direction: Option<Direction>,
    dash: bool,
    ctx: MoveContext,
    rules: &MoveRules,
    rng: &mut R,
) -> Movement {
    let dashed = dash && direction.is_some() && ctx.has_stamina;
    let bonus = if dashed { rules.dash_bonus } else { 0.0 };

    let candidate = match direction {
        Some(Direction::Left) => x - move_speed(ctx.health, rng) - bonus,
        Some(Direction::Right) => x + move_speed(ctx.health, rng) + bonus,
        _ => return Movement { x, dashed },
    };

    Movement { x: clamp_to_walls(candidate, ctx.world_width, ctx.actor_width), dashed }
}

fn clamp_to_walls(x: f64, world_width: f64, actor_width: f64) -> f64 {
    let right_limit = world_width - actor_width;
    if x < 0.0 {
        WALL_NUDGE
    } else if x > right_limit {
        right_limit - WALL_NUDGE
    } else {
        x
    }
}
