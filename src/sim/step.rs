/// The step function: advances the world by one frame.
///
/// Processing order:
///   1. Readiness (no sprites bound → nothing happens)
///   2. Click (first dialogue step)
///   3. Restart (short-circuits the rest of the frame)
///   4. Movement resolution (horizontal step, dash cost)
///   5. Hazards: drop-spikes → spikes → ladders → gravity
///   6. Goal check
///   7. Dialogue triggers (at most one step)
///
/// `now` is the time since the game started on a monotonic clock.
/// Drop-spike deadlines are compared against it, so tests can drive
/// time explicitly.

use std::time::Duration;

use crate::domain::entity::{Direction, FrameInput};
use crate::domain::rules::{self, MoveContext};
use super::event::GameEvent;
use super::hazard;
use super::progress::{self, Trigger};
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput, now: Duration) -> Vec<GameEvent> {
    let Some(sprites) = world.sprites else {
        tracing::trace!("sprites not bound yet, frame skipped");
        return vec![];
    };

    let mut events: Vec<GameEvent> = Vec::new();
    let mut triggers: Vec<Trigger> = Vec::new();
    world.tick += 1;
    world.tick_message();
    world.actor.direction = input.direction;

    if input.click {
        progress::click(world, &mut events);
    }

    if input.direction == Some(Direction::Restart) {
        world.actor.acting = true;
        progress::restart(world, &mut events);
        return events;
    }

    if let Some(dir) = input.direction {
        world.actor.acting = true;
        resolve_player_movement(world, dir, input.dash, &mut triggers, &mut events);
    }

    hazard::resolve_hazards(world, &sprites, now, &mut events);
    if events.iter().any(|e| matches!(e, GameEvent::Climbed { .. })) {
        triggers.push(Trigger::LadderClimb);
    }

    if input.direction.is_some() {
        progress::check_goal(world, &mut events);
    }
    if world.progress.cleared {
        triggers.push(Trigger::GoalReached);
    }

    progress::advance_dialogue(world, &triggers, &mut events);
    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(
    world: &mut WorldState,
    dir: Direction,
    dash: bool,
    triggers: &mut Vec<Trigger>,
    events: &mut Vec<GameEvent>,
) {
    let ctx = MoveContext {
        health: world.resources.health,
        has_stamina: world.resources.has_stamina(),
        world_width: world.size.width,
        actor_width: world.actor.width,
    };
    let move_rules = world.move_rules();
    let movement = rules::step_actor(world.actor.x, Some(dir), dash, ctx, &move_rules, &mut world.rng);

    if movement.dashed {
        world.resources.consume_stamina(move_rules.dash_cost);
        events.push(GameEvent::Dashed { stamina_left: world.resources.stamina });
    }
    world.actor.x = movement.x;

    if dir.is_horizontal() {
        triggers.push(Trigger::HorizontalMove);
        if dash {
            triggers.push(Trigger::DashMove);
        }
    }
}
