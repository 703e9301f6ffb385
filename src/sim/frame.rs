/// Render command list: a pure function of the world.
///
/// `compose` is the only thing the presentation layer reads. It never
/// mutates the world, so drawing can't feed back into simulation.
///
/// Draw order is back to front: level hazards, goal, actor, HUD, text.

use crate::domain::physics::Rect;
use super::hazard::{drop_spike_boxes, ladder_boxes, spike_boxes};
use super::progress::dialogue_line;
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Banner {
    Cleared,
    Stalled,
    BeyondLastLevel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Spike(Rect),
    DropSpike { rect: Rect, landed: bool },
    Ladder(Rect),
    Floor(Rect),
    Goal(Rect),
    /// `acting` once the player has given any input; idle before that.
    Actor { rect: Rect, acting: bool },
    Hud { level: usize, health: f64, stamina: f64 },
    Dialogue(String),
    /// Short text floating above the actor ("Ouch!", climb hint).
    Notice { x: f64, text: String },
    Banner(Banner),
}

pub const CLIMB_HINT: &str = "Climb - W / Up";

pub fn compose(world: &WorldState) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    let Some(sprites) = world.sprites else { return out };
    let height = world.size.height;

    if let Some(level) = world.current_level() {
        for (boxes, spike) in drop_spike_boxes(level, height, &sprites).iter().zip(&world.drop_spikes) {
            let landed = spike.passed();
            let rect = if landed { boxes.landed } else { boxes.origin };
            out.push(DrawCommand::DropSpike { rect, landed });
        }
        for boxes in spike_boxes(level, height, &sprites) {
            out.push(DrawCommand::Spike(boxes.draw));
        }
        for boxes in ladder_boxes(level, height, &sprites) {
            out.push(DrawCommand::Ladder(boxes.ladder));
            out.push(DrawCommand::Floor(boxes.platform_draw));
        }
    }

    if let Some(goal) = world.goal_rect() {
        out.push(DrawCommand::Goal(goal));
    }
    out.push(DrawCommand::Actor { rect: world.actor.rect(), acting: world.actor.acting });

    out.push(DrawCommand::Hud {
        level: world.progress.level,
        health: world.resources.health,
        // HUD shows two decimals
        stamina: (world.resources.stamina * 100.0).round() / 100.0,
    });

    if let Some(line) = dialogue_line(world) {
        out.push(DrawCommand::Dialogue(line.to_string()));
    }
    if !world.message.is_empty() {
        out.push(DrawCommand::Notice { x: world.actor.x, text: world.message.clone() });
    }
    if world.near_ladder {
        out.push(DrawCommand::Notice { x: world.actor.x, text: CLIMB_HINT.to_string() });
    }

    if world.beyond_last_level() {
        out.push(DrawCommand::Banner(Banner::BeyondLastLevel));
    }
    if world.progress.cleared {
        out.push(DrawCommand::Banner(Banner::Cleared));
    }
    if world.resources.is_stalled() {
        out.push(DrawCommand::Banner(Banner::Stalled));
    }

    out
}
