/// Hazard resolution: actor vs. drop-spikes, spikes, ladders, then gravity.
///
/// Geometry is resolved fresh every frame from the level's `HazardSpec`s,
/// the world height and the sprite sizes. The same boxes are used by
/// `frame::compose` so that what is drawn is what collides.
///
/// ## Boxes per hazard
/// ┌────────────┬──────────────────────────────────────────────────────┐
/// │ Spike      │ draw: resolved rect shifted down by its own height    │
/// │            │ hit:  draw rect, width / 4.5                          │
/// ├────────────┼──────────────────────────────────────────────────────┤
/// │ DropSpike  │ origin: resolved rect (drawn while armed/dropping)    │
/// │            │ zone:   origin, height = world_h + h ("beneath it")   │
/// │            │ landed: y = world_h - sprite_h + h                    │
/// │            │ hit:    landed rect, width / 3                        │
/// ├────────────┼──────────────────────────────────────────────────────┤
/// │ Ladder     │ climb:    resolved rect, width / 2                    │
/// │            │ platform: on top of the ladder, floor_w + 85 wide     │
/// │            │ stand_y:  ladder.y - floor_h - actor_h                │
/// └────────────┴──────────────────────────────────────────────────────┘
///
/// The actor always collides with its half-width hitbox.
///
/// ## Damage policy
///   - Spike: every frame of overlap, no cooldown.
///   - DropSpike: only once Landed. The frame that triggers the fall
///     never hurts.

use std::time::Duration;

use crate::config::SpriteSet;
use crate::domain::entity::Direction;
use crate::domain::physics::{overlaps, Rect};
use super::event::GameEvent;
use super::level::{HazardKind, Level};
use super::world::WorldState;

/// Frames the "Ouch!" notice stays up.
const HURT_MESSAGE_TICKS: u32 = 10;
/// Extra width of the drawn floor platform over the floor sprite.
const PLATFORM_DRAW_EXTRA: f64 = 160.0;
/// Extra width of the colliding floor platform over the floor sprite.
const PLATFORM_HIT_EXTRA: f64 = 85.0;
/// Spikes only hurt on a sliver of their drawn width.
const SPIKE_HIT_DIVISOR: f64 = 4.5;
const DROP_SPIKE_HIT_DIVISOR: f64 = 3.0;
const LADDER_CLIMB_DIVISOR: f64 = 2.0;

// ══════════════════════════════════════════════════════════════
// Resolved geometry
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpikeBoxes {
    pub draw: Rect,
    pub hit: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropSpikeBoxes {
    pub origin: Rect,
    pub zone: Rect,
    pub landed: Rect,
    pub hit: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LadderBoxes {
    pub ladder: Rect,
    pub climb: Rect,
    pub platform_draw: Rect,
    pub platform: Rect,
}

impl LadderBoxes {
    /// The y that puts an actor of `actor_height` on top of the platform.
    pub fn stand_y(&self, actor_height: f64) -> f64 {
        self.platform.y - actor_height
    }
}

pub fn spike_boxes(level: &Level, world_height: f64, sprites: &SpriteSet) -> Vec<SpikeBoxes> {
    level.spikes.iter()
        .map(|spec| {
            let r = spec.resolve(world_height, sprites.spike);
            let draw = Rect { y: r.y + r.height, ..r };
            SpikeBoxes { draw, hit: draw.narrowed(SPIKE_HIT_DIVISOR) }
        })
        .collect()
}

pub fn drop_spike_boxes(level: &Level, world_height: f64, sprites: &SpriteSet) -> Vec<DropSpikeBoxes> {
    level.drop_spikes.iter()
        .map(|spec| {
            let origin = spec.resolve(world_height, sprites.drop_spike);
            let zone = Rect { height: world_height + origin.height, ..origin };
            let landed = Rect {
                y: world_height - sprites.drop_spike.height + origin.height,
                ..origin
            };
            DropSpikeBoxes { origin, zone, landed, hit: landed.narrowed(DROP_SPIKE_HIT_DIVISOR) }
        })
        .collect()
}

pub fn ladder_boxes(level: &Level, world_height: f64, sprites: &SpriteSet) -> Vec<LadderBoxes> {
    let floor = sprites.floor;
    level.ladders.iter()
        .map(|spec| {
            let ladder = spec.resolve(world_height, sprites.ladder);
            let top = ladder.y - floor.height;
            LadderBoxes {
                ladder,
                climb: ladder.narrowed(LADDER_CLIMB_DIVISOR),
                platform_draw: Rect::new(ladder.x, top, floor.width + PLATFORM_DRAW_EXTRA, floor.height),
                platform: Rect::new(ladder.x, top, floor.width + PLATFORM_HIT_EXTRA, floor.height),
            }
        })
        .collect()
}

// ══════════════════════════════════════════════════════════════
// Resolution
// ══════════════════════════════════════════════════════════════

/// Run every hazard check for one frame. Beyond the last level there are
/// no hazards, only gravity.
pub fn resolve_hazards(world: &mut WorldState, sprites: &SpriteSet, now: Duration, events: &mut Vec<GameEvent>) {
    let height = world.size.height;
    let (drops, spikes, ladders) = match world.current_level() {
        Some(level) => (
            drop_spike_boxes(level, height, sprites),
            spike_boxes(level, height, sprites),
            ladder_boxes(level, height, sprites),
        ),
        None => (vec![], vec![], vec![]),
    };

    resolve_drop_spikes(world, &drops, now, events);
    resolve_spikes(world, &spikes, events);
    resolve_ladders(world, &ladders, events);
    resolve_gravity(world, events);
}

fn hurt(world: &mut WorldState, source: HazardKind, index: usize, events: &mut Vec<GameEvent>) {
    let amount = world.rules.spike_damage;
    world.resources.damage(amount);
    world.set_message("Ouch!", HURT_MESSAGE_TICKS);
    tracing::debug!(%source, index, health = world.resources.health, "actor hurt");
    events.push(GameEvent::Hurt { source, index, amount });
}

fn resolve_drop_spikes(world: &mut WorldState, drops: &[DropSpikeBoxes], now: Duration, events: &mut Vec<GameEvent>) {
    let hitbox = world.actor.hitbox();
    let delay = world.rules.drop_delay;

    for (i, boxes) in drops.iter().enumerate() {
        let Some(spike) = world.drop_spikes.get_mut(i) else { break };

        let landed_now = spike.tick(now);
        // Damage reads the state before this frame's trigger
        let hit = spike.passed() && overlaps(&hitbox, &boxes.hit);
        let triggered = overlaps(&hitbox, &boxes.zone) && spike.trigger(now, delay);

        if landed_now {
            tracing::debug!(index = i, "drop-spike landed");
            events.push(GameEvent::DropLanded { index: i });
        }
        if hit {
            hurt(world, HazardKind::DropSpike, i, events);
        }
        if triggered {
            tracing::debug!(index = i, "drop-spike triggered");
            events.push(GameEvent::DropTriggered { index: i });
        }
    }
}

fn resolve_spikes(world: &mut WorldState, spikes: &[SpikeBoxes], events: &mut Vec<GameEvent>) {
    let hitbox = world.actor.hitbox();
    for (i, boxes) in spikes.iter().enumerate() {
        if overlaps(&hitbox, &boxes.hit) {
            hurt(world, HazardKind::Spike, i, events);
        }
    }
}

fn resolve_ladders(world: &mut WorldState, ladders: &[LadderBoxes], events: &mut Vec<GameEvent>) {
    world.near_ladder = false;
    if ladders.is_empty() { return; }

    let mut on_ladder = false;
    for (i, boxes) in ladders.iter().enumerate() {
        if !overlaps(&world.actor.hitbox(), &boxes.climb) { continue; }
        on_ladder = true;
        world.near_ladder = true;
        if world.actor.direction == Some(Direction::Up) {
            world.actor.y = boxes.stand_y(world.actor.height);
            world.actor.on_ground = true;
            events.push(GameEvent::Climbed { ladder: i });
        }
    }

    let feet = world.actor.hitbox().feet();
    let supported = ladders.iter().any(|b| overlaps(&feet, &b.platform));
    let airborne = world.actor.y < world.floor_line();
    if world.actor.on_ground && airborne && !supported && !on_ladder {
        world.actor.on_ground = false;
        events.push(GameEvent::FellOffLadder);
    }
}

/// Not on ground → snap down to the floor line.
fn resolve_gravity(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.actor.on_ground { return; }
    let floor = world.floor_line();
    if world.actor.y < floor {
        events.push(GameEvent::Landed);
    }
    world.actor.y = floor;
    world.actor.on_ground = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::domain::entity::DropState;
    use crate::sim::level::parse_levels;

    fn world_with(level_toml: &str) -> (WorldState, SpriteSet) {
        let config = GameConfig::default();
        let levels = parse_levels(level_toml).unwrap();
        let mut w = WorldState::new(config.world, levels, config.rules.clone(), 3);
        w.bind_sprites(config.sprites);
        w.actor.on_ground = true;
        (w, config.sprites)
    }

    fn frame(w: &mut WorldState, sprites: &SpriteSet, ms: u64) -> Vec<GameEvent> {
        let mut events = vec![];
        resolve_hazards(w, sprites, Duration::from_millis(ms), &mut events);
        events
    }

    fn hurt_count(events: &[GameEvent]) -> usize {
        events.iter().filter(|e| matches!(e, GameEvent::Hurt { .. })).count()
    }

    // ── Geometry ──

    #[test]
    fn spike_box_sits_on_floor() {
        let (w, s) = world_with("[[level]]\nspikes = [\"450::height-60::25\"]");
        let b = spike_boxes(w.current_level().unwrap(), 1000.0, &s)[0];
        // y = (1000 - 50) + 25
        assert_eq!(b.draw, Rect::new(450.0, 975.0, 60.0, 25.0));
        assert_eq!(b.hit.width, 60.0 / 4.5);
    }

    #[test]
    fn drop_spike_boxes_layout() {
        let (w, s) = world_with("[[level]]\ndrop_spikes = [\"400::100-60::40\"]");
        let b = drop_spike_boxes(w.current_level().unwrap(), 1000.0, &s)[0];
        assert_eq!(b.origin, Rect::new(400.0, 100.0, 60.0, 40.0));
        assert_eq!(b.zone, Rect::new(400.0, 100.0, 60.0, 1040.0));
        // 1000 - 80 + 40
        assert_eq!(b.landed, Rect::new(400.0, 960.0, 60.0, 40.0));
        assert_eq!(b.hit.width, 20.0);
    }

    #[test]
    fn ladder_platform_sits_on_top() {
        let (w, s) = world_with("[[level]]\nladders = [\"250::height\"]");
        let b = ladder_boxes(w.current_level().unwrap(), 1000.0, &s)[0];
        assert_eq!(b.ladder, Rect::new(250.0, 850.0, 80.0, 150.0));
        assert_eq!(b.platform, Rect::new(250.0, 820.0, 205.0, 30.0));
        assert_eq!(b.platform_draw.width, 280.0);
        assert_eq!(b.stand_y(150.0), 670.0);
    }

    // ── Spikes ──

    #[test]
    fn spike_hurts_every_frame() {
        let (mut w, s) = world_with("[[level]]\nspikes = [\"20::height-60::25\"]");
        w.actor.x = 0.0;
        for ms in [0, 50, 100] {
            let events = frame(&mut w, &s, ms);
            assert_eq!(hurt_count(&events), 1);
        }
        assert_eq!(w.resources.health, 5.0 - 1.5);
        assert_eq!(w.message, "Ouch!");
    }

    #[test]
    fn spike_hitbox_is_a_sliver() {
        let (mut w, s) = world_with("[[level]]\nspikes = [\"200::height-60::25\"]");
        // Actor hitbox 150..200 only touches the spike's left edge
        w.actor.x = 150.0;
        assert_eq!(hurt_count(&frame(&mut w, &s, 0)), 0);
        // Past the narrow hit box (200..213.3) but still over the drawn sprite
        w.actor.x = 214.0;
        assert_eq!(hurt_count(&frame(&mut w, &s, 0)), 0);
        w.actor.x = 180.0;
        assert_eq!(hurt_count(&frame(&mut w, &s, 0)), 1);
    }

    // ── Drop-spikes ──

    #[test]
    fn drop_spike_trigger_frame_does_not_hurt() {
        let (mut w, s) = world_with("[[level]]\ndrop_spikes = [\"0::100-60::40\"]");
        w.actor.x = 0.0;

        let events = frame(&mut w, &s, 1000);
        assert!(events.contains(&GameEvent::DropTriggered { index: 0 }));
        assert_eq!(hurt_count(&events), 0);
        assert_eq!(w.drop_spikes[0].state, DropState::Dropping { lands_at: Duration::from_millis(1485) });

        // Still falling: no damage yet
        assert_eq!(hurt_count(&frame(&mut w, &s, 1200)), 0);
        assert_eq!(w.resources.health, 5.0);

        // Lands and hurts on every following contact
        let events = frame(&mut w, &s, 1485);
        assert!(events.contains(&GameEvent::DropLanded { index: 0 }));
        assert_eq!(hurt_count(&events), 1);
        assert_eq!(hurt_count(&frame(&mut w, &s, 1500)), 1);
        assert_eq!(w.resources.health, 4.0);
        assert!(w.drop_spikes[0].passed());
    }

    #[test]
    fn landed_drop_spike_never_retriggers() {
        let (mut w, s) = world_with("[[level]]\ndrop_spikes = [\"0::100-60::40\"]");
        w.actor.x = 0.0;
        frame(&mut w, &s, 0);
        frame(&mut w, &s, 485);
        let events = frame(&mut w, &s, 2000);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::DropTriggered { .. })));
        assert_eq!(w.drop_spikes[0].state, DropState::Landed);
    }

    #[test]
    fn drop_spike_lands_even_after_actor_leaves() {
        let (mut w, s) = world_with("[[level]]\ndrop_spikes = [\"0::100-60::40\"]");
        w.actor.x = 0.0;
        frame(&mut w, &s, 0);
        w.actor.x = 500.0;
        let events = frame(&mut w, &s, 600);
        assert!(events.contains(&GameEvent::DropLanded { index: 0 }));
        assert_eq!(hurt_count(&events), 0);
    }

    // ── Ladders ──

    #[test]
    fn climbing_snaps_onto_platform() {
        let (mut w, s) = world_with("[[level]]\nladders = [\"250::height\"]");
        w.actor.x = 240.0;
        w.actor.direction = Some(Direction::Up);
        let events = frame(&mut w, &s, 0);
        assert!(events.contains(&GameEvent::Climbed { ladder: 0 }));
        assert_eq!(w.actor.y, 670.0);
        assert!(w.actor.on_ground);

        // Standing still on the platform keeps the actor up there
        w.actor.direction = None;
        frame(&mut w, &s, 50);
        assert_eq!(w.actor.y, 670.0);
    }

    #[test]
    fn walking_off_platform_falls() {
        let (mut w, s) = world_with("[[level]]\nladders = [\"250::height\"]");
        w.actor.x = 240.0;
        w.actor.direction = Some(Direction::Up);
        frame(&mut w, &s, 0);

        w.actor.direction = Some(Direction::Right);
        w.actor.x = 460.0; // hitbox 460..510, platform ends at 455
        let events = frame(&mut w, &s, 50);
        assert!(events.contains(&GameEvent::FellOffLadder));
        assert!(events.contains(&GameEvent::Landed));
        assert_eq!(w.actor.y, 850.0);
        assert!(w.actor.on_ground);
    }

    #[test]
    fn ladder_hint_only_when_overlapping() {
        let (mut w, s) = world_with("[[level]]\nladders = [\"250::height\"]");
        w.actor.x = 0.0;
        frame(&mut w, &s, 0);
        assert!(!w.near_ladder);
        w.actor.x = 240.0;
        frame(&mut w, &s, 0);
        assert!(w.near_ladder);
        assert_eq!(w.actor.y, 850.0, "no climb without Up");
    }

    // ── Gravity ──

    #[test]
    fn gravity_snaps_to_floor_line() {
        let (mut w, s) = world_with("[[level]]");
        w.actor.on_ground = false;
        w.actor.y = 300.0;
        let events = frame(&mut w, &s, 0);
        assert!(events.contains(&GameEvent::Landed));
        assert_eq!(w.actor.y, 850.0);
    }

    #[test]
    fn beyond_last_level_has_no_hazards() {
        let (mut w, s) = world_with("[[level]]\nspikes = [\"0::height-60::25\"]");
        w.progress.level = 2;
        w.actor.x = 0.0;
        assert_eq!(hurt_count(&frame(&mut w, &s, 0)), 0);
    }
}
