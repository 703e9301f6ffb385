/// WorldState: the complete snapshot of a running game.
///
/// Every component reads and writes the world through `&mut WorldState`
/// handed down by `step::step`. There is no other shared state.
///
/// ## Readiness
///
/// Hitboxes depend on sprite sizes. Until `bind_sprites` has been called,
/// `sprites` is `None` and `step` skips the frame entirely.
///
/// ## Level indices
///
/// `progress.level` is 1-based. `current_level()` returns `None` past the
/// last authored level: such a stage has no hazards and no dialogue.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, RulesConfig, SpriteSet, WorldSize};
use crate::domain::entity::{Actor, DropSpike, ResourcePool};
use crate::domain::physics::Rect;
use crate::domain::rules::MoveRules;
use super::level::Level;

/// Progression counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressState {
    pub level: usize,
    pub dialogue_step: usize,
    pub cleared: bool,
}

impl ProgressState {
    pub fn new() -> Self {
        ProgressState { level: 1, dialogue_step: 0, cleared: false }
    }
}

impl Default for ProgressState {
    fn default() -> Self {
        ProgressState::new()
    }
}

pub struct WorldState {
    // ── Static data ──
    pub size: WorldSize,
    pub levels: Vec<Level>,
    pub rules: RulesConfig,
    pub sprites: Option<SpriteSet>,

    // ── Entities ──
    pub actor: Actor,
    pub resources: ResourcePool,
    /// One entry per drop-spike of the current level, same order.
    pub drop_spikes: Vec<DropSpike>,

    // ── Progression ──
    pub progress: ProgressState,

    // ── Meta ──
    pub tick: u64,
    pub rng: StdRng,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
    /// Actor overlapped a ladder this frame (shows the climb hint).
    pub near_ladder: bool,
}

impl WorldState {
    pub fn new(size: WorldSize, levels: Vec<Level>, rules: RulesConfig, seed: u64) -> Self {
        let (spawn_x, spawn_y) = rules.spawn;
        let mut world = WorldState {
            size,
            levels,
            rules,
            sprites: None,
            actor: Actor::new(spawn_x, spawn_y),
            resources: ResourcePool::new(),
            drop_spikes: Vec::new(),
            progress: ProgressState::new(),
            tick: 0,
            rng: StdRng::seed_from_u64(seed),
            message: String::new(),
            message_timer: 0,
            near_ladder: false,
        };
        world.arm_drop_spikes();
        world
    }

    pub fn from_config(config: &GameConfig, levels: Vec<Level>) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        WorldState::new(config.world, levels, config.rules.clone(), seed)
    }

    /// Sprite sizes are known: actor dimensions get bound, the
    /// simulation becomes ready.
    pub fn bind_sprites(&mut self, sprites: SpriteSet) {
        self.actor.width = sprites.player.width;
        self.actor.height = sprites.player.height;
        self.sprites = Some(sprites);
        tracing::debug!(w = self.actor.width, h = self.actor.height, "sprites bound");
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.progress.level.checked_sub(1).and_then(|i| self.levels.get(i))
    }

    pub fn beyond_last_level(&self) -> bool {
        self.current_level().is_none()
    }

    /// Reset every drop-spike of the current level to Armed, sized to
    /// exactly the declared count.
    pub fn arm_drop_spikes(&mut self) {
        let count = self.current_level().map_or(0, |l| l.drop_spikes.len());
        self.drop_spikes.resize_with(count, DropSpike::new);
        self.drop_spikes.iter_mut().for_each(DropSpike::reset);
    }

    /// The y at which the actor stands on the ground.
    pub fn floor_line(&self) -> f64 {
        self.size.height - self.actor.height
    }

    pub fn goal_rect(&self) -> Option<Rect> {
        let goal = self.sprites?.goal;
        Some(Rect::new(
            self.size.width - goal.width,
            self.size.height - goal.height,
            goal.width,
            goal.height,
        ))
    }

    pub fn move_rules(&self) -> MoveRules {
        MoveRules { dash_bonus: self.rules.dash_bonus, dash_cost: self.rules.dash_cost }
    }

    pub fn set_message(&mut self, msg: &str, ticks: u32) {
        self.message = msg.to_string();
        self.message_timer = ticks;
    }

    pub fn tick_message(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 { self.message.clear(); }
        }
    }
}
