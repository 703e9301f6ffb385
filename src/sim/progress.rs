/// Progression: level index, dialogue step, goal, restart.
///
/// ## Dialogue table
/// ┌───────┬──────┬──────────────────────────────┬──────────┐
/// │ Level │ Step │ Trigger                       │ Next     │
/// ├───────┼──────┼──────────────────────────────┼──────────┤
/// │ 1     │ 0    │ click                         │ 1        │
/// │ 1     │ 1    │ horizontal move               │ 2        │
/// │ 1     │ 2    │ dash while moving sideways    │ 3        │
/// │ 1     │ 2    │ goal reached                  │ 3        │
/// │ 2     │ 0    │ horizontal move               │ 1        │
/// │ 2     │ 1    │ horizontal move               │ 2        │
/// │ 2     │ 2    │ ladder climb                  │ 3        │
/// │ 3     │ 0    │ horizontal move               │ 1        │
/// └───────┴──────┴──────────────────────────────┴──────────┘
///
/// At most one step per frame. Advancing past the last declared line of
/// the level is a no-op.
///
/// ## Restart
///   1. actor back to spawn, resources restored
///   2. cleared → next level, cleared flag dropped
///   3. drop-spikes re-armed for the (possibly new) level
///   4. dialogue step = 1 on level 1 (its click step is already spent), else 0

use crate::domain::physics::overlaps;
use super::event::GameEvent;
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Trigger {
    Click,
    HorizontalMove,
    DashMove,
    GoalReached,
    LadderClimb,
}

const DIALOGUE_TABLE: &[(usize, usize, Trigger)] = &[
    (1, 0, Trigger::Click),
    (1, 1, Trigger::HorizontalMove),
    (1, 2, Trigger::DashMove),
    (1, 2, Trigger::GoalReached),
    (2, 0, Trigger::HorizontalMove),
    (2, 1, Trigger::HorizontalMove),
    (2, 2, Trigger::LadderClimb),
    (3, 0, Trigger::HorizontalMove),
];

/// Advance the dialogue by one step if any of `triggers` matches the
/// table for the current (level, step). Returns whether it advanced.
pub fn advance_dialogue(world: &mut WorldState, triggers: &[Trigger], events: &mut Vec<GameEvent>) -> bool {
    let level = world.progress.level;
    let step = world.progress.dialogue_step;

    let matched = DIALOGUE_TABLE.iter()
        .any(|&(l, s, t)| l == level && s == step && triggers.contains(&t));
    if !matched { return false; }

    let lines = world.current_level().map_or(0, |l| l.dialogue.len());
    if step + 1 >= lines { return false; }

    world.progress.dialogue_step = step + 1;
    events.push(GameEvent::DialogueAdvanced { step: step + 1 });
    true
}

/// Current hint line, if the level has one for this step.
pub fn dialogue_line(world: &WorldState) -> Option<&str> {
    world.current_level()?
        .dialogue
        .get(world.progress.dialogue_step)
        .map(String::as_str)
}

/// Mouse click / confirm key. Only meaningful on the first screen.
pub fn click(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if advance_dialogue(world, &[Trigger::Click], events) {
        world.actor.acting = true;
    }
}

/// Test the goal against the actor. Sticky until restart.
pub fn check_goal(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    if world.progress.cleared { return false; }
    let Some(goal) = world.goal_rect() else { return false };
    if !overlaps(&world.actor.hitbox(), &goal) { return false; }

    world.progress.cleared = true;
    tracing::info!(level = world.progress.level, "level cleared");
    events.push(GameEvent::GoalReached);
    true
}

pub fn restart(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let (spawn_x, spawn_y) = world.rules.spawn;
    world.actor.x = spawn_x;
    world.actor.y = spawn_y;
    world.actor.on_ground = false;
    world.resources.restore();
    world.message.clear();
    world.message_timer = 0;

    if world.progress.cleared {
        world.progress.level += 1;
        world.progress.cleared = false;
        tracing::info!(level = world.progress.level, "advancing to next level");
        events.push(GameEvent::LevelAdvanced { level: world.progress.level });
    }

    world.arm_drop_spikes();

    let first_step = if world.progress.level == 1 { 1 } else { 0 };
    let lines = world.current_level().map_or(0, |l| l.dialogue.len());
    world.progress.dialogue_step = first_step.min(lines.saturating_sub(1));

    events.push(GameEvent::Restarted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::DropState;
    use crate::sim::world::tests::ready_world;
    use std::time::Duration;

    #[test]
    fn click_only_works_on_first_step() {
        let mut w = ready_world();
        let mut ev = vec![];
        click(&mut w, &mut ev);
        assert_eq!(w.progress.dialogue_step, 1);
        assert!(w.actor.acting);
        click(&mut w, &mut ev);
        assert_eq!(w.progress.dialogue_step, 1);
        assert_eq!(ev, vec![GameEvent::DialogueAdvanced { step: 1 }]);
    }

    #[test]
    fn one_step_per_frame() {
        let mut w = ready_world();
        w.progress.dialogue_step = 1;
        let mut ev = vec![];
        // Dash-move matches step 2 too, but only one step is taken
        advance_dialogue(&mut w, &[Trigger::HorizontalMove, Trigger::DashMove], &mut ev);
        assert_eq!(w.progress.dialogue_step, 2);
        advance_dialogue(&mut w, &[Trigger::HorizontalMove, Trigger::DashMove], &mut ev);
        assert_eq!(w.progress.dialogue_step, 3);
    }

    #[test]
    fn table_is_level_specific() {
        let mut w = ready_world();
        w.progress.level = 2;
        w.progress.dialogue_step = 2;
        let mut ev = vec![];
        assert!(!advance_dialogue(&mut w, &[Trigger::HorizontalMove], &mut ev));
        assert!(advance_dialogue(&mut w, &[Trigger::LadderClimb], &mut ev));
        assert_eq!(w.progress.dialogue_step, 3);
    }

    #[test]
    fn never_past_last_line() {
        let mut w = ready_world();
        w.progress.level = 3; // two lines
        let mut ev = vec![];
        assert!(advance_dialogue(&mut w, &[Trigger::HorizontalMove], &mut ev));
        assert_eq!(w.progress.dialogue_step, 1);
        assert!(dialogue_line(&w).is_some());
        // No table row for (3, 1), and the last line is reached anyway
        assert!(!advance_dialogue(&mut w, &[Trigger::HorizontalMove], &mut ev));
        assert_eq!(w.progress.dialogue_step, 1);
    }

    #[test]
    fn goal_is_sticky() {
        let mut w = ready_world();
        let mut ev = vec![];
        assert!(!check_goal(&mut w, &mut ev));
        w.actor.x = 860.0; // hitbox 860..910 reaches goal at 900
        assert!(check_goal(&mut w, &mut ev));
        assert!(w.progress.cleared);
        w.actor.x = 0.0;
        assert!(!check_goal(&mut w, &mut ev));
        assert!(w.progress.cleared);
    }

    #[test]
    fn restart_uncleared_stays_on_level() {
        let mut w = ready_world();
        w.progress.level = 3;
        w.arm_drop_spikes();
        w.drop_spikes[1].trigger(Duration::ZERO, Duration::ZERO);
        w.drop_spikes[1].tick(Duration::ZERO);
        w.progress.dialogue_step = 1;
        w.resources.health = -12.0;
        w.resources.stamina = 0.0;
        w.actor.x = 512.0;

        let mut ev = vec![];
        restart(&mut w, &mut ev);
        assert_eq!(w.progress.level, 3);
        assert_eq!(w.progress.dialogue_step, 0);
        assert_eq!((w.actor.x, w.actor.y), (0.0, 850.0));
        assert_eq!((w.resources.health, w.resources.stamina), (5.0, 100.0));
        assert!(w.drop_spikes.iter().all(|d| d.state == DropState::Armed));
        assert_eq!(ev, vec![GameEvent::Restarted]);
    }

    #[test]
    fn restart_after_clear_advances() {
        let mut w = ready_world();
        w.progress.level = 2;
        w.progress.cleared = true;
        let mut ev = vec![];
        restart(&mut w, &mut ev);
        assert_eq!(w.progress.level, 3);
        assert!(!w.progress.cleared);
        assert_eq!(w.progress.dialogue_step, 0);
        assert_eq!(w.drop_spikes.len(), 2);
        assert!(ev.contains(&GameEvent::LevelAdvanced { level: 3 }));
    }

    #[test]
    fn restart_on_level_one_skips_click_step() {
        let mut w = ready_world();
        w.progress.dialogue_step = 3;
        let mut ev = vec![];
        restart(&mut w, &mut ev);
        assert_eq!(w.progress.dialogue_step, 1);
    }

    #[test]
    fn beyond_last_level_has_no_dialogue() {
        let mut w = ready_world();
        w.progress.level = 3;
        w.progress.cleared = true;
        let mut ev = vec![];
        restart(&mut w, &mut ev);
        assert_eq!(w.progress.level, 4);
        assert!(w.beyond_last_level());
        assert_eq!(w.progress.dialogue_step, 0);
        assert!(dialogue_line(&w).is_none());
        assert!(w.drop_spikes.is_empty());
    }
}
