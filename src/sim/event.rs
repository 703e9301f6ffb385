/// Events emitted during a simulation step.
/// The presentation layer and the log consume these; they never feed back
/// into the simulation.

use crate::sim::level::HazardKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Hurt { source: HazardKind, index: usize, amount: f64 },
    Dashed { stamina_left: f64 },
    DropTriggered { index: usize },
    DropLanded { index: usize },
    Climbed { ladder: usize },
    FellOffLadder,
    Landed,
    DialogueAdvanced { step: usize },
    GoalReached,
    Restarted,
    LevelAdvanced { level: usize },
}
