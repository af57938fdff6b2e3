/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD messages and logging.

use crate::domain::collision::Hit;
use crate::domain::entity::PowerUpKind;
use crate::domain::grid::Pos;
use crate::sim::world::CountdownKind;

/// What ended the run.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DeathCause {
    Wall,
    Body,
    Obstacle,
}

impl From<Hit> for DeathCause {
    fn from(h: Hit) -> Self {
        match h {
            Hit::Obstacle => DeathCause::Obstacle,
            _ => DeathCause::Body,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    FoodEaten { at: Pos, points: u32 },
    SpecialFoodSpawned { at: Pos },
    SpecialFoodEaten { at: Pos, points: u32 },
    SpecialFoodExpired,
    PowerUpCollected { kind: PowerUpKind },
    EffectExpired { kind: PowerUpKind },
    /// A spawn found no free cell and was skipped.
    SpawnSkipped { what: &'static str },
    LevelUp { level: u32, theme: &'static str },
    AllLevelsCleared { score: u32 },
    GameOver { score: u32, cause: DeathCause },
    CountdownStage { kind: CountdownKind, remaining: u8 },
    CountdownFinished { kind: CountdownKind },
    Paused,
    Resumed,
}
