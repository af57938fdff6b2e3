/// Countdown / pause controller and intent dispatch.
///
/// Phase transitions handled here:
///
///   Running      --pause-->      Paused
///   Paused       --pause-->      Running
///   Countdown(*) --pause/menu--> Paused          (countdown cancelled)
///   Running      --menu-->       Paused
///   Paused       --resume-->     Countdown(Resume)
///   Countdown(k) --1s x 4-->     Running
///   GameOver     --confirm-->    Countdown(LevelStart)  (same level)
///
/// A level-start countdown always replaces whatever is running. A resume
/// countdown is only accepted from Paused, so it can never displace a
/// level-start countdown.

use log::debug;

use crate::domain::entity::Intent;
use crate::domain::grid::Direction;
use crate::sim::event::GameEvent;
use crate::sim::level;
use crate::sim::world::{Countdown, CountdownKind, Phase, WorldState};

/// What the caller has to do after an intent was applied to the session.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    None,
    ShowMenu,
    Quit,
}

/// Queue a turn for the next tick. Reversals of the committed heading and
/// any turn outside Running are dropped.
pub fn request_turn(w: &mut WorldState, dir: Direction) -> bool {
    if w.phase != Phase::Running || dir == w.direction.opposite() {
        return false;
    }
    w.pending_direction = dir;
    true
}

pub fn toggle_pause(w: &mut WorldState) -> Option<GameEvent> {
    match w.phase {
        Phase::Running | Phase::Countdown(_) => {
            w.phase = Phase::Paused;
            Some(GameEvent::Paused)
        }
        Phase::Paused if w.session_live => {
            w.phase = Phase::Running;
            Some(GameEvent::Resumed)
        }
        _ => None,
    }
}

/// Stop the session for the menu. Returns true if it was moving.
pub fn open_menu(w: &mut WorldState) -> bool {
    match w.phase {
        Phase::Running | Phase::Countdown(_) => {
            w.phase = Phase::Paused;
            true
        }
        _ => false,
    }
}

pub fn start_level_countdown(w: &mut WorldState) {
    w.phase = Phase::Countdown(Countdown::new(CountdownKind::LevelStart));
}

/// Resume a paused session through a countdown. Rejected unless Paused.
pub fn start_resume_countdown(w: &mut WorldState) -> bool {
    if w.phase != Phase::Paused || !w.session_live {
        return false;
    }
    w.phase = Phase::Countdown(Countdown::new(CountdownKind::Resume));
    true
}

/// One beat of the 1-second driver.
pub fn countdown_second(w: &mut WorldState) -> Option<GameEvent> {
    let Phase::Countdown(mut c) = w.phase else {
        return None;
    };
    if c.remaining == 0 {
        w.phase = Phase::Running;
        debug!("countdown {:?} finished", c.kind);
        return Some(GameEvent::CountdownFinished { kind: c.kind });
    }
    c.remaining -= 1;
    w.phase = Phase::Countdown(c);
    Some(GameEvent::CountdownStage { kind: c.kind, remaining: c.remaining })
}

/// Apply an in-game intent (menu closed).
pub fn handle_intent(w: &mut WorldState, intent: Intent) -> (Command, Option<GameEvent>) {
    match intent {
        Intent::Turn(dir) => {
            request_turn(w, dir);
            (Command::None, None)
        }
        Intent::TogglePause => (Command::None, toggle_pause(w)),
        Intent::Menu => {
            open_menu(w);
            (Command::ShowMenu, None)
        }
        Intent::Confirm => match w.phase {
            Phase::GameOver => {
                level::restart_after_game_over(w);
                (Command::None, None)
            }
            Phase::Victory => (Command::ShowMenu, None),
            _ => (Command::None, None),
        },
        Intent::Quit => (Command::Quit, None),
    }
}
