/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use simplelog::{Config as LogConfig, WriteLogger};

use config::GameConfig;
use domain::entity::Intent;
use sim::control::{self, Command};
use sim::drivers::Drivers;
use sim::event::GameEvent;
use sim::frame::Frame;
use sim::level;
use sim::save::SaveStore;
use sim::scores::HighScores;
use sim::step;
use sim::world::{Phase, WorldState};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::menu::{MenuAction, MenuState};
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "snakearcade.log";

fn main() {
    let config = GameConfig::load();
    let data_dir = config::resolve_data_dir(config.data_dir.as_ref());
    init_logging(&data_dir, &config);
    info!("starting, data dir {}", data_dir.display());

    let mut world = WorldState::new(&config);
    let mut scores = HighScores::load(&data_dir);
    let store = SaveStore::new(&data_dir);
    let mut menu = MenuState::new(config.start_level, config.start_theme);
    menu.refresh(false, store.exists());

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut menu, &mut scores, &store, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        warn!("terminal error: {e}");
        eprintln!("Game error: {e}");
    }

    info!("exiting, score {}", world.score);
    println!();
    println!("Thanks for playing Snake Arcade!");
    println!("Final Score: {}", world.score);
    if let Some(best) = scores.best() {
        println!("Best Score:  {best}");
    }
}

/// File logger in the data directory. Stdout belongs to the terminal UI,
/// so without a writable log file logging stays off.
fn init_logging(dir: &Path, config: &GameConfig) {
    if let Ok(file) = File::create(dir.join(LOG_FILE)) {
        let _ = WriteLogger::init(config.log_level, LogConfig::default(), file);
    }
}

fn game_loop(
    world: &mut WorldState,
    menu: &mut MenuState,
    scores: &mut HighScores,
    store: &SaveStore,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> std::io::Result<()> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        info!("gamepad detected");
    }
    let mut drivers = Drivers::new(Instant::now());

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }

        let mut intents = kb.intents(menu.open);
        intents.extend_from_slice(gp.intents());

        let mut quit = false;
        for intent in intents {
            let before = world.phase;
            quit = if menu.open {
                let action = menu.handle(intent);
                apply_menu_action(world, menu, store, action)
            } else {
                dispatch_intent(world, menu, store, intent)
            };
            drivers.observe(before, world.phase, Instant::now());
            if quit {
                break;
            }
        }
        if quit {
            break;
        }

        // Main tick driver
        if world.phase == Phase::Running && drivers.take_tick(Instant::now(), world.tick_interval_ms) {
            let before = world.phase;
            let events = step::advance_tick(world, scores);
            drivers.observe(before, world.phase, Instant::now());
            apply_events(world, &events);
        }

        // Countdown driver
        if matches!(world.phase, Phase::Countdown(_)) && drivers.take_beat(Instant::now()) {
            let before = world.phase;
            if let Some(ev) = control::countdown_second(world) {
                apply_events(world, &[ev]);
            }
            drivers.observe(before, world.phase, Instant::now());
        }

        world.tick_message();

        let frame = Frame::capture(world);
        renderer.render(&frame, menu, scores.scores())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// In-game intent (menu closed). Returns true to quit.
fn dispatch_intent(world: &mut WorldState, menu: &mut MenuState, store: &SaveStore, intent: Intent) -> bool {
    let (command, event) = control::handle_intent(world, intent);
    if let Some(ev) = event {
        apply_events(world, &[ev]);
    }
    match command {
        Command::None => false,
        Command::ShowMenu => {
            menu.show(world.is_live(), store.exists());
            false
        }
        Command::Quit => true,
    }
}

/// Carry out a menu selection. Returns true to quit.
fn apply_menu_action(world: &mut WorldState, menu: &mut MenuState, store: &SaveStore, action: MenuAction) -> bool {
    match action {
        MenuAction::None => {}
        MenuAction::Resume => {
            if control::start_resume_countdown(world) {
                menu.open = false;
            }
        }
        MenuAction::StartGame { level, theme_idx } => {
            info!("new game at level {level}, theme {theme_idx}");
            level::new_game(world, level, theme_idx);
            menu.open = false;
        }
        MenuAction::Save => match store.save(world) {
            Ok(()) => {
                menu.status = Some("Game saved".into());
                world.set_message("Game saved");
            }
            Err(e) => {
                warn!("save failed: {e}");
                menu.status = Some("Save failed".into());
                world.set_message("Save failed");
            }
        },
        MenuAction::Load => {
            if store.load_into(world) && control::start_resume_countdown(world) {
                world.set_message("Game loaded");
                menu.open = false;
            } else {
                menu.status = Some("No usable saved game".into());
            }
        }
        MenuAction::Quit => return true,
    }
    menu.refresh(world.is_live(), store.exists());
    false
}

/// HUD messages for notable events. Logging of the events themselves
/// happens where they are produced.
fn apply_events(world: &mut WorldState, events: &[GameEvent]) {
    for ev in events {
        match ev {
            GameEvent::PowerUpCollected { kind } => world.set_message(format!("{}!", kind.label())),
            GameEvent::EffectExpired { kind } => world.set_message(format!("{} wore off", kind.label())),
            GameEvent::SpecialFoodSpawned { .. } => world.set_message("Bonus food!"),
            GameEvent::SpecialFoodEaten { points, .. } => world.set_message(format!("Bonus +{points}")),
            GameEvent::GameOver { score, cause } => debug!("run ended by {cause:?} at {score}"),
            GameEvent::CountdownStage { kind, remaining } => debug!("countdown {kind:?} at {remaining}"),
            _ => {}
        }
    }
}
