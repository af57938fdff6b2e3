/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::{info, warn, LevelFilter};
use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::level::MAX_LEVEL;
use crate::domain::theme::{find_theme, THEMES};

const APP_DIR: &str = "snakearcade";

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub rules: RulesConfig,
    pub gamepad: GamepadConfig,
    pub start_level: u32,
    pub start_theme: usize,
    pub data_dir: Option<PathBuf>,
    pub seed: Option<u64>,
    pub log_level: LevelFilter,
}

/// Tick pacing, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeedConfig {
    pub min_interval_ms: u64,   // fastest base interval (last level)
    pub max_interval_ms: u64,   // slowest base interval (level 1)
    pub slow_bonus_ms: u64,     // added while Slow is active
    pub speed_penalty_ms: u64,  // removed while Speed is active
    pub speed_floor_ms: u64,
}

/// Scoring and spawn tunables.
#[derive(Clone, Debug, PartialEq)]
pub struct RulesConfig {
    pub base_points: u32,
    pub quota_base: u32,
    pub quota_per_level: u32,
    pub special_food_every: u32,
    pub special_food_bonus: u32,
    pub special_food_ticks: u32,
    pub power_up_chance: f64,
    pub power_up_ticks: u32,
    pub min_snake_len: usize,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub pause: Vec<String>,
    pub menu: Vec<String>,
    pub confirm: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_min_interval")]
    min_interval_ms: u64,
    #[serde(default = "default_max_interval")]
    max_interval_ms: u64,
    #[serde(default = "default_slow_bonus")]
    slow_bonus_ms: u64,
    #[serde(default = "default_speed_penalty")]
    speed_penalty_ms: u64,
    #[serde(default = "default_speed_floor")]
    speed_floor_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_base_points")]
    base_points: u32,
    #[serde(default = "default_quota_base")]
    quota_base: u32,
    #[serde(default = "default_quota_per_level")]
    quota_per_level: u32,
    #[serde(default = "default_special_every")]
    special_food_every: u32,
    #[serde(default = "default_special_bonus")]
    special_food_bonus: u32,
    #[serde(default = "default_special_ticks")]
    special_food_ticks: u32,
    #[serde(default = "default_power_up_chance")]
    power_up_chance: f64,
    #[serde(default = "default_power_up_ticks")]
    power_up_ticks: u32,
    #[serde(default = "default_min_snake_len")]
    min_snake_len: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
    #[serde(default = "default_pad_menu")]
    menu: Vec<String>,
    #[serde(default = "default_pad_confirm")]
    confirm: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_start_level")]
    start_level: u32,
    #[serde(default = "default_theme")]
    theme: String,
    #[serde(default)]
    data_dir: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_min_interval() -> u64 { 40 }
fn default_max_interval() -> u64 { 180 }
fn default_slow_bonus() -> u64 { 40 }
fn default_speed_penalty() -> u64 { 30 }
fn default_speed_floor() -> u64 { 20 }

fn default_base_points() -> u32 { 10 }
fn default_quota_base() -> u32 { 8 }
fn default_quota_per_level() -> u32 { 2 }
fn default_special_every() -> u32 { 50 }
fn default_special_bonus() -> u32 { 50 }
fn default_special_ticks() -> u32 { 50 }
fn default_power_up_chance() -> f64 { 0.2 }
fn default_power_up_ticks() -> u32 { 100 }
fn default_min_snake_len() -> usize { 3 }

fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }
fn default_pad_menu() -> Vec<String> { vec!["Select".into()] }
fn default_pad_confirm() -> Vec<String> { vec!["A".into(), "X".into()] }

fn default_start_level() -> u32 { 1 }
fn default_theme() -> String { THEMES[0].name.into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            min_interval_ms: default_min_interval(),
            max_interval_ms: default_max_interval(),
            slow_bonus_ms: default_slow_bonus(),
            speed_penalty_ms: default_speed_penalty(),
            speed_floor_ms: default_speed_floor(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            base_points: default_base_points(),
            quota_base: default_quota_base(),
            quota_per_level: default_quota_per_level(),
            special_food_every: default_special_every(),
            special_food_bonus: default_special_bonus(),
            special_food_ticks: default_special_ticks(),
            power_up_chance: default_power_up_chance(),
            power_up_ticks: default_power_up_ticks(),
            min_snake_len: default_min_snake_len(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            pause: default_pad_pause(),
            menu: default_pad_menu(),
            confirm: default_pad_confirm(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            start_level: default_start_level(),
            theme: default_theme(),
            data_dir: String::new(),
            seed: None,
            log_level: default_log_level(),
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        TomlSpeed::default().into()
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        TomlRules::default().into()
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl From<TomlSpeed> for SpeedConfig {
    fn from(t: TomlSpeed) -> Self {
        let (lo, hi) = if t.min_interval_ms <= t.max_interval_ms {
            (t.min_interval_ms, t.max_interval_ms)
        } else {
            (t.max_interval_ms, t.min_interval_ms)
        };
        SpeedConfig {
            min_interval_ms: lo,
            max_interval_ms: hi,
            slow_bonus_ms: t.slow_bonus_ms,
            speed_penalty_ms: t.speed_penalty_ms,
            speed_floor_ms: t.speed_floor_ms.max(1),
        }
    }
}

impl From<TomlRules> for RulesConfig {
    fn from(t: TomlRules) -> Self {
        RulesConfig {
            base_points: t.base_points,
            quota_base: t.quota_base,
            quota_per_level: t.quota_per_level,
            special_food_every: t.special_food_every,
            special_food_bonus: t.special_food_bonus,
            special_food_ticks: t.special_food_ticks,
            power_up_chance: if t.power_up_chance.is_nan() {
                default_power_up_chance()
            } else {
                t.power_up_chance.clamp(0.0, 1.0)
            },
            power_up_ticks: t.power_up_ticks,
            min_snake_len: t.min_snake_len.max(1),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        load_from(&candidate_dirs())
    }

    /// Parse a config document; a malformed one yields the defaults.
    pub fn parse(text: &str) -> Self {
        match toml::from_str::<TomlConfig>(text) {
            Ok(cfg) => GameConfig::from_toml(cfg),
            Err(e) => {
                warn!("config.toml parse error, using defaults: {e}");
                GameConfig::default()
            }
        }
    }

    fn from_toml(t: TomlConfig) -> Self {
        let start_theme = find_theme(&t.general.theme).unwrap_or_else(|| {
            warn!("unknown theme {:?} in config, using {}", t.general.theme, THEMES[0].name);
            0
        });
        let log_level = t.general.log_level.trim().parse::<LevelFilter>().unwrap_or_else(|_| {
            warn!("unknown log_level {:?} in config, using info", t.general.log_level);
            LevelFilter::Info
        });
        let data_dir = if t.general.data_dir.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(t.general.data_dir.trim()))
        };

        GameConfig {
            speed: t.speed.into(),
            rules: t.rules.into(),
            gamepad: GamepadConfig {
                pause: t.gamepad.pause,
                menu: t.gamepad.menu,
                confirm: t.gamepad.confirm,
            },
            start_level: t.general.start_level.clamp(1, MAX_LEVEL),
            start_theme,
            data_dir,
            seed: t.general.seed,
            log_level,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so data is found relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable config.toml in `search_dirs`, parsed; defaults if none.
fn load_from(search_dirs: &[PathBuf]) -> GameConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    info!("config from {}", path.display());
                    return GameConfig::parse(&text);
                }
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    GameConfig::default()
}

/// Writable directory for saves, scores and the log.
/// Order: configured dir, exe dir, `~/.local/share/snakearcade`, CWD.
pub fn resolve_data_dir(configured: Option<&PathBuf>) -> PathBuf {
    if let Some(dir) = configured {
        if std::fs::create_dir_all(dir).is_ok() {
            return dir.clone();
        }
    }

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs won't be writable
            let probe = parent.join(".write_test_snakearcade");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share").join(APP_DIR);
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
