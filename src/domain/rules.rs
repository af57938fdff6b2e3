/// Scoring, pacing and progression formulas.
///
/// Pure functions over the tunables in `config`. The engine calls these and
/// never hard-codes a number itself.

use crate::config::{RulesConfig, SpeedConfig};
use crate::domain::entity::PowerUpKind;
use crate::domain::level::MAX_LEVEL;

/// Base tick interval for a level: linear from `max_interval_ms` at level 1
/// down to `min_interval_ms` at the last level.
pub fn base_interval_ms(level: u32, speed: &SpeedConfig) -> u64 {
    let lo = speed.min_interval_ms.min(speed.max_interval_ms);
    let hi = speed.max_interval_ms.max(speed.min_interval_ms);
    let clamped = level.clamp(1, MAX_LEVEL) as u64;
    hi - (hi - lo) * (clamped - 1) / (MAX_LEVEL as u64 - 1)
}

/// Tick interval with `effect` applied on top of the level base.
/// Slow and Speed are offsets (Speed has a floor); others leave the base alone.
pub fn interval_with_effect(level: u32, effect: Option<PowerUpKind>, speed: &SpeedConfig) -> u64 {
    let base = base_interval_ms(level, speed);
    match effect {
        Some(PowerUpKind::Slow) => base + speed.slow_bonus_ms,
        Some(PowerUpKind::Speed) => base.saturating_sub(speed.speed_penalty_ms).max(speed.speed_floor_ms),
        _ => base,
    }
}

/// Points for one primary food.
pub fn food_points(level: u32, effect: Option<PowerUpKind>, rules: &RulesConfig) -> u32 {
    let multiplier = if effect == Some(PowerUpKind::ScoreMultiplier) { 2 } else { 1 };
    rules.base_points * level.max(1) * multiplier
}

/// Foods to eat before leaving `level`.
pub fn food_quota(level: u32, rules: &RulesConfig) -> u32 {
    rules.quota_base + level * rules.quota_per_level
}

/// Does reaching `score` earn a special food?
pub fn earns_special_food(score: u32, rules: &RulesConfig) -> bool {
    rules.special_food_every > 0 && score > 0 && score % rules.special_food_every == 0
}
