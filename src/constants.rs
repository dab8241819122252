//! Centralized gameplay constants for the simulation core.
//!
//! Units: positions are fixed-point milli-units (`WORLD_SCALE` per render
//! unit), velocities are units per millisecond, accelerations are units per
//! millisecond squared, and every duration is in clock milliseconds.
//! Per-kind tuning (projectile damage, monster stats) stays next to the
//! kind that owns it.

use crate::clock::Millis;

// =====================================================
// World
// =====================================================

/// Position units per render unit
pub const WORLD_SCALE: i32 = 1000;

/// Integrated positions and velocities saturate at `±WORLD_LIMIT`
pub const WORLD_LIMIT: i32 = 1 << 29;

/// Gravity applied to every falling body (units/ms²)
pub const GRAVITY: i32 = -4;

/// Knockback drag: horizontal deceleration is `-vx / KNOCKBACK_DRAG_DIVISOR`
pub const KNOCKBACK_DRAG_DIVISOR: i32 = 1000;

// =====================================================
// Character movement
// =====================================================

pub const WALK_SPEED: i32 = 400;
pub const RUN_SPEED: i32 = 750;
pub const JUMP_VELOCITY: i32 = 1600;

/// Jumps allowed between two ground contacts (ground jump + air jump)
pub const MAX_AIR_JUMPS: u32 = 2;

/// Second press of the same direction within this window starts a run
pub const DOUBLE_TAP_MS: Millis = 300;

/// Skid duration after releasing a run
pub const STOP_DURATION_MS: Millis = 200;

// =====================================================
// Character damage
// =====================================================

/// `Hit` -> `Slip`
pub const CHARACTER_HIT_MS: Millis = 500;

/// `Slip` -> `Normal`
pub const CHARACTER_SLIP_MS: Millis = 1000;

/// Invincibility after losing a skill slot
pub const INVINCIBLE_AFTER_HIT_MS: Millis = 5000;

/// Invincibility after the killing blow (keeps the corpse from being juggled)
pub const INVINCIBLE_AFTER_DEATH_MS: Millis = 600_000;

pub const HIT_KNOCKBACK_X: i32 = 500;
pub const HIT_KNOCKBACK_Y: i32 = 900;
pub const DEATH_KNOCKBACK_X: i32 = 900;
pub const DEATH_KNOCKBACK_Y: i32 = 1500;

// =====================================================
// Skills
// =====================================================

/// Number of skill slots in the hand
pub const SKILL_SLOT_COUNT: usize = 4;

pub const MIN_SKILL_POWER: i32 = 1;
pub const MAX_SKILL_POWER: i32 = 10;

/// Spell state length; also the cast shield window
pub const SPELL_DURATION_MS: Millis = 300;

/// Effective power bonus granted by a triple
pub const TRIPLE_POWER_BONUS: i32 = 3;

// =====================================================
// Combo
// =====================================================

/// Combo expires this long after the last accepted hit
pub const COMBO_WINDOW_MS: Millis = 5000;

// =====================================================
// Hits
// =====================================================

/// The same hitter may damage the same monster again only after this long
pub const HIT_LEDGER_COOLDOWN_MS: Millis = 1000;

// =====================================================
// Guardians (pair bonuses)
// =====================================================

pub const GUARDIAN_ORBIT_RADIUS: i32 = 150_000;
pub const GUARDIAN_HALF_SIZE: i32 = 30_000;
pub const GUARDIAN_PERIOD_MS: Millis = 1500;
pub const GUARDIAN_DAMAGE: i32 = 12;

// =====================================================
// Monsters
// =====================================================

pub const MONSTER_HIT_MS: Millis = 500;

/// Hits landing this soon after entering `Hit` do not restart the knockback
pub const MONSTER_HIT_GUARD_MS: Millis = 200;

pub const MONSTER_DIE_MS: Millis = 1000;

/// `prev_hp <- (prev_hp * PREV_HP_SMOOTHING + hp) / (PREV_HP_SMOOTHING + 1)`
pub const PREV_HP_SMOOTHING: i32 = 30;

// =====================================================
// Items
// =====================================================

pub const ITEM_LIFETIME_MS: Millis = 10_000;
pub const ITEM_HALF_SIZE: i32 = 25_000;
