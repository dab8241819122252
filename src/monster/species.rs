//! The four monster species and their idle behaviour.
//!
//! - Hopper: patrols and hops on a random timer
//! - Drifter: floats, gliding towards a new random altitude on a random timer
//! - Walker: plain patrol, turning at the field edges
//! - Faller: arrives airborne, falls, and stays where it first lands

use bevy::math::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Monster, MonsterState};
use crate::clock::Millis;
use crate::constants::GRAVITY;
use crate::container::FrameContext;

pub(super) const HOP_VELOCITY: i32 = 1100;
const HOP_INTERVAL_MS: (Millis, Millis) = (1000, 3000);

const DRIFT_INTERVAL_MS: (Millis, Millis) = (1500, 4000);
pub(super) const DRIFT_ALTITUDE: (i32, i32) = (150_000, 650_000);
/// Time constant of the altitude glide
pub(super) const DRIFT_SMOOTHING_MS: i32 = 500;

const FALLER_ALTITUDE: i32 = 700_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Hopper,
    Drifter,
    Walker,
    Faller,
}

#[derive(Debug, Clone, Copy)]
pub struct SpeciesStats {
    pub max_hp: i32,
    pub half_width: i32,
    pub height: i32,
    /// Patrol speed once inside the field
    pub speed: i32,
    /// Inward speed while entering from the edge
    pub entry_speed: i32,
    /// Scales the knockback the character takes on contact
    pub knockback_percent: i32,
}

impl Species {
    pub const ALL: [Species; 4] = [
        Species::Hopper,
        Species::Drifter,
        Species::Walker,
        Species::Faller,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Species::Hopper => "hopper",
            Species::Drifter => "drifter",
            Species::Walker => "walker",
            Species::Faller => "faller",
        }
    }

    /// Opaque key the renderer resolves to a model
    pub fn visual_key(self) -> &'static str {
        match self {
            Species::Hopper => "monster/hopper",
            Species::Drifter => "monster/drifter",
            Species::Walker => "monster/walker",
            Species::Faller => "monster/faller",
        }
    }

    pub fn stats(self) -> SpeciesStats {
        match self {
            Species::Hopper => SpeciesStats {
                max_hp: 60,
                half_width: 40_000,
                height: 70_000,
                speed: 120,
                entry_speed: 300,
                knockback_percent: 100,
            },
            Species::Drifter => SpeciesStats {
                max_hp: 40,
                half_width: 45_000,
                height: 60_000,
                speed: 150,
                entry_speed: 300,
                knockback_percent: 80,
            },
            Species::Walker => SpeciesStats {
                max_hp: 80,
                half_width: 45_000,
                height: 110_000,
                speed: 200,
                entry_speed: 300,
                knockback_percent: 100,
            },
            Species::Faller => SpeciesStats {
                max_hp: 120,
                half_width: 60_000,
                height: 90_000,
                speed: 0,
                entry_speed: 500,
                knockback_percent: 140,
            },
        }
    }
}

/// Species-specific timers and flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Behavior {
    Hopper { next_hop_at: Millis },
    Drifter { next_move_at: Millis, target_y: i32 },
    Walker,
    Faller { resting: bool },
}

impl Behavior {
    pub(crate) fn new(species: Species) -> Self {
        match species {
            Species::Hopper => Behavior::Hopper { next_hop_at: 0 },
            Species::Drifter => Behavior::Drifter {
                next_move_at: 0,
                target_y: 0,
            },
            Species::Walker => Behavior::Walker,
            Species::Faller => Behavior::Faller { resting: false },
        }
    }
}

/// Altitude at which a species appears at the field edge
pub(crate) fn spawn_altitude<R: Rng>(species: Species, floor: i32, rng: &mut R) -> i32 {
    match species {
        Species::Hopper | Species::Walker => floor,
        Species::Drifter => floor + rng.gen_range(DRIFT_ALTITUDE.0..=DRIFT_ALTITUDE.1),
        Species::Faller => floor + FALLER_ALTITUDE,
    }
}

impl Monster {
    /// Whether knockback may lift this monster
    pub(super) fn takes_vertical_knockback(&self) -> bool {
        match self.behavior {
            Behavior::Drifter { .. } => false,
            Behavior::Faller { resting } => !resting,
            _ => true,
        }
    }

    /// (Re)start the idle behaviour after entering the field or recovering
    /// from a hit
    pub(super) fn resume_patrol<R: Rng>(&mut self, now: Millis, rng: &mut R) {
        let speed = self.species.stats().speed * self.body.facing.sign();
        self.body.acceleration = IVec2::new(0, GRAVITY);
        match &mut self.behavior {
            Behavior::Hopper { next_hop_at } => {
                self.body.velocity.x = speed;
                *next_hop_at = now + rng.gen_range(HOP_INTERVAL_MS.0..=HOP_INTERVAL_MS.1);
            }
            Behavior::Drifter {
                next_move_at,
                target_y,
            } => {
                self.body.acceleration = IVec2::ZERO;
                self.body.velocity = IVec2::new(speed, 0);
                *target_y = self.body.position.y;
                *next_move_at = now + rng.gen_range(DRIFT_INTERVAL_MS.0..=DRIFT_INTERVAL_MS.1);
            }
            Behavior::Walker => {
                self.body.velocity.x = speed;
            }
            Behavior::Faller { resting } => {
                if *resting {
                    self.body.velocity.x = 0;
                }
            }
        }
    }

    /// One frame of idle behaviour in the `Normal` state
    pub(super) fn patrol(&mut self, ctx: &mut FrameContext<'_>) {
        match &mut self.behavior {
            Behavior::Hopper { next_hop_at } => {
                if self.grounded && ctx.now >= *next_hop_at {
                    self.body.velocity.y = HOP_VELOCITY;
                    self.grounded = false;
                    *next_hop_at =
                        ctx.now + ctx.rng.gen_range(HOP_INTERVAL_MS.0..=HOP_INTERVAL_MS.1);
                }
            }
            Behavior::Drifter {
                next_move_at,
                target_y,
            } => {
                if ctx.now >= *next_move_at {
                    *target_y =
                        ctx.field.floor + ctx.rng.gen_range(DRIFT_ALTITUDE.0..=DRIFT_ALTITUDE.1);
                    *next_move_at =
                        ctx.now + ctx.rng.gen_range(DRIFT_INTERVAL_MS.0..=DRIFT_INTERVAL_MS.1);
                }
                self.body.velocity.y = (*target_y - self.body.position.y) / DRIFT_SMOOTHING_MS;
            }
            Behavior::Walker | Behavior::Faller { .. } => {}
        }

        let outcome = ctx.field.integrate_bounded(&mut self.body, ctx.dt);
        self.grounded = outcome.landed;
        if outcome.hit_wall {
            self.body.facing = self.body.facing.flipped();
            self.body.velocity.x = -self.body.velocity.x;
        }

        if let Behavior::Faller { resting } = &mut self.behavior {
            if outcome.landed && !*resting {
                *resting = true;
                self.body.velocity.x = 0;
            }
        }
        debug_assert_eq!(self.body.state(), MonsterState::Normal);
    }
}
