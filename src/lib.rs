//! Side-Scroller Core Library
//!
//! Deterministic gameplay simulation for a 2.5D side-scrolling action game:
//! - Rigidbodies with timed state and fixed-point integration
//! - Ground resolver over a segment list, field X bounds
//! - Entity containers with swap-and-pop removal, collision dispatch
//! - Six projectile kinds, four monster species
//! - Character state machine with a four-slot skill hand and poker bonus
//! - Combo tracking, guardians, skill item drops
//! - Epoch-based monster spawn scheduler
//! - Bevy plugin driving the simulation from keyboard input and frame time

pub mod activation;
pub mod character;
pub mod clock;
pub mod collision;
pub mod config;
pub mod constants;
pub mod container;
pub mod events;
pub mod input;
pub mod item;
pub mod logging;
pub mod monster;
pub mod physics;
pub mod plugin;
pub mod projectile;
pub mod random;
pub mod rigidbody;
pub mod simulation;
pub mod skill;
pub mod spawner;

pub use clock::{FrameTime, GameClock, Millis};
pub use config::{load_config, ConfigError, SimulationConfig};
pub use events::SimEvent;
pub use input::{InputSnapshot, InputTracker, Key};
pub use plugin::{ClockSource, SimulationPlugin, SimulationState};
pub use simulation::{SimStats, Simulation};
