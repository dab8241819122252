//! Bevy integration.
//!
//! `SimulationPlugin` owns a [`Simulation`] and a [`GameClock`] as a
//! resource, samples `ButtonInput<KeyCode>` once per `Update`, steps the
//! simulation and forwards its output as [`SimEvent`] bevy events. Only
//! the frame driver lives here; rendering and audio subscribe to the
//! events.

use bevy::prelude::*;

use crate::clock::{GameClock, Millis};
use crate::config::{ConfigError, SimulationConfig};
use crate::events::SimEvent;
use crate::input::{InputSnapshot, Key};
use crate::simulation::Simulation;

const SLOW_MOTION_SPEED: f32 = 0.25;
const SLOW_MOTION_MS: Millis = 2000;

/// Where frame time comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Bevy's `Time` delta
    Real,
    /// A fixed step per update, in milliseconds
    Fixed(Millis),
}

pub struct SimulationPlugin {
    simulation: Simulation,
    clock: ClockSource,
}

impl SimulationPlugin {
    pub fn new(config: &SimulationConfig, clock: ClockSource) -> Result<Self, ConfigError> {
        Ok(Self {
            simulation: Simulation::new(config)?,
            clock,
        })
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<ButtonInput<KeyCode>>() {
            app.init_resource::<ButtonInput<KeyCode>>();
        }
        app.add_event::<SimEvent>()
            .insert_resource(SimulationState {
                simulation: self.simulation.clone(),
                clock: GameClock::new(),
                slow_motion: SlowMotion::default(),
            })
            .insert_resource(FrameClockSource(self.clock))
            .init_resource::<FrameInput>()
            .add_systems(Update, (read_input, step_simulation).chain());
    }
}

#[derive(Resource)]
pub struct SimulationState {
    pub simulation: Simulation,
    pub clock: GameClock,
    pub slow_motion: SlowMotion,
}

#[derive(Resource, Clone, Copy)]
pub struct FrameClockSource(pub ClockSource);

/// Input sampled for the current frame
#[derive(Resource, Default, Clone, Copy)]
pub struct FrameInput(pub InputSnapshot);

/// Slows the clock for a while after the character dies
#[derive(Debug, Clone, Copy, Default)]
pub struct SlowMotion {
    until: Option<Millis>,
}

impl SlowMotion {
    pub fn is_active(&self) -> bool {
        self.until.is_some()
    }

    pub fn on_event(&mut self, clock: &mut GameClock, event: &SimEvent, now: Millis) {
        if matches!(event, SimEvent::CharacterDied { .. }) {
            clock.set_speed(SLOW_MOTION_SPEED);
            self.until = Some(now + SLOW_MOTION_MS);
        }
    }

    /// Restore normal speed once the slow-motion window has passed
    pub fn expire(&mut self, clock: &mut GameClock, now: Millis) {
        if self.until.is_some_and(|until| now >= until) {
            clock.set_speed(1.0);
            self.until = None;
        }
    }
}

fn key_bindings(key: Key) -> &'static [KeyCode] {
    match key {
        Key::Left => &[KeyCode::ArrowLeft, KeyCode::KeyA],
        Key::Right => &[KeyCode::ArrowRight, KeyCode::KeyD],
        Key::Jump => &[KeyCode::Space, KeyCode::ArrowUp],
        Key::CastSkill => &[KeyCode::KeyZ, KeyCode::KeyJ],
        Key::DiscardSkill => &[KeyCode::KeyX, KeyCode::KeyK],
        Key::Pause => &[KeyCode::KeyP, KeyCode::Escape],
        Key::Resume => &[KeyCode::KeyR],
    }
}

fn read_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<FrameInput>) {
    let mut snapshot = InputSnapshot::new();
    for key in Key::ALL {
        let codes = key_bindings(key);
        if keys.any_pressed(codes.iter().copied()) {
            snapshot = snapshot.with(key, keys.any_just_pressed(codes.iter().copied()));
        }
    }
    input.0 = snapshot;
}

fn step_simulation(
    time: Option<Res<Time>>,
    source: Res<FrameClockSource>,
    input: Res<FrameInput>,
    mut state: ResMut<SimulationState>,
    mut writer: EventWriter<SimEvent>,
) {
    let state = &mut *state;
    let input = input.0;
    if input.is_just_pressed(Key::Pause) {
        state.clock.pause();
    }
    if input.is_just_pressed(Key::Resume) {
        state.clock.resume();
    }

    let real_ms = match source.0 {
        ClockSource::Real => time.map_or(0.0, |t| t.delta_secs_f64() * 1000.0),
        ClockSource::Fixed(ms) => ms as f64,
    };
    let frame = state.clock.tick(real_ms);
    if state.clock.is_paused() {
        return;
    }
    state.slow_motion.expire(&mut state.clock, frame.now);

    for event in state.simulation.step(frame, &input) {
        state.slow_motion.on_event(&mut state.clock, event, frame.now);
        writer.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FrameTime;

    fn app() -> App {
        let mut app = App::new();
        let plugin = SimulationPlugin::new(&SimulationConfig::default(), ClockSource::Fixed(16)).unwrap();
        app.add_plugins(plugin);
        app
    }

    fn now(app: &App) -> Millis {
        app.world().resource::<SimulationState>().simulation.now()
    }

    fn tap(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.press(key);
        app.update();
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release(key);
        keys.clear();
    }

    #[test]
    fn test_fixed_clock_steps_simulation() {
        let mut app = app();
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(now(&app), 80);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut app = app();
        app.update();
        tap(&mut app, KeyCode::KeyP);
        let paused_at = now(&app);
        app.update();
        app.update();
        assert_eq!(now(&app), paused_at);

        tap(&mut app, KeyCode::KeyR);
        assert_eq!(now(&app), paused_at + 16);
    }

    #[test]
    fn test_held_key_reaches_character() {
        let mut app = app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::ArrowRight);
        app.update();
        let state = app.world().resource::<SimulationState>();
        assert_eq!(
            state.simulation.character.state(),
            crate::character::CharacterState::Walk
        );
    }

    #[test]
    fn test_slow_motion_after_death() {
        let mut clock = GameClock::new();
        let mut slow = SlowMotion::default();
        let died = SimEvent::CharacterDied {
            position: IVec2::ZERO,
        };
        slow.on_event(&mut clock, &died, 1000);
        assert!(slow.is_active());
        assert_eq!(clock.speed(), SLOW_MOTION_SPEED);

        slow.expire(&mut clock, 2999);
        assert!(slow.is_active());
        slow.expire(&mut clock, 3000);
        assert!(!slow.is_active());
        assert_eq!(clock.speed(), 1.0);

        let frame = clock.tick(16.0);
        assert_eq!(frame, FrameTime::new(16, 16));
    }
}
