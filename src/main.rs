//! Headless driver: runs the simulation under a scripted autopilot.
//!
//! Usage: sidescroll-headless [--frames N] [--step MS] [--seed S]
//!        [--config path.ron] [--json]

use bevy::prelude::*;
use tracing::{info, warn};

use sidescroll_core::logging::{init_tracing, LoggingPlugin, TimingSpan};
use sidescroll_core::rigidbody::to_render;
use sidescroll_core::skill::SkillType;
use sidescroll_core::{load_config, ClockSource, SimEvent, SimulationConfig, SimulationPlugin, SimulationState};

const DEFAULT_FRAMES: u64 = 3_600;
const DEFAULT_STEP_MS: u64 = 16;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let frames = parse_arg(&args, "--frames").unwrap_or(DEFAULT_FRAMES);
    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => load_config(&path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = parse_arg(&args, "--seed") {
        config.seed = seed;
    }
    let json = args.iter().any(|a| a == "--json");
    init_tracing(&config.tracing);

    let step = match parse_arg(&args, "--step") {
        Some(0) => {
            warn!(default = DEFAULT_STEP_MS, "--step 0 would never advance the clock, using default");
            DEFAULT_STEP_MS
        }
        other => other.unwrap_or(DEFAULT_STEP_MS),
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(LoggingPlugin {
            config: config.tracing.clone(),
        })
        .add_plugins(SimulationPlugin::new(
            &config,
            ClockSource::Fixed(step as i64),
        )?)
        .init_resource::<EventTally>()
        .add_systems(Update, tally_events);
    app.finish();
    app.cleanup();

    info!(seed = config.seed, frames, step, "headless run starting");
    give_starter_hand(&mut app);

    {
        let _span = TimingSpan::new("headless_run");
        for frame in 0..frames {
            autopilot(&mut app, frame);
            app.update();
            app.world_mut()
                .resource_mut::<ButtonInput<KeyCode>>()
                .clear();
        }
    }

    let state = app.world().resource::<SimulationState>();
    let stats = state.simulation.stats();
    let character = &state.simulation.character;
    let at = to_render(character.body.position);
    let tally = app.world().resource::<EventTally>();
    info!(
        frames = stats.frames,
        now = state.simulation.now(),
        monsters_spawned = stats.monsters_spawned,
        monsters_killed = stats.monsters_killed,
        projectiles_fired = stats.projectiles_fired,
        skills_learned = stats.skills_learned,
        items_dropped = stats.items_dropped,
        best_combo = stats.best_combo,
        casts = tally.casts,
        deaths = tally.deaths,
        last_epoch = tally.last_epoch,
        alive = !character.is_dead(),
        x = at.x,
        y = at.y,
        "headless run finished"
    );
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}

/// One of each of the first three skill types so the autopilot can cast
/// before any monster has dropped an item
fn give_starter_hand(app: &mut App) {
    let mut state = app.world_mut().resource_mut::<SimulationState>();
    let now = state.simulation.now();
    let mut events = Vec::new();
    for skill in [SkillType::Ember, SkillType::Arrow, SkillType::Slash] {
        state
            .simulation
            .character
            .learn_skill_with_power(skill, 3, now, &mut events);
    }
}

/// Patrol back and forth, jump now and then, cast whenever possible
fn autopilot(app: &mut App, frame: u64) {
    let mut wanted = Vec::with_capacity(3);
    wanted.push(if frame % 240 < 120 {
        KeyCode::ArrowRight
    } else {
        KeyCode::ArrowLeft
    });
    if frame % 50 == 0 {
        wanted.push(KeyCode::Space);
    }
    if frame % 40 == 20 {
        wanted.push(KeyCode::KeyZ);
    }

    let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
    let held: Vec<KeyCode> = keys.get_pressed().copied().collect();
    for key in held {
        if !wanted.contains(&key) {
            keys.release(key);
        }
    }
    for key in wanted {
        keys.press(key);
    }
}

#[derive(Resource, Default)]
struct EventTally {
    casts: u32,
    deaths: u32,
    last_epoch: i64,
}

fn tally_events(mut events: EventReader<SimEvent>, mut tally: ResMut<EventTally>) {
    for event in events.read() {
        match event {
            SimEvent::SkillCast { .. } => tally.casts += 1,
            SimEvent::CharacterDied { .. } => tally.deaths += 1,
            SimEvent::EpochStarted { epoch, .. } => tally.last_epoch = *epoch,
            _ => {}
        }
    }
}

fn parse_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|val| val.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
