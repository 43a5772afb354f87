//! per‑frame world streaming around the player & its diagnostics

use std::fmt::Display;
use std::str::FromStr;

use bevy::prelude::*;

use crate::chunk_mesh::{ChunkScene, ChunkVisual};
use crate::constants::*;
use crate::level::LevelDescriptor;
use crate::player::PlayerState;
use crate::world::{StreamingConfig, WorldState};

/// The one world instance. Only world operations mutate it.
#[derive(Resource, Deref, DerefMut)]
pub struct MazeWorld(pub WorldState<ChunkVisual>);

/// environment override if it parses, `default` otherwise
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(err) => {
                warn!("ignoring {name}={raw:?}: {err}");
                default
            }
        },
        Err(_) => default,
    }
}

fn streaming_config() -> StreamingConfig {
    let render = env_or(RENDER_RADIUS_ENV_VAR, RENDER_RADIUS);
    let keep = env_or(KEEP_RADIUS_ENV_VAR, KEEP_RADIUS);
    StreamingConfig::new(render, keep).unwrap_or_else(|err| {
        warn!("{err}; falling back to render {RENDER_RADIUS} / keep {KEEP_RADIUS}");
        StreamingConfig::default()
    })
}

/* ===========================================================
   startup
   =========================================================== */
pub fn setup_world(mut commands: Commands) {
    let level = LevelDescriptor::level_zero(env_or(SEED_ENV_VAR, DEFAULT_LEVEL_SEED));
    commands.insert_resource(MazeWorld(WorldState::new(level, streaming_config())));
}

/* ===========================================================
   stream_chunks_system – runs after movement has settled
   =========================================================== */
pub fn stream_chunks_system(
    player_q: Query<&PlayerState>,
    mut world: ResMut<MazeWorld>,
    mut scene: ChunkScene,
) {
    let Ok(player) = player_q.get_single() else { return };
    let centre = world.chunk_at(player.position.x, player.position.z);
    world.refresh(centre, &mut scene);
}

/* ===========================================================
   once‑a‑second summary
   =========================================================== */
pub fn log_world_stats_system(
    time: Res<Time>,
    world: Res<MazeWorld>,
    mut accumulator: Local<f32>,
) {
    *accumulator += time.delta_secs();
    if *accumulator < STATS_LOG_INTERVAL {
        return;
    }
    *accumulator = 0.0;

    let stats = world.stats();
    debug!(
        "world-stream: level={} logical={} visual={} generated={} evicted={} realized={} released={}",
        world.level().name(),
        world.logical_len(),
        world.visual_len(),
        stats.generated,
        stats.evicted,
        stats.realized,
        stats.released,
    );
}
