//! liminal walk – first‑person stroll through an endless generated maze
//!
//! Chunks stream in around the player, walls collide against the tile grid
//! and doors lead into pocket levels. Works with **Bevy 0.15**.
//!
//! The world engine (`rng`, `level`, `generator`, `world`) is plain data and
//! functions; everything Bevy‑specific consumes it through
//! [`world::ChunkRealizer`] and the `is_solid_at` predicate.

pub mod camera;
pub mod chunk_mesh;
pub mod components;
pub mod constants;
pub mod doors;
pub mod generator;
pub mod hud;
pub mod level;
pub mod player;
pub mod rng;
pub mod streaming;
pub mod world;

use bevy::prelude::*;
use bevy::transform::TransformSystem;

use camera::{camera_follow_system, spawn_player_camera};
use constants::AMBIENT_BRIGHTNESS;
use doors::{door_target_system, enter_door_system, random_level_system, DoorTarget, LevelStack};
use hud::{spawn_hud, update_hint_system};
use player::{gather_input_system, player_movement_system, InputState};
use streaming::{log_world_stats_system, setup_world, stream_chunks_system};

pub struct LiminalPlugin;

impl Plugin for LiminalPlugin {
    fn build(&self, app: &mut App) {
        app
            /* resources --------------------------------------------------- */
            .insert_resource(ClearColor(Color::BLACK))
            .insert_resource(AmbientLight {
                color: Color::WHITE,
                brightness: AMBIENT_BRIGHTNESS,
            })
            .init_resource::<InputState>()
            .init_resource::<DoorTarget>()
            .init_resource::<LevelStack>()

            /* startup systems --------------------------------------------- */
            .add_systems(Startup, (setup_world, spawn_player_camera, spawn_hud))

            /* frame‑update: doors → move → stream, strictly in order ----- */
            .add_systems(
                Update,
                (
                    /* input ----------------------------------------------- */
                    gather_input_system,           // keys, mouse, pointer lock

                    /* doors (may swap the level) -------------------------- */
                    door_target_system,            // centre‑screen pick
                    enter_door_system,             // E
                    random_level_system,           // R

                    /* player ---------------------------------------------- */
                    player_movement_system,        // walk & collide

                    /* world: always last, so a swapped level is in place -- */
                    stream_chunks_system,          // ensure / drop around player

                    /* misc ------------------------------------------------ */
                    update_hint_system,
                    log_world_stats_system,
                )
                    .chain(),
            )

            /* post‑update (camera) ---------------------------------------- */
            .add_systems(
                PostUpdate,
                camera_follow_system.before(TransformSystem::TransformPropagate),
            );
    }
}
