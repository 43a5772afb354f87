use bevy::pbr::{DistanceFog, FogFalloff};
use bevy::prelude::*;

use crate::constants::*;
use crate::player::PlayerState;

/// the player *is* the camera entity
pub fn spawn_player_camera(mut commands: Commands) {
    let player = PlayerState::default();
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: 0.1,
            far: FAR_PLANE,
            ..default()
        }),
        DistanceFog {
            color: Color::BLACK,
            falloff: FogFalloff::Linear {
                start: FOG_START,
                end: FOG_END,
            },
            ..default()
        },
        Transform::from_translation(player.position).with_rotation(player.rotation()),
        player,
    ));
}

/// copy the settled player pose onto the camera transform
///
/// NOTE: runs in **PostUpdate**, after movement and any door teleport.
pub fn camera_follow_system(mut q: Query<(&mut Transform, &PlayerState), Changed<PlayerState>>) {
    for (mut tf, player) in &mut q {
        tf.translation = player.position;
        tf.rotation = player.rotation();
    }
}
