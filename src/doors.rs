//! door targeting, level transitions & the return stack
//!
//! Doors are only entered when the player looks straight at one within reach
//! and no wall tile sits between them. Walking through a door leads to a
//! pocket level; the pocket's door leads back to where the player came from.

use bevy::input::ButtonInput;
use bevy::prelude::*;
use rand::Rng;

use crate::chunk_mesh::ChunkScene;
use crate::components::DoorMarker;
use crate::constants::{DOOR_REACH, LINE_OF_SIGHT_STEP};
use crate::level::LevelDescriptor;
use crate::player::{PlayerState, Pose};
use crate::streaming::MazeWorld;

/* ===========================================================
   resources
   =========================================================== */
#[derive(Resource, Default)]
pub struct DoorTarget(pub Option<Entity>);

/// Levels are stored as descriptors and regenerate from their seed on
/// return; no generated chunk survives a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnPoint {
    pub level: LevelDescriptor,
    pub pose: Pose,
}

#[derive(Resource, Default)]
pub struct LevelStack {
    returns: Vec<ReturnPoint>,
}

impl LevelStack {
    /// Next level & pose after walking through a door, or `None` when a
    /// pocket door has nowhere to return to.
    pub fn through_door(
        &mut self,
        current: &LevelDescriptor,
        pose: Pose,
        destination_seed: u32,
    ) -> Option<(LevelDescriptor, Pose)> {
        if current.is_pocket() {
            let back = self.returns.pop()?;
            return Some((back.level, back.pose));
        }

        self.returns.push(ReturnPoint {
            level: current.clone(),
            pose,
        });
        let arrival = Pose {
            position: Vec3::new(0.0, pose.position.y, 0.0),
            yaw: 0.0,
            pitch: 0.0,
        };
        Some((LevelDescriptor::pocket(destination_seed), arrival))
    }

    pub fn clear(&mut self) {
        self.returns.clear();
    }

    pub fn depth(&self) -> usize {
        self.returns.len()
    }
}

/* ===========================================================
   geometry helpers
   =========================================================== */
/// Slab test; distance along `dir` to the box, `None` on a miss or when the
/// box is behind the origin.
pub fn ray_aabb(origin: Vec3, dir: Vec3, centre: Vec3, half: Vec3) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let lo = centre[axis] - half[axis];
        let hi = centre[axis] + half[axis];

        if d.abs() < 1e-8 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = ((lo - o) * inv, (hi - o) * inv);
        let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }
    Some(t_min)
}

/// March the ray over the tile grid up to just short of `distance`.
pub fn line_of_sight(
    origin: Vec3,
    dir: Vec3,
    distance: f32,
    mut is_solid: impl FnMut(f32, f32) -> bool,
) -> bool {
    let mut t = 0.0;
    while t < distance - LINE_OF_SIGHT_STEP {
        let p = origin + dir * t;
        if is_solid(p.x, p.z) {
            return false;
        }
        t += LINE_OF_SIGHT_STEP;
    }
    true
}

/* ===========================================================
   door_target_system – centre‑screen pick
   =========================================================== */
pub fn door_target_system(
    player_q: Query<&PlayerState>,
    doors: Query<(Entity, &Transform, &DoorMarker)>,
    mut world: ResMut<MazeWorld>,
    mut target: ResMut<DoorTarget>,
) {
    target.0 = None;
    let Ok(player) = player_q.get_single() else { return };

    let origin = player.position;
    let dir = player.rotation() * Vec3::NEG_Z;
    let size = world.level().chunk_size();

    // local transforms are chunk‑relative; rebuild the world position here so
    // doors spawned this frame are pickable before transform propagation
    let nearest = doors
        .iter()
        .filter_map(|(entity, tf, marker)| {
            let chunk_centre =
                Vec3::new(marker.chunk.x as f32 * size, 0.0, marker.chunk.z as f32 * size);
            ray_aabb(origin, dir, chunk_centre + tf.translation, marker.half_extents)
                .map(|t| (entity, t))
        })
        .filter(|&(_, t)| t <= DOOR_REACH)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((entity, t)) = nearest {
        if line_of_sight(origin, dir, t, |x, z| world.is_solid_at(x, z)) {
            target.0 = Some(entity);
        }
    }
}

/* ===========================================================
   enter_door_system (E)
   =========================================================== */
pub fn enter_door_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut target: ResMut<DoorTarget>,
    doors: Query<&DoorMarker>,
    mut world: ResMut<MazeWorld>,
    mut scene: ChunkScene,
    mut stack: ResMut<LevelStack>,
    mut player_q: Query<&mut PlayerState>,
) {
    if !keys.just_pressed(KeyCode::KeyE) {
        return;
    }
    let Some(entity) = target.0 else { return };
    let Ok(marker) = doors.get(entity) else { return };
    let Ok(mut player) = player_q.get_single_mut() else { return };

    let Some(door) = world
        .ensure_logical(marker.chunk)
        .doors()
        .get(marker.index)
        .copied()
    else {
        return;
    };

    let Some((level, pose)) =
        stack.through_door(world.level(), player.pose(), door.destination_seed)
    else {
        return;
    };

    info!(
        "door ({}, {}) in chunk ({}, {}) -> {} (stack depth {})",
        door.tile_x,
        door.tile_z,
        marker.chunk.x,
        marker.chunk.z,
        level.name(),
        stack.depth()
    );
    world.set_level(level, &mut scene);
    player.set_pose(pose);
    // the picked door was despawned with its chunk
    target.0 = None;
}

/* ===========================================================
   random_level_system (R)
   =========================================================== */
pub fn random_level_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut world: ResMut<MazeWorld>,
    mut scene: ChunkScene,
    mut stack: ResMut<LevelStack>,
    mut target: ResMut<DoorTarget>,
    mut player_q: Query<&mut PlayerState>,
) {
    if !keys.just_pressed(KeyCode::KeyR) {
        return;
    }
    let Ok(mut player) = player_q.get_single_mut() else { return };

    stack.clear();
    let level = LevelDescriptor::random_liminal(rand::thread_rng().gen());
    world.set_level(level, &mut scene);
    target.0 = None;
    player.position.x = 0.0;
    player.position.z = 0.0;
}
