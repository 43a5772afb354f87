use bevy::prelude::*;

use crate::world::ChunkCoord;

/* ===========================================================
   chunk scene content
   =========================================================== */
/// root of one realized chunk; walls, planes, light & doors hang below it
#[derive(Component)]
pub struct ChunkRoot {
    pub coord: ChunkCoord,
}

/// Interactive door. Points back at its `Door` in the chunk's logical data
/// instead of copying it.
#[derive(Component)]
pub struct DoorMarker {
    pub chunk: ChunkCoord,
    pub index: usize,
    pub half_extents: Vec3,
}

/* ===========================================================
   hud
   =========================================================== */
#[derive(Component)]
pub struct HintText;
