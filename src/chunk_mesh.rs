//! realizes logical chunks as Bevy scene content & tears them down again
//!
//! Each chunk becomes one entity tree (floor, ceiling, wall cuboids, a point
//! light, door frames). Every mesh and material it allocates is tracked in
//! its [`ChunkVisual`] so release can free them explicitly.

use std::f32::consts::PI;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use noise::{NoiseFn, Perlin};

use crate::components::{ChunkRoot, DoorMarker};
use crate::constants::*;
use crate::generator::{Cell, ChunkData};
use crate::level::LevelDescriptor;
use crate::world::{ChunkCoord, ChunkRealizer};

/// owned scene resources of one realized chunk
pub struct ChunkVisual {
    root: Entity,
    meshes: Vec<Handle<Mesh>>,
    materials: Vec<Handle<StandardMaterial>>,
}

#[derive(SystemParam)]
pub struct ChunkScene<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
}

/* ===========================================================
   colour helpers
   =========================================================== */
#[inline]
pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// quantised noise band in `0..COLOR_VARIATION_LEVELS`
fn color_band(noise: &Perlin, world_x: f32, world_z: f32) -> usize {
    let raw = noise.get([
        world_x as f64 * COLOR_NOISE_SCALE,
        world_z as f64 * COLOR_NOISE_SCALE,
    ]) as f32;
    let step = (((raw + 1.0) * 0.5) * COLOR_VARIATION_LEVELS as f32)
        .floor()
        .clamp(0.0, (COLOR_VARIATION_LEVELS - 1) as f32);
    step as usize
}

fn banded_color(rgb: u32, band: usize) -> Color {
    let norm = band as f32 / (COLOR_VARIATION_LEVELS as f32 - 1.0) * 2.0 - 1.0;
    let factor = 1.0 + norm * COLOR_VARIATION_STRENGTH;
    let base = hex_color(rgb).to_srgba();
    Color::srgb(
        (base.red * factor).clamp(0.0, 1.0),
        (base.green * factor).clamp(0.0, 1.0),
        (base.blue * factor).clamp(0.0, 1.0),
    )
}

/// chunk‑local centre of a tile (chunk centre = origin)
#[inline]
fn tile_center(tile_x: usize, tile_z: usize, cell: f32, size: f32) -> (f32, f32) {
    (
        (tile_x as f32 + 0.5) * cell - size / 2.0,
        (tile_z as f32 + 0.5) * cell - size / 2.0,
    )
}

impl ChunkScene<'_, '_> {
    fn material(
        &mut self,
        color: Color,
        owned: &mut Vec<Handle<StandardMaterial>>,
    ) -> Handle<StandardMaterial> {
        let handle = self.materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        });
        owned.push(handle.clone());
        handle
    }

    fn mesh(&mut self, mesh: impl Into<Mesh>, owned: &mut Vec<Handle<Mesh>>) -> Handle<Mesh> {
        let handle = self.meshes.add(mesh);
        owned.push(handle.clone());
        handle
    }
}

/* ===========================================================
   realize / release
   =========================================================== */
impl ChunkRealizer for ChunkScene<'_, '_> {
    type Handle = ChunkVisual;

    fn realize(
        &mut self,
        coord: ChunkCoord,
        chunk: &ChunkData,
        level: &LevelDescriptor,
    ) -> ChunkVisual {
        let size = level.chunk_size();
        let n = chunk.n();
        let cell = size / n as f32;
        let wall_h = level.wall_height();
        let palette = level.palette();
        let centre = Vec3::new(coord.x as f32 * size, 0.0, coord.z as f32 * size);

        let mut meshes = Vec::new();
        let mut materials = Vec::new();

        let plane = self.mesh(Plane3d::default().mesh().size(size, size), &mut meshes);
        let wall_mesh = self.mesh(Cuboid::new(cell, wall_h, cell), &mut meshes);
        let frame_mesh = self.mesh(Cuboid::new(cell * 1.2, wall_h * 0.9, cell * 0.2), &mut meshes);
        let door_mesh = self.mesh(Cuboid::new(cell * 0.9, wall_h * 0.8, cell * 0.08), &mut meshes);

        let floor_mat = self.material(hex_color(palette.floor), &mut materials);
        let ceiling_mat = self.material(hex_color(palette.ceiling), &mut materials);
        let wall_mats: Vec<_> = (0..COLOR_VARIATION_LEVELS)
            .map(|band| self.material(banded_color(palette.wall, band), &mut materials))
            .collect();
        let door_mat = self.material(hex_color(DOOR_RGB), &mut materials);
        let frame_mat = self.material(hex_color(DOOR_FRAME_RGB), &mut materials);

        let noise = Perlin::new(level.seed());

        let root = self
            .commands
            .spawn((
                ChunkRoot { coord },
                Transform::from_translation(centre),
                Visibility::default(),
            ))
            .with_children(|parent| {
                /* floor & ceiling ------------------------------------------- */
                parent.spawn((
                    Mesh3d(plane.clone()),
                    MeshMaterial3d(floor_mat),
                    Transform::default(),
                ));
                parent.spawn((
                    Mesh3d(plane),
                    MeshMaterial3d(ceiling_mat),
                    Transform::from_xyz(0.0, wall_h, 0.0).with_rotation(Quat::from_rotation_x(PI)),
                ));

                /* walls ----------------------------------------------------- */
                for tz in 0..n {
                    for tx in 0..n {
                        if chunk.cell(tx, tz) != Cell::Solid {
                            continue;
                        }
                        let (lx, lz) = tile_center(tx, tz, cell, size);
                        let band = color_band(&noise, centre.x + lx, centre.z + lz);
                        parent.spawn((
                            Mesh3d(wall_mesh.clone()),
                            MeshMaterial3d(wall_mats[band].clone()),
                            Transform::from_xyz(lx, wall_h / 2.0, lz),
                        ));
                    }
                }

                /* light ----------------------------------------------------- */
                parent.spawn((
                    PointLight {
                        color: Color::WHITE,
                        intensity: CHUNK_LIGHT_INTENSITY,
                        range: size * CHUNK_LIGHT_RANGE,
                        shadows_enabled: false,
                        ..default()
                    },
                    Transform::from_xyz(0.0, wall_h - 0.3, 0.0),
                ));

                /* doors ----------------------------------------------------- */
                for (index, door) in chunk.doors().iter().enumerate() {
                    let (gx, gz) = tile_center(door.tile_x, door.tile_z, cell, size);
                    parent.spawn((
                        Mesh3d(frame_mesh.clone()),
                        MeshMaterial3d(frame_mat.clone()),
                        Transform::from_xyz(gx, wall_h * 0.9 / 2.0, gz),
                    ));
                    parent.spawn((
                        Mesh3d(door_mesh.clone()),
                        MeshMaterial3d(door_mat.clone()),
                        Transform::from_xyz(gx, wall_h * 0.8 / 2.0, gz + cell * 0.09),
                        DoorMarker {
                            chunk: coord,
                            index,
                            half_extents: Vec3::new(cell * 0.45, wall_h * 0.4, cell * 0.04),
                        },
                    ));
                }
            })
            .id();

        ChunkVisual {
            root,
            meshes,
            materials,
        }
    }

    fn release(&mut self, visual: ChunkVisual) {
        self.commands.entity(visual.root).despawn_recursive();
        for handle in &visual.meshes {
            self.meshes.remove(handle);
        }
        for handle in &visual.materials {
            self.materials.remove(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn hex_color_splits_channels() {
        let c = hex_color(0xff8000).to_srgba();
        assert_eq!(c.red, 1.0);
        assert!((c.green - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.blue, 0.0);
    }

    #[test]
    fn bands_brighten_monotonically() {
        let darkest = banded_color(0x808080, 0).to_srgba();
        let brightest = banded_color(0x808080, COLOR_VARIATION_LEVELS - 1).to_srgba();
        assert!(darkest.red < brightest.red);
    }

    #[test]
    fn color_band_stays_in_range() {
        let noise = Perlin::new(42);
        for i in 0..200 {
            let band = color_band(&noise, i as f32 * 1.37, i as f32 * -0.61);
            assert!(band < COLOR_VARIATION_LEVELS);
        }
    }

    #[test]
    fn tile_centres_are_chunk_relative() {
        assert_eq!(tile_center(0, 0, 2.0, 10.0), (-4.0, -4.0));
        assert_eq!(tile_center(4, 2, 2.0, 10.0), (4.0, 0.0));
    }

    /* ---- scene round trip on a headless app ---- */

    fn scene_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>();
        app
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        let mut q = app.world_mut().query_filtered::<Entity, F>();
        q.iter(app.world()).count()
    }

    #[test]
    fn release_frees_every_entity_mesh_and_material() {
        let mut app = scene_app();
        // the origin pocket chunk carries the return door, so every part kind is built
        let level = LevelDescriptor::pocket(5);
        let chunk = level.generate_chunk(ChunkCoord::ORIGIN);
        assert_eq!(chunk.doors().len(), 1);

        let visual = app
            .world_mut()
            .run_system_once(move |mut scene: ChunkScene| {
                scene.realize(ChunkCoord::ORIGIN, &chunk, &level)
            })
            .expect("realize system runs");

        let root = visual.root;
        assert!(app.world().entities().contains(root));
        assert_eq!(count::<With<ChunkRoot>>(&mut app), 1);
        assert_eq!(count::<With<DoorMarker>>(&mut app), 1);
        assert!(count::<With<Parent>>(&mut app) > 0);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), visual.meshes.len());
        assert_eq!(
            app.world().resource::<Assets<StandardMaterial>>().len(),
            visual.materials.len()
        );

        let mut slot = Some(visual);
        app.world_mut()
            .run_system_once(move |mut scene: ChunkScene| {
                if let Some(visual) = slot.take() {
                    scene.release(visual);
                }
            })
            .expect("release system runs");

        assert!(!app.world().entities().contains(root));
        assert_eq!(count::<With<ChunkRoot>>(&mut app), 0);
        assert_eq!(count::<With<Parent>>(&mut app), 0);
        assert_eq!(count::<With<Mesh3d>>(&mut app), 0);
        assert_eq!(count::<With<PointLight>>(&mut app), 0);
        assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 0);
        assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), 0);
    }
}
