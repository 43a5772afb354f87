//! chunk cache, world streaming & the collision query
//!
//! Two tiers keyed by [`ChunkCoord`]:
//! * logical – generated tile grids, cheap, kept within `keep_radius`
//! * visual  – realized scene content, expensive, kept within `render_radius`
//!
//! Every visual entry has a logical entry underneath it. Distances are
//! Chebyshev in chunk units, measured from the player's chunk on every
//! `refresh`.

use std::collections::HashMap;

use bevy::log::{debug, info, trace};
use thiserror::Error;

use crate::constants::{KEEP_RADIUS, MAX_STREAMING_RADIUS, RENDER_RADIUS};
use crate::generator::ChunkData;
use crate::level::LevelDescriptor;

/* ===========================================================
   chunk coordinates
   =========================================================== */
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const ORIGIN: Self = Self { x: 0, z: 0 };

    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk whose footprint holds the world point. Chunk `c` is centred on
    /// `c * chunk_size` and spans half a chunk either side of it.
    #[inline]
    pub fn containing(world_x: f32, world_z: f32, chunk_size: f32) -> Self {
        Self {
            x: (world_x / chunk_size + 0.5).floor() as i32,
            z: (world_z / chunk_size + 0.5).floor() as i32,
        }
    }

    #[inline]
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/* ===========================================================
   streaming configuration
   =========================================================== */
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("radii must be non-negative (render {render}, keep {keep})")]
    NegativeRadius { render: i32, keep: i32 },

    #[error("keep radius {keep} must exceed render radius {render}")]
    KeepNotWider { render: i32, keep: i32 },

    #[error("radius {radius} exceeds the streaming limit of {max} chunks")]
    TooLarge { radius: i32, max: i32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamingConfig {
    render_radius: i32,
    keep_radius: i32,
}

impl StreamingConfig {
    pub fn new(render_radius: i32, keep_radius: i32) -> Result<Self, ConfigError> {
        if render_radius < 0 || keep_radius < 0 {
            return Err(ConfigError::NegativeRadius {
                render: render_radius,
                keep: keep_radius,
            });
        }
        if keep_radius <= render_radius {
            return Err(ConfigError::KeepNotWider {
                render: render_radius,
                keep: keep_radius,
            });
        }
        // render < keep, so capping keep caps both
        if keep_radius > MAX_STREAMING_RADIUS {
            return Err(ConfigError::TooLarge {
                radius: keep_radius,
                max: MAX_STREAMING_RADIUS,
            });
        }
        Ok(Self {
            render_radius,
            keep_radius,
        })
    }

    pub fn render_radius(&self) -> i32 {
        self.render_radius
    }

    pub fn keep_radius(&self) -> i32 {
        self.keep_radius
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_radius: RENDER_RADIUS,
            keep_radius: KEEP_RADIUS,
        }
    }
}

/* ===========================================================
   visual builder seam
   =========================================================== */
/// Turns a logical chunk into scene content and tears it down again.
///
/// `release` takes the handle by value; once released it cannot be used.
pub trait ChunkRealizer {
    type Handle;

    fn realize(
        &mut self,
        coord: ChunkCoord,
        chunk: &ChunkData,
        level: &LevelDescriptor,
    ) -> Self::Handle;

    fn release(&mut self, handle: Self::Handle);
}

/// running totals since start‑up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub generated: u64,
    pub evicted: u64,
    pub realized: u64,
    pub released: u64,
}

/* ===========================================================
   world state
   =========================================================== */
pub struct WorldState<H> {
    level: LevelDescriptor,
    config: StreamingConfig,
    logical: HashMap<ChunkCoord, ChunkData>,
    visual: HashMap<ChunkCoord, H>,
    stats: WorldStats,
    scratch: Vec<ChunkCoord>,
}

impl<H> WorldState<H> {
    pub fn new(level: LevelDescriptor, config: StreamingConfig) -> Self {
        info!("entering {} (seed {})", level.name(), level.seed());
        Self {
            level,
            config,
            logical: HashMap::new(),
            visual: HashMap::new(),
            stats: WorldStats::default(),
            scratch: Vec::new(),
        }
    }

    pub fn level(&self) -> &LevelDescriptor {
        &self.level
    }

    pub fn config(&self) -> StreamingConfig {
        self.config
    }

    pub fn stats(&self) -> WorldStats {
        self.stats
    }

    pub fn logical_len(&self) -> usize {
        self.logical.len()
    }

    pub fn visual_len(&self) -> usize {
        self.visual.len()
    }

    pub fn is_cached(&self, coord: ChunkCoord) -> bool {
        self.logical.contains_key(&coord)
    }

    pub fn is_realized(&self, coord: ChunkCoord) -> bool {
        self.visual.contains_key(&coord)
    }

    pub fn cached_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.logical.keys().copied()
    }

    pub fn realized_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.visual.keys().copied()
    }

    /// chunk the given world position belongs to under the active level
    pub fn chunk_at(&self, world_x: f32, world_z: f32) -> ChunkCoord {
        ChunkCoord::containing(world_x, world_z, self.level.chunk_size())
    }

    /* ---------- logical tier ---------- */

    pub fn ensure_logical(&mut self, coord: ChunkCoord) -> &ChunkData {
        let level = &self.level;
        let stats = &mut self.stats;
        self.logical.entry(coord).or_insert_with(|| {
            stats.generated += 1;
            trace!("generated chunk ({}, {})", coord.x, coord.z);
            level.generate_chunk(coord)
        })
    }

    /* ---------- visual tier ---------- */

    /// Returns `true` when the chunk was realized by this call.
    pub fn ensure_visual<R>(&mut self, coord: ChunkCoord, realizer: &mut R) -> bool
    where
        R: ChunkRealizer<Handle = H>,
    {
        if self.visual.contains_key(&coord) {
            return false;
        }
        self.ensure_logical(coord);
        let Some(chunk) = self.logical.get(&coord) else {
            return false;
        };
        let handle = realizer.realize(coord, chunk, &self.level);
        self.visual.insert(coord, handle);
        self.stats.realized += 1;
        debug!("realized chunk ({}, {})", coord.x, coord.z);
        true
    }

    /// Returns `true` when something was released.
    pub fn drop_visual<R>(&mut self, coord: ChunkCoord, realizer: &mut R) -> bool
    where
        R: ChunkRealizer<Handle = H>,
    {
        let Some(handle) = self.visual.remove(&coord) else {
            return false;
        };
        realizer.release(handle);
        self.stats.released += 1;
        debug!("released chunk ({}, {})", coord.x, coord.z);
        true
    }

    /* ---------- streaming ---------- */

    pub fn refresh<R>(&mut self, player_chunk: ChunkCoord, realizer: &mut R)
    where
        R: ChunkRealizer<Handle = H>,
    {
        let render = self.config.render_radius;
        for z in player_chunk.z - render..=player_chunk.z + render {
            for x in player_chunk.x - render..=player_chunk.x + render {
                self.ensure_visual(ChunkCoord::new(x, z), realizer);
            }
        }

        let mut stale = std::mem::take(&mut self.scratch);
        stale.extend(
            self.visual
                .keys()
                .copied()
                .filter(|c| c.chebyshev(player_chunk) > render),
        );
        for coord in stale.drain(..) {
            self.drop_visual(coord, realizer);
        }
        self.scratch = stale;

        let keep = self.config.keep_radius;
        let before = self.logical.len();
        self.logical.retain(|c, _| c.chebyshev(player_chunk) <= keep);
        self.stats.evicted += (before - self.logical.len()) as u64;
    }

    /// Drops everything belonging to the current level before swapping in
    /// the new descriptor.
    pub fn set_level<R>(&mut self, level: LevelDescriptor, realizer: &mut R)
    where
        R: ChunkRealizer<Handle = H>,
    {
        let released = self.visual.len();
        for (_, handle) in self.visual.drain() {
            realizer.release(handle);
        }
        self.stats.released += released as u64;
        self.stats.evicted += self.logical.len() as u64;
        self.logical.clear();

        info!(
            "level change: {} -> {} (seed {}), released {} chunks",
            self.level.name(),
            level.name(),
            level.seed(),
            released
        );
        self.level = level;
    }

    /* ---------- collision ---------- */

    /// Wall test at a world position. Reads through the logical cache, so a
    /// miss generates the chunk.
    pub fn is_solid_at(&mut self, world_x: f32, world_z: f32) -> bool {
        let size = self.level.chunk_size();
        let coord = ChunkCoord::containing(world_x, world_z, size);
        let chunk = self.ensure_logical(coord);

        let cell = size / chunk.n() as f32;
        let local_x = world_x - coord.x as f32 * size + size / 2.0;
        let local_z = world_z - coord.z as f32 * size + size / 2.0;

        let tile_x = (local_x / cell).floor() as i64;
        let tile_z = (local_z / cell).floor() as i64;
        chunk.is_solid_tile(tile_x, tile_z)
    }
}
