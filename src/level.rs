//! level descriptors – everything needed to regenerate a level from its seed
//!
//! A descriptor is plain data. Swapping levels means swapping descriptors;
//! the generation logic itself lives in `generator.rs` and dispatches on
//! [`GenerationPolicy`].

use thiserror::Error;

use crate::generator::{generate_chunk, ChunkData};
use crate::rng::{rand_int, SeededStream};
use crate::world::ChunkCoord;

/* ===========================================================
   errors
   =========================================================== */
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("chunk size must be positive and finite, got {0}")]
    InvalidChunkSize(f32),

    #[error("wall height must be positive and finite, got {0}")]
    InvalidWallHeight(f32),

    #[error("grid resolution {n} cannot hold the spawn clearing and door margin")]
    GridTooSmall { n: usize },

    #[error("door chance must lie in [0, 1], got {0}")]
    InvalidDoorChance(f64),

    #[error("empty range {min}..={max} for {what}")]
    EmptyRange {
        what: &'static str,
        min: i32,
        max: i32,
    },
}

/* ===========================================================
   parameters
   =========================================================== */
/// 0xRRGGBB colours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub floor: u32,
    pub wall: u32,
    pub ceiling: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillPattern {
    /// isolated pillars scattered over the whole grid
    Cubes,
    /// walls snapped to a 3×4 lattice
    Blocks,
    /// pillars confined to the upper triangle (x > z)
    Triangles,
}

impl FillPattern {
    pub fn default_density(self) -> f64 {
        match self {
            FillPattern::Cubes => 0.25,
            FillPattern::Blocks => 0.7,
            FillPattern::Triangles => 0.35,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FillPattern::Cubes => "Cubes",
            FillPattern::Blocks => "Blocks",
            FillPattern::Triangles => "Triangles",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GenerationPolicy {
    /// random walks cut through a fully solid grid
    Corridor {
        cuts: (i32, i32),
        length: (i32, i32),
    },
    /// per‑cell random fill gated by a pattern predicate
    NoiseFill { pattern: FillPattern, density: f64 },
    /// empty room; a single return door at the centre of chunk (0,0)
    Pocket,
}

/// Tiles per chunk edge. `Varied` draws `base + rand_int(0, spread)` from the
/// chunk's own stream before anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridResolution {
    Fixed(usize),
    Varied { base: usize, spread: usize },
}

impl GridResolution {
    pub fn min(self) -> usize {
        match self {
            GridResolution::Fixed(n) => n,
            GridResolution::Varied { base, .. } => base,
        }
    }

    pub fn max(self) -> usize {
        match self {
            GridResolution::Fixed(n) => n,
            GridResolution::Varied { base, spread } => base + spread,
        }
    }

    pub(crate) fn resolve(self, stream: &mut SeededStream) -> usize {
        match self {
            GridResolution::Fixed(n) => n,
            GridResolution::Varied { base, spread } => {
                base + rand_int(stream, 0, spread as i32) as usize
            }
        }
    }
}

/// Always‑open square around the grid centre: rows/cols
/// `n/2 - before ..= n/2 + after`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clearing {
    pub before: usize,
    pub after: usize,
}

impl Clearing {
    pub fn span(self, n: usize) -> std::ops::RangeInclusive<usize> {
        let mid = n / 2;
        (mid - self.before)..=(mid + self.after)
    }

    fn fits(self, n: usize) -> bool {
        n / 2 >= self.before && n / 2 + self.after < n
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DoorRule {
    /// probability that a chunk tries to place a door at all
    pub chance: f64,
    /// sampling budget; exhausting it means "no door"
    pub attempts: u32,
    /// doors keep this many tiles away from the chunk edge
    pub margin: usize,
}

/* ===========================================================
   descriptor
   =========================================================== */
#[derive(Clone, Debug, PartialEq)]
pub struct LevelDescriptor {
    name: String,
    seed: u32,
    chunk_size: f32,
    wall_height: f32,
    palette: Palette,
    policy: GenerationPolicy,
    grid: GridResolution,
    clearing: Clearing,
    doors: Option<DoorRule>,
}

impl LevelDescriptor {
    pub fn builder(name: impl Into<String>, seed: u32) -> LevelBuilder {
        LevelBuilder {
            level: LevelDescriptor {
                name: name.into(),
                seed,
                chunk_size: 28.0,
                wall_height: 3.2,
                palette: Palette {
                    floor: 0x808080,
                    wall: 0xc0c0c0,
                    ceiling: 0x606060,
                },
                policy: GenerationPolicy::Pocket,
                grid: GridResolution::Fixed(16),
                clearing: Clearing { before: 2, after: 2 },
                doors: None,
            },
        }
    }

    /// The yellow corridor maze everyone starts in.
    pub fn level_zero(seed: u32) -> Self {
        LevelDescriptor {
            name: "Level 0".into(),
            seed,
            chunk_size: 28.0,
            wall_height: 3.2,
            palette: Palette {
                floor: 0xb8b08a,
                wall: 0xd8d0a8,
                ceiling: 0xcfc7a0,
            },
            policy: GenerationPolicy::Corridor {
                cuts: (4, 8),
                length: (6, 14),
            },
            grid: GridResolution::Fixed(18),
            clearing: Clearing { before: 2, after: 1 },
            doors: Some(DoorRule {
                chance: 0.08,
                attempts: 60,
                margin: 2,
            }),
        }
    }

    /// Fill pattern, wall height and palette are all drawn from `seed`, so
    /// the same seed always rebuilds the same level.
    pub fn random_liminal(seed: u32) -> Self {
        const PATTERNS: [FillPattern; 3] =
            [FillPattern::Cubes, FillPattern::Triangles, FillPattern::Blocks];

        let mut r = SeededStream::new(seed);
        let pattern = PATTERNS[rand_int(&mut r, 0, PATTERNS.len() as i32 - 1) as usize];
        let wall_height = 3.0 + r.next_f64() as f32 * 2.0;
        let floor = if r.chance(0.5) { 0x999999 } else { 0x2a2a2a };
        let wall = if r.chance(0.5) { 0xffffff } else { 0xcccccc };
        let ceiling = if r.chance(0.5) { 0x777777 } else { 0x111111 };

        LevelDescriptor {
            name: format!("Random {}", pattern.label()),
            seed,
            chunk_size: 30.0,
            wall_height,
            palette: Palette {
                floor,
                wall,
                ceiling,
            },
            policy: GenerationPolicy::NoiseFill {
                pattern,
                density: pattern.default_density(),
            },
            grid: GridResolution::Varied { base: 16, spread: 12 },
            clearing: Clearing { before: 2, after: 2 },
            doors: Some(DoorRule {
                chance: 0.04,
                attempts: 80,
                margin: 2,
            }),
        }
    }

    /// Dark empty room behind every door.
    pub fn pocket(seed: u32) -> Self {
        LevelDescriptor {
            name: "Pocket".into(),
            seed,
            chunk_size: 30.0,
            wall_height: 3.2,
            palette: Palette {
                floor: 0x101010,
                wall: 0x101010,
                ceiling: 0x050505,
            },
            policy: GenerationPolicy::Pocket,
            grid: GridResolution::Fixed(16),
            clearing: Clearing { before: 2, after: 2 },
            doors: None,
        }
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        if !(self.chunk_size.is_finite() && self.chunk_size > 0.0) {
            return Err(LevelError::InvalidChunkSize(self.chunk_size));
        }
        if !(self.wall_height.is_finite() && self.wall_height > 0.0) {
            return Err(LevelError::InvalidWallHeight(self.wall_height));
        }

        let n = self.grid.min();
        if n < 3 || !self.clearing.fits(n) {
            return Err(LevelError::GridTooSmall { n });
        }
        if let Some(rule) = self.doors {
            if !(0.0..=1.0).contains(&rule.chance) {
                return Err(LevelError::InvalidDoorChance(rule.chance));
            }
            if 2 * rule.margin >= n {
                return Err(LevelError::GridTooSmall { n });
            }
        }
        if let GenerationPolicy::Corridor { cuts, length } = self.policy {
            for (what, (min, max)) in [("corridor cuts", cuts), ("corridor length", length)] {
                if min < 0 || min > max {
                    return Err(LevelError::EmptyRange { what, min, max });
                }
            }
        }
        Ok(())
    }

    pub fn generate_chunk(&self, coord: ChunkCoord) -> ChunkData {
        generate_chunk(self, coord)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    pub fn wall_height(&self) -> f32 {
        self.wall_height
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn policy(&self) -> GenerationPolicy {
        self.policy
    }

    pub fn grid(&self) -> GridResolution {
        self.grid
    }

    pub fn clearing(&self) -> Clearing {
        self.clearing
    }

    pub fn door_rule(&self) -> Option<DoorRule> {
        self.doors
    }

    pub fn is_pocket(&self) -> bool {
        matches!(self.policy, GenerationPolicy::Pocket)
    }
}

/* ===========================================================
   builder for hand‑made levels
   =========================================================== */
pub struct LevelBuilder {
    level: LevelDescriptor,
}

impl LevelBuilder {
    pub fn chunk_size(mut self, size: f32) -> Self {
        self.level.chunk_size = size;
        self
    }

    pub fn wall_height(mut self, height: f32) -> Self {
        self.level.wall_height = height;
        self
    }

    pub fn palette(mut self, palette: Palette) -> Self {
        self.level.palette = palette;
        self
    }

    pub fn policy(mut self, policy: GenerationPolicy) -> Self {
        self.level.policy = policy;
        self
    }

    pub fn grid(mut self, grid: GridResolution) -> Self {
        self.level.grid = grid;
        self
    }

    pub fn clearing(mut self, clearing: Clearing) -> Self {
        self.level.clearing = clearing;
        self
    }

    pub fn doors(mut self, rule: DoorRule) -> Self {
        self.level.doors = Some(rule);
        self
    }

    pub fn build(self) -> Result<LevelDescriptor, LevelError> {
        self.level.validate()?;
        Ok(self.level)
    }
}
