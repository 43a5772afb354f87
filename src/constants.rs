/// -------- streaming --------
pub const RENDER_RADIUS: i32 = 2;
pub const KEEP_RADIUS: i32   = 6;
pub const MAX_STREAMING_RADIUS: i32 = 16;
pub const RENDER_RADIUS_ENV_VAR: &str = "LIMINAL_RENDER_RADIUS";
pub const KEEP_RADIUS_ENV_VAR: &str   = "LIMINAL_KEEP_RADIUS";

/// starting seed for level 0 (overridable with `LIMINAL_SEED`)
pub const DEFAULT_LEVEL_SEED: u32 = 123_456;
pub const SEED_ENV_VAR: &str      = "LIMINAL_SEED";

/// -------- player phys --------
pub const PLAYER_RADIUS: f32   = 0.28;
pub const DIAGONAL_PROBE: f32  = 0.7;
pub const WALK_SPEED: f32      = 3.4;
pub const SPRINT_SPEED: f32    = 5.2;
pub const CROUCH_FACTOR: f32   = 0.55;
pub const GRAVITY: f32         = 12.0;
pub const JUMP_SPEED: f32      = 5.5;
pub const EYE_HEIGHT: f32      = 1.6;
pub const CROUCH_HEIGHT: f32   = 1.1;
pub const LOOK_SENSITIVITY: f32 = 0.002;
pub const PITCH_LIMIT: f32     = 1.4;
pub const MAX_FRAME_DT: f32    = 0.033;

/// -------- doors --------
pub const DOOR_REACH: f32          = 2.2;
pub const LINE_OF_SIGHT_STEP: f32  = 0.05;

/// -------- scene --------
pub const FOV_DEGREES: f32      = 75.0;
pub const FAR_PLANE: f32        = 250.0;
pub const FOG_START: f32        = 6.0;
pub const FOG_END: f32          = 35.0;
pub const AMBIENT_BRIGHTNESS: f32 = 300.0;
pub const CHUNK_LIGHT_INTENSITY: f32 = 150_000.0;
pub const CHUNK_LIGHT_RANGE: f32 = 1.6; // × chunk size
pub const DOOR_RGB: u32         = 0x7a4a2a;
pub const DOOR_FRAME_RGB: u32   = 0x2a2a2a;

/// -------- colour‑variation --------
pub const COLOR_NOISE_SCALE: f64       = 0.05;
pub const COLOR_VARIATION_LEVELS: usize = 4;
pub const COLOR_VARIATION_STRENGTH: f32 = 0.08;

/// -------- diagnostics --------
pub const STATS_LOG_INTERVAL: f32 = 1.0;
