//! first‑person player: input gathering, movement & circle‑vs‑grid collision
//!
//! The player never touches the world directly. Movement takes a wall
//! predicate `(x, z) -> bool` and nothing else.

use bevy::input::mouse::MouseMotion;
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

use crate::constants::*;
use crate::streaming::MazeWorld;

/* ===========================================================
   state
   =========================================================== */
#[derive(Component, Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub position: Vec3,
    pub vertical_velocity: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub grounded: bool,
    pub crouching: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            vertical_velocity: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            grounded: false,
            crouching: false,
        }
    }
}

/// where the player stands and looks; what a return door restores
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

/// One frame of input, decoupled from any windowing API.
#[derive(Resource, Clone, Debug, Default, PartialEq)]
pub struct InputState {
    /// +1 forward, -1 back
    pub forward: f32,
    /// +1 right, -1 left
    pub strafe: f32,
    pub sprint: bool,
    pub jump: bool,
    pub toggle_crouch: bool,
    /// pointer motion in pixels since last frame
    pub look: Vec2,
}

/* ===========================================================
   collision
   =========================================================== */
/// eight probes around the player circle
pub fn collides(x: f32, z: f32, is_solid: &mut impl FnMut(f32, f32) -> bool) -> bool {
    const R: f32 = PLAYER_RADIUS;
    const D: f32 = PLAYER_RADIUS * DIAGONAL_PROBE;
    const PROBES: [(f32, f32); 8] = [
        (R, 0.0),
        (-R, 0.0),
        (0.0, R),
        (0.0, -R),
        (D, D),
        (-D, D),
        (D, -D),
        (-D, -D),
    ];
    PROBES.iter().any(|&(ox, oz)| is_solid(x + ox, z + oz))
}

/* ===========================================================
   movement
   =========================================================== */
impl PlayerState {
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    pub fn set_pose(&mut self, pose: Pose) {
        self.position = pose.position;
        self.yaw = pose.yaw;
        self.pitch = pose.pitch;
        self.vertical_velocity = 0.0;
    }

    /// camera rotation; yaw about +Y, then pitch
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn look(&mut self, delta: Vec2) {
        self.yaw -= delta.x * LOOK_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * LOOK_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn update(
        &mut self,
        input: &InputState,
        dt: f32,
        mut is_solid: impl FnMut(f32, f32) -> bool,
    ) {
        let dt = dt.min(MAX_FRAME_DT);

        if input.toggle_crouch {
            self.crouching = !self.crouching;
        }
        self.look(input.look);

        /* ---- horizontal ---- */
        let speed = if input.sprint { SPRINT_SPEED } else { WALK_SPEED }
            * if self.crouching { CROUCH_FACTOR } else { 1.0 };

        // yaw 0 looks down -Z
        let (sin, cos) = self.yaw.sin_cos();
        let dx = (input.strafe * cos - input.forward * sin) * speed * dt;
        let dz = (-input.forward * cos - input.strafe * sin) * speed * dt;
        self.try_move(dx, dz, &mut is_solid);

        /* ---- gravity & jump ---- */
        self.vertical_velocity -= GRAVITY * dt;
        self.position.y += self.vertical_velocity * dt;

        let eye = if self.crouching { CROUCH_HEIGHT } else { EYE_HEIGHT };
        if self.position.y < eye {
            self.position.y = eye;
            self.vertical_velocity = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }

        if self.grounded && input.jump {
            self.vertical_velocity = JUMP_SPEED;
            self.grounded = false;
        }
    }

    /// X then Z, so a blocked axis still lets the other one slide
    fn try_move(&mut self, dx: f32, dz: f32, is_solid: &mut impl FnMut(f32, f32) -> bool) {
        let nx = self.position.x + dx;
        if !collides(nx, self.position.z, is_solid) {
            self.position.x = nx;
        }
        let nz = self.position.z + dz;
        if !collides(self.position.x, nz, is_solid) {
            self.position.z = nz;
        }
    }
}

/* ===========================================================
   input (WASD / Shift / Space / C + pointer lock)
   =========================================================== */
#[inline]
fn axis(keys: &ButtonInput<KeyCode>, positive: KeyCode, negative: KeyCode) -> f32 {
    keys.pressed(positive) as i32 as f32 - keys.pressed(negative) as i32 as f32
}

pub fn gather_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut window_q: Query<&mut Window, With<PrimaryWindow>>,
    mut input: ResMut<InputState>,
) {
    let look: Vec2 = motion.read().map(|m| m.delta).sum();
    let Ok(mut window) = window_q.get_single_mut() else { return };

    if buttons.just_pressed(MouseButton::Left) {
        window.cursor_options.grab_mode = CursorGrabMode::Locked;
        window.cursor_options.visible = false;
    }
    if keys.just_pressed(KeyCode::Escape) {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }
    let locked = window.cursor_options.grab_mode != CursorGrabMode::None;

    *input = InputState {
        forward: axis(&keys, KeyCode::KeyW, KeyCode::KeyS),
        strafe: axis(&keys, KeyCode::KeyD, KeyCode::KeyA),
        sprint: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        jump: keys.pressed(KeyCode::Space),
        toggle_crouch: keys.just_pressed(KeyCode::KeyC),
        look: if locked { look } else { Vec2::ZERO },
    };
}

/* ===========================================================
   movement & collision against the streamed world
   =========================================================== */
pub fn player_movement_system(
    time: Res<Time>,
    input: Res<InputState>,
    mut world: ResMut<MazeWorld>,
    mut q: Query<&mut PlayerState>,
) {
    let Ok(mut player) = q.get_single_mut() else { return };
    player.update(&input, time.delta_secs(), |x, z| world.is_solid_at(x, z));
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn open(_: f32, _: f32) -> bool {
        false
    }

    fn forward() -> InputState {
        InputState {
            forward: 1.0,
            ..default()
        }
    }

    #[test]
    fn walks_down_negative_z_at_zero_yaw() {
        let mut p = PlayerState::default();
        p.update(&forward(), DT, open);
        assert!(p.position.x.abs() < 1e-6);
        assert!((p.position.z + WALK_SPEED * DT).abs() < 1e-5);
    }

    #[test]
    fn sprint_and_crouch_scale_speed() {
        let mut sprint = PlayerState::default();
        sprint.update(&InputState { sprint: true, ..forward() }, DT, open);
        assert!((sprint.position.z + SPRINT_SPEED * DT).abs() < 1e-5);

        let mut crouch = PlayerState::default();
        crouch.update(&InputState { toggle_crouch: true, ..forward() }, DT, open);
        assert!(crouch.crouching);
        assert!((crouch.position.z + WALK_SPEED * CROUCH_FACTOR * DT).abs() < 1e-5);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut p = PlayerState::default();
        p.update(&forward(), 1.0, open);
        assert!((p.position.z + WALK_SPEED * MAX_FRAME_DT).abs() < 1e-5);
    }

    #[test]
    fn wall_stops_the_player_short_of_its_radius() {
        let wall = |x: f32, _: f32| x >= 1.0;
        let mut p = PlayerState::default();
        let right = InputState {
            strafe: 1.0,
            ..default()
        };
        for _ in 0..120 {
            p.update(&right, DT, wall);
        }
        assert!(p.position.x < 1.0 - PLAYER_RADIUS);
        assert!(p.position.x > 1.0 - PLAYER_RADIUS - WALK_SPEED * DT);
    }

    #[test]
    fn blocked_axis_still_slides_along_the_other() {
        let wall = |x: f32, _: f32| x >= 0.5;
        let mut p = PlayerState {
            position: Vec3::new(0.2, EYE_HEIGHT, 0.0),
            ..default()
        };
        let diagonal = InputState {
            forward: 1.0,
            strafe: 1.0,
            ..default()
        };
        for _ in 0..30 {
            p.update(&diagonal, DT, wall);
        }
        assert!(p.position.x + PLAYER_RADIUS < 0.5);
        assert!(p.position.z < -0.5);
    }

    #[test]
    fn collision_probes_eight_points() {
        let mut hits = Vec::new();
        let mut record = |x: f32, z: f32| {
            hits.push((x, z));
            false
        };
        assert!(!collides(0.0, 0.0, &mut record));
        assert_eq!(hits.len(), 8);
    }

    #[test]
    fn jump_only_from_the_ground_and_lands_again() {
        let mut p = PlayerState::default();
        p.update(&InputState::default(), DT, open);
        assert!(p.grounded);

        let jump = InputState {
            jump: true,
            ..default()
        };
        p.update(&jump, DT, open);
        assert_eq!(p.vertical_velocity, JUMP_SPEED);

        p.update(&InputState::default(), DT, open);
        assert!(!p.grounded);
        assert!(p.position.y > EYE_HEIGHT);

        // holding jump mid‑air does nothing
        let airborne_velocity = p.vertical_velocity;
        p.update(&jump, DT, open);
        assert!(p.vertical_velocity < airborne_velocity);

        for _ in 0..120 {
            p.update(&InputState::default(), DT, open);
        }
        assert!(p.grounded);
        assert_eq!(p.position.y, EYE_HEIGHT);
    }

    #[test]
    fn crouch_lowers_eye_height() {
        let mut p = PlayerState::default();
        p.update(
            &InputState {
                toggle_crouch: true,
                ..default()
            },
            DT,
            open,
        );
        for _ in 0..60 {
            p.update(&InputState::default(), DT, open);
        }
        assert!(p.grounded);
        assert_eq!(p.position.y, CROUCH_HEIGHT);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut p = PlayerState::default();
        p.look(Vec2::new(0.0, 10_000.0));
        assert_eq!(p.pitch, -PITCH_LIMIT);
        p.look(Vec2::new(0.0, -20_000.0));
        assert_eq!(p.pitch, PITCH_LIMIT);
        p.look(Vec2::new(500.0, 0.0));
        assert!((p.yaw + 1.0).abs() < 1e-6);
    }

    #[test]
    fn rotation_faces_negative_z_then_turns_right() {
        let mut p = PlayerState::default();
        let fwd = p.rotation() * Vec3::NEG_Z;
        assert!((fwd - Vec3::NEG_Z).length() < 1e-5);

        p.look(Vec2::new(100.0, 0.0));
        let fwd = p.rotation() * Vec3::NEG_Z;
        assert!(fwd.x > 0.0);

        // movement agrees with where the camera faces
        p.update(&forward(), DT, open);
        assert!(p.position.x > 0.0);
    }
}
