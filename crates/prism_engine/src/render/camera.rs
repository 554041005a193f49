//! 3D perspective camera

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};

/// Default near plane distance in world units
pub const DEF_NEAR_PLANE: f32 = 0.01;
/// Default far plane distance in world units
pub const DEF_FAR_PLANE: f32 = 1000.0;
/// Default vertical field of view in degrees
pub const DEF_FOV: f32 = 60.0;
/// Default viewport aspect ratio
pub const DEF_ASPECT_RATIO: f32 = 1680.0 / 1050.0;

/// Camera maintaining position, orientation and projection parameters.
///
/// Orientation is tracked as yaw, pitch and roll in degrees. Pitch is
/// hard-clamped to [-89, 89] on every set so the derived front vector can
/// never flip over the poles. Roll is tracked but does not feed the front
/// vector formula; callers apply it through [`rotate`](Self::rotate).
#[derive(Debug, Clone)]
pub struct Camera {
    pos: Vec3,
    front: Vec3,
    up: Vec3,
    // Orientation angles in degrees.
    yaw: f32,
    pitch: f32,
    roll: f32,
    // Vertical field of view, stored in radians.
    fov: f32,
    near_plane: f32,
    far_plane: f32,
    aspect_ratio: f32,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            pos: Vec3::zeros(),
            front: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            roll: 0.0,
            fov: utils::deg_to_rad(DEF_FOV),
            near_plane: DEF_NEAR_PLANE,
            far_plane: DEF_FAR_PLANE,
            aspect_ratio: DEF_ASPECT_RATIO,
        };
        camera.calc_front();
        camera
    }
}

impl Camera {
    /// Create a camera with default orientation and projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the front vector from the current yaw and pitch.
    ///
    /// Spherical to cartesian conversion; roll is not part of the formula.
    /// Overwrites and returns the stored front vector.
    pub fn calc_front(&mut self) -> Vec3 {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);

        let dir = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );
        self.front = dir.normalize();
        self.front
    }

    /// Add a `(yaw, pitch, roll)` delta in degrees, then recompute and
    /// return the front vector
    pub fn inc_axis_rotation(&mut self, delta: Vec3) -> Vec3 {
        self.set_yaw(self.yaw + delta.x);
        self.set_pitch(self.pitch + delta.y);
        self.set_roll(self.roll + delta.z);
        self.calc_front()
    }

    /// Overwrite `(yaw, pitch, roll)` in degrees, then recompute and return
    /// the front vector
    pub fn set_axis_rotation(&mut self, rotation: Vec3) -> Vec3 {
        self.set_yaw(rotation.x);
        self.set_pitch(rotation.y);
        self.set_roll(rotation.z);
        self.calc_front()
    }

    /// Current `(yaw, pitch, roll)` in degrees
    pub fn axis_rotation(&self) -> Vec3 {
        Vec3::new(self.yaw, self.pitch, self.roll)
    }

    /// Rotate the front vector directly around an axis.
    ///
    /// This is the explicit roll application path; the amount is in degrees.
    pub fn rotate(&mut self, amount_deg: f32, axis: Vec3) {
        let rotation = Mat4::from_axis_angle(
            &nalgebra::Unit::new_normalize(axis),
            utils::deg_to_rad(amount_deg),
        );
        self.front = rotation.transform_vector(&self.front);
    }

    /// Move the camera position by a translation
    pub fn translate(&mut self, translation: Vec3) {
        self.pos += translation;
    }

    /// Move the camera back to the origin.
    ///
    /// When `reset_z_axis` is false only x and y are recentered.
    pub fn recenter(&mut self, reset_z_axis: bool) {
        let mut new_pos = Vec3::zeros();
        if !reset_z_axis {
            new_pos.z = self.pos.z;
        }
        self.pos = new_pos;
    }

    /// View matrix looking from the position along the front vector
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.pos, self.pos + self.front, self.up)
    }

    /// View matrix with the translation component zeroed.
    ///
    /// Same rotational basis as [`view_matrix`](Self::view_matrix); used to
    /// lock geometry like skyboxes and HUD elements to the camera
    /// orientation without following its position.
    pub fn view_matrix_no_translation(&self) -> Mat4 {
        self.view_matrix().without_translation()
    }

    /// Perspective projection matrix from fov, aspect ratio and planes
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect_ratio, self.near_plane, self.far_plane)
    }

    /// Set the yaw angle in degrees, unclamped
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    /// Yaw angle in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Set the pitch angle in degrees, clamped to [-89, 89]
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = utils::clamp(pitch, -89.0, 89.0);
    }

    /// Pitch angle in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Set the roll angle in degrees, unclamped
    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll;
    }

    /// Roll angle in degrees
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Set the camera position
    pub fn set_pos(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    /// Camera position
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    /// Overwrite the front vector directly
    pub fn set_front(&mut self, front: Vec3) {
        self.front = front;
    }

    /// Current front vector
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Set the up vector
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up;
    }

    /// Current up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Set position, front and up vectors at once
    pub fn set_vectors(&mut self, pos: Vec3, front: Vec3, up: Vec3) {
        self.pos = pos;
        self.front = front;
        self.up = up;
    }

    /// Set the vertical field of view in degrees.
    ///
    /// A fov outside (0, 180) is a construction bug, not a runtime
    /// condition.
    pub fn set_fov(&mut self, fov_deg: f32) {
        assert!(fov_deg > 0.0 && fov_deg < 180.0, "fov out of range: {fov_deg}");
        self.fov = utils::deg_to_rad(fov_deg);
    }

    /// Vertical field of view in degrees
    pub fn fov(&self) -> f32 {
        utils::rad_to_deg(self.fov)
    }

    /// Set the near plane distance; must stay positive
    pub fn set_near_plane(&mut self, near_plane: f32) {
        assert!(near_plane > 0.0, "near plane must be positive");
        self.near_plane = near_plane;
    }

    /// Near plane distance
    pub fn near_plane(&self) -> f32 {
        self.near_plane
    }

    /// Set the far plane distance; must stay beyond the near plane
    pub fn set_far_plane(&mut self, far_plane: f32) {
        assert!(far_plane > self.near_plane, "far plane must exceed near plane");
        self.far_plane = far_plane;
    }

    /// Far plane distance
    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    /// Set both clip planes at once
    pub fn set_planes(&mut self, near_plane: f32, far_plane: f32) {
        assert!(near_plane > 0.0, "near plane must be positive");
        assert!(far_plane > near_plane, "far plane must exceed near plane");
        self.near_plane = near_plane;
        self.far_plane = far_plane;
    }

    /// Set the viewport aspect ratio
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        assert!(aspect_ratio > 0.0, "aspect ratio must be positive");
        self.aspect_ratio = aspect_ratio;
    }

    /// Viewport aspect ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}
