//! Math utilities and types
//!
//! Provides fundamental math types for 3D rendering.

pub use nalgebra::{Matrix3, Matrix4, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Affine transform composed of translation, non-uniform scale and
/// per-axis euler rotation.
///
/// Rotation is stored in radians and applied in x, y, z order. The model
/// matrix composition order is fixed: translate, scale, rotate x, rotate y,
/// rotate z, each multiplied onto the right of the running matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Translation in world units
    pub translation: Vec3,

    /// Per-axis scale factors
    pub scale: Vec3,

    /// Per-axis rotation in radians
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Vec3::zeros(),
        }
    }
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only translation set
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Compute the model matrix: `T * S * Rx * Ry * Rz`
    pub fn model(&self) -> Mat4 {
        Mat4::new_translation(&self.translation)
            * Mat4::new_nonuniform_scaling(&self.scale)
            * Mat4::rotation_x(self.rotation.x)
            * Mat4::rotation_y(self.rotation.y)
            * Mat4::rotation_z(self.rotation.z)
    }

    /// Blend the translation toward `previous` by factor `t`.
    ///
    /// Only translation is interpolated: `translation * t + previous * (1 - t)`.
    /// Scale and rotation keep their current values. Physics runs on a fixed
    /// step while rendering does not, and only the translation moves between
    /// steps, so partial-frame smoothing applies to it alone.
    pub fn interpolate_from(&mut self, previous: &Transform, t: f32) {
        self.translation = self.translation * t + previous.translation * (1.0 - t);
    }

    /// Rotation in degrees
    pub fn rotation_deg(&self) -> Vec3 {
        self.rotation * constants::RAD_TO_DEG
    }

    /// Set rotation from degrees
    pub fn set_rotation_deg(&mut self, degrees: Vec3) {
        self.rotation = degrees * constants::DEG_TO_RAD;
    }

    /// Add a rotation given in degrees
    pub fn add_rotation_deg(&mut self, degrees: Vec3) {
        self.rotation += degrees * constants::DEG_TO_RAD;
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Create a right-handed perspective projection matrix
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Copy of this matrix with the translation column zeroed.
    ///
    /// Keeps the rotational basis while discarding position. Used to lock
    /// geometry to the camera orientation without following its position.
    fn without_translation(&self) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn without_translation(&self) -> Mat4 {
        self.fixed_view::<3, 3>(0, 0).into_owned().to_homogeneous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_transform_yields_identity_model() {
        let transform = Transform::identity();
        assert_relative_eq!(transform.model(), Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn model_applies_translation_then_scale_then_rotation() {
        let transform = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::new(2.0, 2.0, 2.0),
            rotation: Vec3::new(0.0, constants::HALF_PI, 0.0),
        };

        let expected = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0))
            * Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 2.0, 2.0))
            * Mat4::rotation_y(constants::HALF_PI);
        assert_relative_eq!(transform.model(), expected, epsilon = 1e-6);

        // A point on +x ends up along -z (rotated), doubled (scaled), then offset.
        let p = transform.model().transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-5);
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn interpolation_blends_translation_only() {
        let previous = Transform {
            translation: Vec3::new(0.0, 0.0, 0.0),
            scale: Vec3::new(1.0, 1.0, 1.0),
            rotation: Vec3::zeros(),
        };
        let mut current = Transform {
            translation: Vec3::new(10.0, 0.0, 0.0),
            scale: Vec3::new(3.0, 3.0, 3.0),
            rotation: Vec3::new(0.5, 0.0, 0.0),
        };

        current.interpolate_from(&previous, 0.25);
        assert_relative_eq!(current.translation.x, 2.5, epsilon = 1e-6);
        // Scale and rotation are untouched by interpolation.
        assert_relative_eq!(current.scale.x, 3.0);
        assert_relative_eq!(current.rotation.x, 0.5);
    }

    #[test]
    fn interpolation_endpoints() {
        let previous = Transform::from_translation(Vec3::new(-4.0, 1.0, 0.0));

        let mut at_one = Transform::from_translation(Vec3::new(8.0, 2.0, 0.0));
        at_one.interpolate_from(&previous, 1.0);
        assert_relative_eq!(at_one.translation, Vec3::new(8.0, 2.0, 0.0), epsilon = 1e-6);

        let mut at_zero = Transform::from_translation(Vec3::new(8.0, 2.0, 0.0));
        at_zero.interpolate_from(&previous, 0.0);
        assert_relative_eq!(at_zero.translation, Vec3::new(-4.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn rotation_degree_accessors_convert() {
        let mut transform = Transform::identity();
        transform.set_rotation_deg(Vec3::new(90.0, 180.0, 0.0));
        assert_relative_eq!(transform.rotation.x, constants::HALF_PI, epsilon = 1e-6);
        assert_relative_eq!(transform.rotation.y, constants::PI, epsilon = 1e-6);

        transform.add_rotation_deg(Vec3::new(90.0, 0.0, 0.0));
        assert_relative_eq!(transform.rotation_deg().x, 180.0, epsilon = 1e-4);
    }

    #[test]
    fn without_translation_keeps_basis() {
        let view = Mat4::look_at(
            Vec3::new(5.0, 3.0, 5.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let locked = view.without_translation();

        assert_relative_eq!(locked[(0, 3)], 0.0);
        assert_relative_eq!(locked[(1, 3)], 0.0);
        assert_relative_eq!(locked[(2, 3)], 0.0);
        assert_relative_eq!(locked[(3, 3)], 1.0);
        // Rotational part is unchanged.
        for row in 0..3 {
            for col in 0..3 {
                assert_relative_eq!(locked[(row, col)], view[(row, col)]);
            }
        }
    }
}
