//! Light sources

use crate::foundation::math::{Vec3, Vec4};

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform light applied to everything
    Ambient,
    /// Parallel rays from a direction (like sunlight)
    Directional,
    /// Light radiating from a position
    Point,
}

/// Light source in a scene.
///
/// Point lights are accepted in a scene's light list but currently upload
/// no shader parameters.
#[derive(Debug, Clone)]
pub struct Light {
    /// Kind of light
    pub kind: LightKind,
    /// RGBA color; alpha is not uploaded
    pub color: Vec4,
    /// Direction for directional lights
    pub dir: Vec3,
    /// World position for directional and point lights
    pub pos: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            kind: LightKind::Ambient,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            dir: Vec3::new(0.0, 0.0, 1.0),
            pos: Vec3::zeros(),
            intensity: 1.0,
        }
    }
}

impl Light {
    /// Create an ambient light
    pub fn ambient(color: Vec4, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color,
            intensity,
            ..Self::default()
        }
    }

    /// Create a directional light
    pub fn directional(dir: Vec3, color: Vec4, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            color,
            dir,
            intensity,
            ..Self::default()
        }
    }

    /// Create a point light
    pub fn point(pos: Vec3, color: Vec4, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            pos,
            intensity,
            ..Self::default()
        }
    }

    /// Light color without the alpha component
    pub fn color_rgb(&self) -> Vec3 {
        self.color.xyz()
    }
}
