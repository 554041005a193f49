//! Surface materials

use crate::foundation::math::Vec4;
use crate::render::api::{ShaderHandle, TextureHandle};

/// Material describing how a node's surface is drawn.
///
/// Carries the shader the node renders with, an optional texture, a base
/// color and draw flags. Changing the color marks the material dirty so the
/// owning node re-uploads its per-vertex color data on the next draw.
#[derive(Debug, Clone)]
pub struct Material {
    color: Vec4,
    wireframe: bool,
    lit: bool,
    textured: bool,
    needs_update: bool,
    texture: Option<TextureHandle>,
    shader: Option<ShaderHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            wireframe: false,
            lit: true,
            textured: false,
            needs_update: false,
            texture: None,
            shader: None,
        }
    }
}

impl Material {
    /// Create a default white, lit material with no shader bound
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a material bound to a shader
    pub fn with_shader(shader: ShaderHandle) -> Self {
        Self {
            shader: Some(shader),
            ..Self::default()
        }
    }

    /// Set the base color, marking the material dirty when it changes
    pub fn set_color(&mut self, color: Vec4) {
        if self.color != color {
            self.color = color;
            self.needs_update = true;
        }
    }

    /// Base RGBA color
    pub fn color(&self) -> Vec4 {
        self.color
    }

    /// Set the opacity (the color's alpha component)
    pub fn set_opacity(&mut self, opacity: f32) {
        self.color.w = opacity;
    }

    /// Opacity, read from the color's alpha component
    pub fn opacity(&self) -> f32 {
        self.color.w
    }

    /// Set whether this material draws as wireframe
    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.wireframe = wireframe;
    }

    /// Does this material draw as wireframe?
    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    /// Set whether lighting affects this material
    pub fn set_lit(&mut self, lit: bool) {
        self.lit = lit;
    }

    /// Does lighting affect this material?
    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Bind a shader to this material
    pub fn set_shader(&mut self, shader: ShaderHandle) {
        self.shader = Some(shader);
    }

    /// Shader this material renders with, if any bound
    pub fn shader(&self) -> Option<ShaderHandle> {
        self.shader
    }

    /// Attach a texture; the material becomes textured
    pub fn set_texture(&mut self, texture: TextureHandle) {
        self.texture = Some(texture);
        self.textured = true;
    }

    /// Attached texture, if any
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Is the material textured?
    pub fn is_textured(&self) -> bool {
        self.textured
    }

    /// Mark or clear the dirty flag for GPU color data
    pub fn set_needs_update(&mut self, needs_update: bool) {
        self.needs_update = needs_update;
    }

    /// Does GPU color data need re-uploading?
    pub fn needs_update(&self) -> bool {
        self.needs_update
    }
}
