//! Device abstraction for the rendering system
//!
//! This module defines the boundary between the frame orchestration core and
//! the underlying graphics API. The core drives everything through the
//! [`RenderDevice`] trait and opaque handles; resource allocation, shader
//! compilation and the actual GPU calls live behind it.

use crate::foundation::math::{Mat3, Mat4, Vec3, Vec4};
use crate::render::mesh::{ChannelData, GeometryData};
use crate::render::RenderError;

/// Result type for device operations
pub type DeviceResult<T> = Result<T, RenderError>;

/// Handle to a mesh resource stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Handle to a compiled shader program stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to a texture stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a render target (offscreen framebuffer) stored in the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle(pub u64);

/// A named shader parameter value of one of the supported kinds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar float
    Float(f32),
    /// Scalar integer
    Int(i32),
    /// Scalar boolean
    Bool(bool),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 3x3 matrix
    Mat3(Mat3),
    /// 4x4 matrix
    Mat4(Mat4),
}

/// Face culling mode applied during initialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CullMode {
    /// No face culling
    Disabled,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Graphics device boundary consumed by the frame orchestration core.
///
/// Creation operations are checked and may fail; per-draw operations act on
/// handles that were already created successfully and do not return errors.
pub trait RenderDevice {
    /// Create a mesh from a geometry record
    fn create_mesh(&mut self, geometry: &GeometryData) -> DeviceResult<MeshHandle>;

    /// Create a shader program, identified by name for diagnostics
    fn create_shader(&mut self, name: &str) -> DeviceResult<ShaderHandle>;

    /// Create a texture of the given pixel dimensions
    fn create_texture(&mut self, size: (u32, u32)) -> DeviceResult<TextureHandle>;

    /// Create an offscreen render target
    fn create_render_target(&mut self, size: (u32, u32), samples: u32) -> DeviceResult<TargetHandle>;

    /// Bind a mesh for subsequent update and draw operations
    fn bind_mesh(&mut self, mesh: MeshHandle);

    /// Replace the contents of one vertex attribute channel of a mesh
    fn update_channel(&mut self, mesh: MeshHandle, data: ChannelData<'_>);

    /// Issue an indexed draw for a range of a mesh's index buffer
    fn draw_indexed(&mut self, mesh: MeshHandle, first_index: u32, index_count: u32);

    /// Make a shader program the active one
    fn activate_shader(&mut self, shader: ShaderHandle);

    /// Set a named parameter on a shader program
    fn set_uniform(&mut self, shader: ShaderHandle, name: &str, value: UniformValue);

    /// Bind a texture to a numbered texture unit
    fn bind_texture(&mut self, texture: TextureHandle, unit: u32);

    /// Unbind a texture
    fn unbind_texture(&mut self, texture: TextureHandle);

    /// Bind a render target as the draw destination; `None` selects the
    /// visible framebuffer
    fn bind_render_target(&mut self, target: Option<TargetHandle>);

    /// Set the viewport in pixels
    fn set_viewport(&mut self, size: (u32, u32));

    /// Enable or disable depth testing
    fn set_depth_test(&mut self, enabled: bool);

    /// Enable or disable wireframe polygon mode
    fn set_wireframe(&mut self, enabled: bool);

    /// Enable or disable alpha blending
    fn set_blend(&mut self, enabled: bool);

    /// Set the face culling mode
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Enable or disable multisampled rasterization
    fn set_multisample(&mut self, enabled: bool);

    /// Clear color and depth of the bound target
    fn clear(&mut self, color: Vec4);
}
