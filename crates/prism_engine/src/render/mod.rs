//! Rendering system
//!
//! The per-frame draw pipeline: the frame context with its matrix stacks,
//! the camera, materials and lights, the uniform binding tables and the
//! [`FrameRenderer`] that orchestrates a render pass over a scene.
//!
//! All GPU work goes through the [`api::RenderDevice`] boundary; this module
//! never talks to a graphics API directly.

pub mod api;
pub mod backends;
pub mod camera;
pub mod context;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod renderer;
pub mod uniforms;

pub use api::{
    CullMode, MeshHandle, RenderDevice, ShaderHandle, TargetHandle, TextureHandle, UniformValue,
};
pub use camera::Camera;
pub use context::{FrameContext, MatrixStack};
pub use lighting::{Light, LightKind};
pub use material::Material;
pub use mesh::{ChannelData, GeometryData};
pub use renderer::{DrawMode, FrameRenderer, RendererConfig};
pub use uniforms::UniformMap;

use thiserror::Error;

/// Errors reported by the rendering system
#[derive(Debug, Error)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// GPU resource creation failed at the device boundary
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Geometry data handed to the device was malformed
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
