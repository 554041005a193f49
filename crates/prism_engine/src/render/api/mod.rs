//! Graphics device boundary

pub mod device;

pub use device::{
    CullMode, DeviceResult, MeshHandle, RenderDevice, ShaderHandle, TargetHandle, TextureHandle,
    UniformValue,
};
