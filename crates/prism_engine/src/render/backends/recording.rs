//! Recording render device
//!
//! A [`RenderDevice`] implementation that allocates sequential handles and
//! records every call into an inspectable command list. Backs the
//! end-to-end frame tests and headless demo runs; nothing ever reaches a
//! GPU.

use log::trace;

use crate::foundation::math::{Vec3, Vec4};
use crate::render::api::device::{
    CullMode, DeviceResult, MeshHandle, RenderDevice, ShaderHandle, TargetHandle, TextureHandle,
    UniformValue,
};
use crate::render::mesh::{ChannelData, GeometryData};
use crate::render::RenderError;

/// One recorded device call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// Mesh created with the given index count
    CreateMesh(MeshHandle, u32),
    /// Shader program created under a diagnostic name
    CreateShader(ShaderHandle, String),
    /// Texture created with pixel dimensions
    CreateTexture(TextureHandle, (u32, u32)),
    /// Offscreen render target created
    CreateRenderTarget(TargetHandle, (u32, u32), u32),
    /// Mesh bound for update/draw
    BindMesh(MeshHandle),
    /// One attribute channel replaced; records the channel kind and element count
    UpdateChannel(MeshHandle, &'static str, usize),
    /// Indexed draw over a range of a mesh's index buffer
    DrawIndexed(MeshHandle, u32, u32),
    /// Shader made active
    ActivateShader(ShaderHandle),
    /// Named parameter set on a shader
    SetUniform(ShaderHandle, String, UniformValue),
    /// Texture bound to a unit
    BindTexture(TextureHandle, u32),
    /// Texture unbound
    UnbindTexture(TextureHandle),
    /// Render target bound; `None` is the visible framebuffer
    BindRenderTarget(Option<TargetHandle>),
    /// Viewport set in pixels
    SetViewport((u32, u32)),
    /// Depth test toggled
    SetDepthTest(bool),
    /// Wireframe polygon mode toggled
    SetWireframe(bool),
    /// Alpha blending toggled
    SetBlend(bool),
    /// Cull mode set
    SetCullMode(CullMode),
    /// Multisampling toggled
    SetMultisample(bool),
    /// Color and depth cleared
    Clear(Vec4),
}

/// Render device that records its call stream.
///
/// Handles are sequential per resource type. The `fail_creation` switch
/// makes every subsequent create call fail, for exercising the checked
/// resource-acquisition path.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    next_mesh: u64,
    next_shader: u64,
    next_texture: u64,
    next_target: u64,
    fail_creation: bool,
}

impl RecordingDevice {
    /// Create an empty recording device
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent resource creation calls fail
    pub fn set_fail_creation(&mut self, fail: bool) {
        self.fail_creation = fail;
    }

    /// All recorded calls in order
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forget all recorded calls; handle counters keep running
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of shader activations recorded
    pub fn shader_activations(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::ActivateShader(_)))
            .count()
    }

    /// Number of indexed draw calls recorded
    pub fn draw_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DeviceCall::DrawIndexed(..)))
            .count()
    }

    /// Values recorded for a named uniform, in call order
    pub fn uniform_values(&self, wanted: &str) -> Vec<UniformValue> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DeviceCall::SetUniform(_, name, value) if name == wanted => Some(*value),
                _ => None,
            })
            .collect()
    }

    fn check_creation(&self, what: &str) -> DeviceResult<()> {
        if self.fail_creation {
            Err(RenderError::ResourceCreationFailed(what.to_owned()))
        } else {
            Ok(())
        }
    }
}

impl RenderDevice for RecordingDevice {
    fn create_mesh(&mut self, geometry: &GeometryData) -> DeviceResult<MeshHandle> {
        self.check_creation("mesh")?;
        if geometry.positions.is_empty() {
            return Err(RenderError::InvalidGeometry(
                "geometry has no positions".to_owned(),
            ));
        }

        let handle = MeshHandle(self.next_mesh);
        self.next_mesh += 1;
        self.calls
            .push(DeviceCall::CreateMesh(handle, geometry.index_count()));
        trace!(
            "created mesh {handle:?}, {} vertices, {} indices",
            geometry.positions.len(),
            geometry.index_count()
        );
        Ok(handle)
    }

    fn create_shader(&mut self, name: &str) -> DeviceResult<ShaderHandle> {
        self.check_creation("shader")?;
        let handle = ShaderHandle(self.next_shader);
        self.next_shader += 1;
        self.calls
            .push(DeviceCall::CreateShader(handle, name.to_owned()));
        trace!("created shader {handle:?} ({name})");
        Ok(handle)
    }

    fn create_texture(&mut self, size: (u32, u32)) -> DeviceResult<TextureHandle> {
        self.check_creation("texture")?;
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.calls.push(DeviceCall::CreateTexture(handle, size));
        Ok(handle)
    }

    fn create_render_target(
        &mut self,
        size: (u32, u32),
        samples: u32,
    ) -> DeviceResult<TargetHandle> {
        self.check_creation("render target")?;
        let handle = TargetHandle(self.next_target);
        self.next_target += 1;
        self.calls
            .push(DeviceCall::CreateRenderTarget(handle, size, samples));
        Ok(handle)
    }

    fn bind_mesh(&mut self, mesh: MeshHandle) {
        self.calls.push(DeviceCall::BindMesh(mesh));
    }

    fn update_channel(&mut self, mesh: MeshHandle, data: ChannelData<'_>) {
        let (kind, len) = match data {
            ChannelData::Positions(slice) => ("positions", slice.len()),
            ChannelData::Colors(slice) => ("colors", slice.len()),
            ChannelData::Normals(slice) => ("normals", slice.len()),
            ChannelData::Texcoords(slice) => ("texcoords", slice.len()),
            ChannelData::Indices(slice) => ("indices", slice.len()),
        };
        self.calls.push(DeviceCall::UpdateChannel(mesh, kind, len));
    }

    fn draw_indexed(&mut self, mesh: MeshHandle, first_index: u32, index_count: u32) {
        self.calls
            .push(DeviceCall::DrawIndexed(mesh, first_index, index_count));
    }

    fn activate_shader(&mut self, shader: ShaderHandle) {
        self.calls.push(DeviceCall::ActivateShader(shader));
    }

    fn set_uniform(&mut self, shader: ShaderHandle, name: &str, value: UniformValue) {
        self.calls
            .push(DeviceCall::SetUniform(shader, name.to_owned(), value));
    }

    fn bind_texture(&mut self, texture: TextureHandle, unit: u32) {
        self.calls.push(DeviceCall::BindTexture(texture, unit));
    }

    fn unbind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(DeviceCall::UnbindTexture(texture));
    }

    fn bind_render_target(&mut self, target: Option<TargetHandle>) {
        self.calls.push(DeviceCall::BindRenderTarget(target));
    }

    fn set_viewport(&mut self, size: (u32, u32)) {
        self.calls.push(DeviceCall::SetViewport(size));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(DeviceCall::SetDepthTest(enabled));
    }

    fn set_wireframe(&mut self, enabled: bool) {
        self.calls.push(DeviceCall::SetWireframe(enabled));
    }

    fn set_blend(&mut self, enabled: bool) {
        self.calls.push(DeviceCall::SetBlend(enabled));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.calls.push(DeviceCall::SetCullMode(mode));
    }

    fn set_multisample(&mut self, enabled: bool) {
        self.calls.push(DeviceCall::SetMultisample(enabled));
    }

    fn clear(&mut self, color: Vec4) {
        self.calls.push(DeviceCall::Clear(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> GeometryData {
        GeometryData {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            indices: vec![0, 1, 2],
            ..GeometryData::default()
        }
    }

    #[test]
    fn handles_are_sequential_per_type() {
        let mut device = RecordingDevice::new();
        let mesh_a = device.create_mesh(&triangle()).unwrap();
        let mesh_b = device.create_mesh(&triangle()).unwrap();
        let shader = device.create_shader("lit").unwrap();

        assert_eq!(mesh_a, MeshHandle(0));
        assert_eq!(mesh_b, MeshHandle(1));
        assert_eq!(shader, ShaderHandle(0));
    }

    #[test]
    fn empty_geometry_is_rejected() {
        let mut device = RecordingDevice::new();
        let result = device.create_mesh(&GeometryData::new());
        assert!(matches!(result, Err(RenderError::InvalidGeometry(_))));
    }

    #[test]
    fn forced_creation_failure_propagates() {
        let mut device = RecordingDevice::new();
        device.set_fail_creation(true);
        assert!(device.create_shader("lit").is_err());
        assert!(device.create_texture((4, 4)).is_err());
    }

    #[test]
    fn call_stream_is_ordered_and_countable() {
        let mut device = RecordingDevice::new();
        let mesh = device.create_mesh(&triangle()).unwrap();
        let shader = device.create_shader("lit").unwrap();

        device.activate_shader(shader);
        device.set_uniform(shader, "u_elapsed_time", UniformValue::Float(10.0));
        device.draw_indexed(mesh, 0, 3);
        device.draw_indexed(mesh, 0, 3);

        assert_eq!(device.shader_activations(), 1);
        assert_eq!(device.draw_calls(), 2);
        assert_eq!(
            device.uniform_values("u_elapsed_time"),
            vec![UniformValue::Float(10.0)]
        );
    }
}
