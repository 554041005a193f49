//! Per-frame rendering context
//!
//! The [`FrameContext`] carries everything the draw traversal needs: the
//! model, view and projection matrix stacks, the active camera view, the
//! light list, timing values and global draw toggles. It is owned by the
//! frame renderer and reused across frames.

use crate::foundation::math::{Mat4, Vec2, Vec4};
use crate::render::api::{RenderDevice, ShaderHandle, TargetHandle, UniformValue};
use crate::render::camera::Camera;
use crate::render::lighting::{Light, LightKind};

/// Frametime multiplier normalizing to a 60 fps step in milliseconds
pub const FRAMETIME_MULT: f32 = (1.0 / 60.0) * 1000.0;

/// Stack of matrices with balanced push/pop discipline.
///
/// The baseline identity pushed at init is never popped; the scoped helpers
/// on [`FrameContext`] are the only way traversal code pushes, so the depth
/// mechanically returns to baseline after every frame.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Mat4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    /// Create a stack holding a single identity matrix
    pub fn new() -> Self {
        Self {
            stack: vec![Mat4::identity()],
        }
    }

    /// Push a copy of the current top
    pub fn push(&mut self) {
        let top = self.top();
        self.stack.push(top);
    }

    /// Pop the top matrix; the baseline entry stays
    pub fn pop(&mut self) {
        assert!(self.stack.len() > 1, "matrix stack underflow");
        self.stack.pop();
    }

    /// Current top matrix
    pub fn top(&self) -> Mat4 {
        *self.stack.last().expect("matrix stack is never empty")
    }

    /// Replace the current top matrix
    pub fn set_top(&mut self, matrix: Mat4) {
        *self.stack.last_mut().expect("matrix stack is never empty") = matrix;
    }

    /// Number of matrices on the stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Per-frame transient state shared across the draw traversal
pub struct FrameContext {
    /// Model matrix stack
    pub model: MatrixStack,
    /// View matrix stack
    pub view: MatrixStack,
    /// Projection matrix stack
    pub projection: MatrixStack,

    /// Camera view for the frame, recorded by the renderer so nodes can
    /// reach camera-derived matrices without owning the camera
    pub camera_view: Camera,
    /// Lights active for the frame, copied from the scene
    pub lights: Vec<Light>,

    /// Elapsed time since the context began, in milliseconds
    pub elapsed_time: f32,
    /// Elapsed frames since the context began
    pub elapsed_frames: u64,
    /// Frametime of the last frame in milliseconds
    pub frametime: f32,
    /// Interpolation factor between the previous and current physics state
    pub transform_interpolation: f32,

    /// Background clear color
    pub bg_color: Vec4,
    /// Viewport size in pixels
    pub viewport_size: Vec2,
    /// Force wireframe drawing for every node this frame
    pub wireframe: bool,

    /// Main offscreen render target, created at renderer init
    pub main_target: Option<TargetHandle>,
    /// Multisampled render target, created at renderer init
    pub msaa_target: Option<TargetHandle>,

    // Shader bound during the current traversal, for switch minimization.
    bound_shader: Option<ShaderHandle>,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameContext {
    /// Create a fresh context with identity stacks and default state
    pub fn new() -> Self {
        Self {
            model: MatrixStack::new(),
            view: MatrixStack::new(),
            projection: MatrixStack::new(),
            camera_view: Camera::new(),
            lights: Vec::new(),
            elapsed_time: 0.0,
            elapsed_frames: 0,
            frametime: 0.0,
            transform_interpolation: 0.0,
            bg_color: Vec4::new(0.2, 0.2, 0.2, 1.0),
            viewport_size: Vec2::new(0.0, 0.0),
            wireframe: false,
            main_target: None,
            msaa_target: None,
            bound_shader: None,
        }
    }

    /// Run `f` with a new view matrix pushed, popping on every exit path
    pub fn scoped_view<R>(&mut self, top: Mat4, f: impl FnOnce(&mut Self) -> R) -> R {
        self.view.push();
        self.view.set_top(top);
        let result = f(self);
        self.view.pop();
        result
    }

    /// Run `f` with a new model matrix pushed, popping on every exit path
    pub fn scoped_model<R>(&mut self, top: Mat4, f: impl FnOnce(&mut Self) -> R) -> R {
        self.model.push();
        self.model.set_top(top);
        let result = f(self);
        self.model.pop();
        result
    }

    /// Run `f` with a new projection matrix pushed, popping on every exit path
    pub fn scoped_projection<R>(&mut self, top: Mat4, f: impl FnOnce(&mut Self) -> R) -> R {
        self.projection.push();
        self.projection.set_top(top);
        let result = f(self);
        self.projection.pop();
        result
    }

    /// Advance frame timing by a frametime in milliseconds
    pub fn advance_time(&mut self, frametime: f32) {
        self.frametime = frametime;
        self.elapsed_time += frametime;
        self.elapsed_frames += 1;
    }

    /// Bind a shader if it differs from the currently bound one.
    ///
    /// On an actual switch the once-per-shader frame uniforms are uploaded:
    /// ambient and directional light parameters and the elapsed time.
    /// Consecutive draws with the same shader skip the activation entirely.
    pub fn activate_shader(&mut self, device: &mut dyn RenderDevice, shader: ShaderHandle) {
        if self.bound_shader == Some(shader) {
            return;
        }

        device.activate_shader(shader);
        self.upload_frame_uniforms(device, shader);
        self.bound_shader = Some(shader);
    }

    /// Forget the bound shader, forcing the next activation to upload
    pub fn reset_shader_tracking(&mut self) {
        self.bound_shader = None;
    }

    /// Shader bound during the current traversal, if any
    pub fn bound_shader(&self) -> Option<ShaderHandle> {
        self.bound_shader
    }

    fn upload_frame_uniforms(&self, device: &mut dyn RenderDevice, shader: ShaderHandle) {
        for light in &self.lights {
            match light.kind {
                LightKind::Ambient => {
                    // Usually one ambient light; a later one overrides.
                    device.set_uniform(
                        shader,
                        "u_ambient.color",
                        UniformValue::Vec3(light.color_rgb()),
                    );
                    device.set_uniform(
                        shader,
                        "u_ambient.intensity",
                        UniformValue::Float(light.intensity),
                    );
                }
                LightKind::Directional => {
                    device.set_uniform(shader, "u_light.pos", UniformValue::Vec3(light.pos));
                    device.set_uniform(
                        shader,
                        "u_light.color",
                        UniformValue::Vec3(light.color_rgb()),
                    );
                    device.set_uniform(
                        shader,
                        "u_light.intensity",
                        UniformValue::Float(light.intensity),
                    );
                    device.set_uniform(shader, "u_light.dir", UniformValue::Vec3(light.dir));
                }
                // Point lights carry no shader parameters yet.
                LightKind::Point => {}
            }
        }

        device.set_uniform(
            shader,
            "u_elapsed_time",
            UniformValue::Float(self.elapsed_time),
        );
    }
}
