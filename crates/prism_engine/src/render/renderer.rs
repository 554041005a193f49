//! Frame renderer
//!
//! Owns the per-frame [`FrameContext`] and orchestrates a render pass over
//! a [`Scene`]: target selection, clear, global draw state, the camera
//! matrix pushes, depth sorting, the traversal with shader-switch
//! minimization, and state restoration afterwards.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::math::{Vec2, Vec4};
use crate::render::api::{CullMode, RenderDevice};
use crate::render::camera::Camera;
use crate::render::context::FrameContext;
use crate::render::RenderResult;
use crate::scene::graph::Scene;

/// Global draw mode applied to the whole pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawMode {
    /// Blending on, wireframe off
    Shaded,
    /// Wireframe on, blending off
    Wireframe,
    /// Wireframe and blending both on
    WireframeBlended,
}

impl DrawMode {
    /// Next mode in the cycle, wrapping back to shaded
    pub fn next(self) -> Self {
        match self {
            Self::Shaded => Self::Wireframe,
            Self::Wireframe => Self::WireframeBlended,
            Self::WireframeBlended => Self::Shaded,
        }
    }
}

/// Renderer configuration, loadable through [`Config`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Multisampling sample count; 1 disables multisampling
    pub msaa_samples: u32,
    /// Face culling mode
    pub cull_mode: CullMode,
    /// Initial draw mode
    pub draw_mode: DrawMode,
    /// Depth sort the scene every frame
    pub sorting: bool,
    /// Background clear color
    pub background_color: Vec4,
    /// Viewport size in pixels
    pub viewport: (u32, u32),
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            msaa_samples: 4,
            cull_mode: CullMode::Back,
            draw_mode: DrawMode::Shaded,
            sorting: true,
            background_color: Vec4::new(0.2, 0.2, 0.2, 1.0),
            viewport: (1680, 1050),
        }
    }
}

impl Config for RendererConfig {}

/// Orchestrates render passes over scenes.
///
/// Create with a [`RendererConfig`], call [`init`](Self::init) once to
/// establish global device state and the offscreen targets, then
/// [`render`](Self::render) every frame.
pub struct FrameRenderer {
    ctx: FrameContext,
    draw_mode: DrawMode,
    cull_mode: CullMode,
    msaa_samples: u32,
    viewport: (u32, u32),
    blending: bool,
    wireframe: bool,
    sorting: bool,
    initialized: bool,
}

impl FrameRenderer {
    /// Create a renderer from configuration
    pub fn new(config: &RendererConfig) -> Self {
        let mut ctx = FrameContext::new();
        ctx.bg_color = config.background_color;
        ctx.viewport_size = Vec2::new(config.viewport.0 as f32, config.viewport.1 as f32);

        let mut renderer = Self {
            ctx,
            draw_mode: config.draw_mode,
            cull_mode: config.cull_mode,
            msaa_samples: config.msaa_samples,
            viewport: config.viewport,
            blending: true,
            wireframe: false,
            sorting: config.sorting,
            initialized: false,
        };
        renderer.set_draw_mode(config.draw_mode);
        renderer
    }

    /// Establish default device state and create the render targets.
    ///
    /// Depth testing, face culling per the configured mode and
    /// multisampling when more than one sample is configured. The context
    /// stacks keep their identity baseline.
    pub fn init(&mut self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        device.set_depth_test(true);

        if self.cull_mode != CullMode::Disabled {
            device.set_cull_mode(self.cull_mode);
        }
        if self.msaa_samples > 1 {
            device.set_multisample(true);
        }

        self.ctx.main_target = Some(device.create_render_target(self.viewport, 1)?);
        self.ctx.msaa_target =
            Some(device.create_render_target(self.viewport, self.msaa_samples)?);
        self.initialized = true;

        info!(
            "renderer initialized: {}x{}, msaa {}, cull {:?}",
            self.viewport.0, self.viewport.1, self.msaa_samples, self.cull_mode
        );
        Ok(())
    }

    /// Render one frame of a scene from a camera.
    ///
    /// Traversal runs each root node's `logic`, then `draw` when visible.
    /// A node whose shader matches the previously bound one skips the
    /// activation; on an actual switch the per-frame light and time
    /// uniforms are re-uploaded. An empty scene is a valid no-op pass.
    pub fn render(&mut self, device: &mut dyn RenderDevice, scene: &mut Scene, camera: &Camera) {
        if scene.render_to_texture() {
            assert!(
                self.initialized,
                "offscreen render target used before init"
            );
            device.bind_render_target(self.ctx.main_target);
        } else {
            device.bind_render_target(None);
        }
        device.set_viewport(self.viewport);

        device.clear(self.ctx.bg_color);

        if self.blending {
            device.set_blend(true);
        }
        if self.wireframe {
            device.set_wireframe(true);
        }
        self.ctx.wireframe = self.wireframe;

        // Each traversal starts with no shader bound, so the first node
        // re-uploads the per-frame uniforms.
        self.ctx.reset_shader_tracking();

        let sorting = self.sorting;
        let projection = camera.projection_matrix();

        self.ctx.scoped_projection(projection, |ctx| {
            let view = ctx.view.top() * camera.view_matrix();
            ctx.scoped_view(view, |ctx| {
                ctx.camera_view = camera.clone();
                ctx.lights = scene.lights().to_vec();

                if scene.is_empty() {
                    return;
                }
                if sorting {
                    scene.sort();
                }

                for node in scene.nodes_mut() {
                    let shader = node
                        .data()
                        .material()
                        .shader()
                        .expect("node material has no shader bound");
                    ctx.activate_shader(device, shader);

                    node.logic(ctx);
                    if node.data().is_visible() {
                        node.draw(device, ctx);
                    }
                }
            });
        });

        if self.wireframe {
            device.set_wireframe(false);
        }
        if self.blending {
            device.set_blend(false);
        }

        debug!(
            "frame {} rendered, {} nodes",
            self.ctx.elapsed_frames,
            scene.len()
        );
    }

    /// Advance the context's frame timing by a frametime in milliseconds
    pub fn advance_time(&mut self, frametime: f32) {
        self.ctx.advance_time(frametime);
    }

    /// Set the draw mode, deriving the blend and wireframe toggles
    pub fn set_draw_mode(&mut self, draw_mode: DrawMode) -> DrawMode {
        self.draw_mode = draw_mode;
        match draw_mode {
            DrawMode::Shaded => {
                self.wireframe = false;
                self.blending = true;
            }
            DrawMode::Wireframe => {
                self.wireframe = true;
                self.blending = false;
            }
            DrawMode::WireframeBlended => {
                self.wireframe = true;
                self.blending = true;
            }
        }
        self.draw_mode
    }

    /// Step to the next draw mode in the cycle
    pub fn cycle_draw_mode(&mut self) -> DrawMode {
        self.set_draw_mode(self.draw_mode.next())
    }

    /// Current draw mode
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Enable or disable per-frame depth sorting
    pub fn set_sorting(&mut self, sorting: bool) {
        self.sorting = sorting;
    }

    /// The per-frame context
    pub fn context(&self) -> &FrameContext {
        &self.ctx
    }

    /// Mutable access to the per-frame context
    pub fn context_mut(&mut self) -> &mut FrameContext {
        &mut self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::backends::recording::{DeviceCall, RecordingDevice};
    use crate::render::material::Material;
    use crate::render::mesh::GeometryData;
    use crate::render::api::ShaderHandle;
    use crate::render::lighting::Light;
    use crate::scene::node::{MeshNode, SceneNode};

    fn quad_geometry() -> GeometryData {
        GeometryData {
            positions: vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            normals: vec![Vec3::new(0.0, 0.0, 1.0); 4],
            texcoords: vec![Vec2::zeros(); 4],
            indices: vec![0, 1, 2, 0, 2, 3],
            ..GeometryData::default()
        }
    }

    fn node_with_shader(device: &mut RecordingDevice, shader: ShaderHandle, z: f32) -> MeshNode {
        let mut node = MeshNode::new(quad_geometry(), Material::with_shader(shader));
        node.data_mut().transform_mut().translation = Vec3::new(0.0, 0.0, z);
        node.init(device).unwrap();
        node
    }

    fn renderer() -> FrameRenderer {
        FrameRenderer::new(&RendererConfig::default())
    }

    #[test]
    fn empty_scene_is_a_valid_noop_pass() {
        let mut device = RecordingDevice::new();
        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();

        let mut scene = Scene::new();
        let camera = Camera::new();

        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);

        assert_eq!(device.draw_calls(), 0);
        assert_eq!(device.shader_activations(), 0);
        // The screen is still cleared.
        assert!(device
            .calls()
            .iter()
            .any(|call| matches!(call, DeviceCall::Clear(_))));
    }

    #[test]
    fn shared_shaders_activate_once_across_nodes() {
        let mut device = RecordingDevice::new();
        let shader_a = device.create_shader("lit").unwrap();
        let shader_b = device.create_shader("unlit").unwrap();

        let mut renderer = renderer();
        renderer.set_sorting(false);
        renderer.init(&mut device).unwrap();

        let mut scene = Scene::new();
        scene.add(Box::new(node_with_shader(&mut device, shader_a, 0.0)));
        scene.add(Box::new(node_with_shader(&mut device, shader_a, 1.0)));
        scene.add(Box::new(node_with_shader(&mut device, shader_b, 2.0)));
        scene.add_light(Light::ambient(Vec4::new(1.0, 1.0, 1.0, 1.0), 0.6));

        let camera = Camera::new();
        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);

        // Two nodes share a shader: exactly two activations, three draws.
        assert_eq!(device.shader_activations(), 2);
        assert_eq!(device.draw_calls(), 3);
        // Per-frame uniforms uploaded once per activation.
        assert_eq!(device.uniform_values("u_ambient.color").len(), 2);
        assert_eq!(device.uniform_values("u_elapsed_time").len(), 2);
    }

    #[test]
    fn shader_tracking_resets_between_frames() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader("lit").unwrap();

        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();

        let mut scene = Scene::new();
        scene.add(Box::new(node_with_shader(&mut device, shader, 0.0)));
        let camera = Camera::new();

        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);
        renderer.render(&mut device, &mut scene, &camera);

        // One activation per frame, not one total.
        assert_eq!(device.shader_activations(), 2);
    }

    #[test]
    fn sorted_render_draws_back_to_front() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader("lit").unwrap();

        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();

        let mut scene = Scene::new();
        let front = node_with_shader(&mut device, shader, 5.0);
        let back = node_with_shader(&mut device, shader, -5.0);
        let front_mesh = front.data().mesh().unwrap();
        let back_mesh = back.data().mesh().unwrap();
        scene.add(Box::new(front));
        scene.add(Box::new(back));

        let camera = Camera::new();
        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);

        let draws: Vec<_> = device
            .calls()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::DrawIndexed(mesh, _, _) => Some(*mesh),
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![back_mesh, front_mesh]);
    }

    #[test]
    fn matrix_stacks_return_to_baseline_after_a_frame() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader("lit").unwrap();

        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();

        let mut scene = Scene::new();
        let mut locked = node_with_shader(&mut device, shader, 0.0);
        locked.data_mut().set_camera_translated(false);
        scene.add(Box::new(locked));
        scene.add(Box::new(node_with_shader(&mut device, shader, 1.0)));

        let camera = Camera::new();
        renderer.render(&mut device, &mut scene, &camera);

        let ctx = renderer.context();
        assert_eq!(ctx.model.depth(), 1);
        assert_eq!(ctx.view.depth(), 1);
        assert_eq!(ctx.projection.depth(), 1);
    }

    #[test]
    fn invisible_nodes_run_logic_but_skip_draw() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader("lit").unwrap();

        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();

        let mut scene = Scene::new();
        let mut node = node_with_shader(&mut device, shader, 0.0);
        node.data_mut().set_visible(false);
        node.set_logic(|data, _ctx| {
            data.transform_mut().translation.x += 1.0;
        });
        scene.add(Box::new(node));

        let camera = Camera::new();
        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);

        assert_eq!(device.draw_calls(), 0);
        assert_eq!(
            scene.nodes()[0].data().transform().translation.x,
            1.0
        );
    }

    #[test]
    fn render_to_texture_binds_the_offscreen_target() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader("lit").unwrap();

        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();
        let main_target = renderer.context().main_target;

        let mut scene = Scene::new();
        scene.add(Box::new(node_with_shader(&mut device, shader, 0.0)));
        scene.set_render_to_texture(true);

        let camera = Camera::new();
        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);

        assert_eq!(device.calls()[0], DeviceCall::BindRenderTarget(main_target));
    }

    #[test]
    #[should_panic(expected = "offscreen render target used before init")]
    fn offscreen_render_before_init_panics() {
        let mut device = RecordingDevice::new();
        let mut renderer = renderer();

        let mut scene = Scene::new();
        scene.set_render_to_texture(true);
        let camera = Camera::new();
        renderer.render(&mut device, &mut scene, &camera);
    }

    #[test]
    fn wireframe_draw_mode_toggles_polygon_mode_for_the_pass() {
        let mut device = RecordingDevice::new();
        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();
        renderer.set_draw_mode(DrawMode::Wireframe);

        let mut scene = Scene::new();
        let camera = Camera::new();
        device.clear_calls();
        renderer.render(&mut device, &mut scene, &camera);

        let calls = device.calls();
        assert!(calls.contains(&DeviceCall::SetWireframe(true)));
        assert_eq!(calls.last(), Some(&DeviceCall::SetWireframe(false)));
        // Blending stays off in plain wireframe mode.
        assert!(!calls.contains(&DeviceCall::SetBlend(true)));
    }

    #[test]
    fn draw_mode_cycles_through_all_modes() {
        let mut renderer = renderer();
        assert_eq!(renderer.draw_mode(), DrawMode::Shaded);
        assert_eq!(renderer.cycle_draw_mode(), DrawMode::Wireframe);
        assert_eq!(renderer.cycle_draw_mode(), DrawMode::WireframeBlended);
        assert_eq!(renderer.cycle_draw_mode(), DrawMode::Shaded);
    }

    #[test]
    fn init_establishes_global_state_and_targets() {
        let mut device = RecordingDevice::new();
        let mut renderer = renderer();
        renderer.init(&mut device).unwrap();

        let calls = device.calls();
        assert!(calls.contains(&DeviceCall::SetDepthTest(true)));
        assert!(calls.contains(&DeviceCall::SetCullMode(CullMode::Back)));
        assert!(calls.contains(&DeviceCall::SetMultisample(true)));
        assert!(renderer.context().main_target.is_some());
        assert!(renderer.context().msaa_target.is_some());
    }
}
