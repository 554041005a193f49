//! Scene graph nodes
//!
//! [`NodeData`] is the state every drawable node carries: mesh, material,
//! transform with its previous snapshot, bounding box, physics record,
//! owned children and the uniform binding table. The [`SceneNode`] trait is
//! the small closed set of node behaviors dispatched during traversal; the
//! default `draw` runs the standard sequence over `NodeData`.

use std::rc::Rc;

use crate::foundation::math::{Mat3, Mat4, Transform, Vec3};
use crate::render::api::{MeshHandle, RenderDevice, UniformValue};
use crate::render::context::FrameContext;
use crate::render::material::Material;
use crate::render::mesh::{ChannelData, GeometryData};
use crate::render::uniforms::{uniform_cell, UniformCell, UniformMap};
use crate::render::RenderResult;
use crate::scene::bounds::AABB;

/// Passive physics state carried by a node.
///
/// These fields are integrated by the host application; the engine only
/// stores them and snapshots transforms for interpolation.
#[derive(Debug, Clone)]
pub struct PhysicsBody {
    /// Directional velocity
    pub velocity: Vec3,
    /// Directional force applied
    pub force: Vec3,
    /// Inverse of the mass; only the inverse is stored
    pub mass_inv: f32,
}

impl Default for PhysicsBody {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            force: Vec3::zeros(),
            mass_inv: 1.0,
        }
    }
}

impl PhysicsBody {
    /// Store the inverse of the given mass
    pub fn set_mass(&mut self, mass: f32) {
        self.mass_inv = 1.0 / mass;
    }

    /// Mass recovered from the stored inverse
    pub fn mass(&self) -> f32 {
        1.0 / self.mass_inv
    }
}

/// Transformation matrices computed for the latest draw
#[derive(Debug, Clone)]
pub struct TransformMatrices {
    /// Object to world
    pub model: Mat4,
    /// Object to camera space
    pub model_view: Mat4,
    /// Camera to clip space
    pub projection: Mat4,
    /// Full model-view-projection product
    pub model_view_projection: Mat4,
}

impl Default for TransformMatrices {
    fn default() -> Self {
        Self {
            model: Mat4::identity(),
            model_view: Mat4::identity(),
            projection: Mat4::identity(),
            model_view_projection: Mat4::identity(),
        }
    }
}

/// Shared state of one scene graph node
pub struct NodeData {
    /// Named shader parameter bindings, resolved once per draw
    pub uniforms: UniformMap,

    mesh: Option<MeshHandle>,
    material: Material,
    geometry: GeometryData,
    transform: Transform,
    prev_transform: Transform,
    aabb: AABB,
    physics_body: PhysicsBody,
    children: Vec<Box<dyn SceneNode>>,

    visible: bool,
    depth_tested: bool,
    camera_translated: bool,
    interpolate_transform: bool,

    scene_index: Option<usize>,
    sort_index: Option<f32>,
    draw_count: u32,

    matrices: TransformMatrices,
    // Cells behind the default uniform bindings; written by
    // calc_model_view_projection, read by the map at resolution time.
    mvp_cell: UniformCell<Mat4>,
    normal_cell: UniformCell<Mat3>,
}

impl NodeData {
    /// Create node state from geometry and a material.
    ///
    /// The mandatory model-view-projection binding is installed right away;
    /// [`install_default_bindings`](Self::install_default_bindings) rebuilds
    /// it together with the normal-matrix binding for lit meshes.
    pub fn new(geometry: GeometryData, material: Material) -> Self {
        let mut data = Self {
            uniforms: UniformMap::new(),
            mesh: None,
            material,
            geometry,
            transform: Transform::identity(),
            prev_transform: Transform::identity(),
            aabb: AABB::default(),
            physics_body: PhysicsBody::default(),
            children: Vec::new(),
            visible: true,
            depth_tested: true,
            camera_translated: true,
            interpolate_transform: false,
            scene_index: None,
            sort_index: None,
            draw_count: 0,
            matrices: TransformMatrices::default(),
            mvp_cell: uniform_cell(Mat4::identity()),
            normal_cell: uniform_cell(Mat3::identity()),
        };
        data.install_default_bindings();
        data
    }

    /// Clear the uniform map and rebuild the default bindings.
    ///
    /// Always installs the model-view-projection binding; adds the normal
    /// matrix when the material is lit and the geometry carries normals.
    pub fn install_default_bindings(&mut self) {
        self.uniforms.clear();
        self.uniforms
            .set_mat4_ref("u_model_view_projection_matrix", Rc::clone(&self.mvp_cell));
        if self.material.is_lit() && self.geometry.has_normals() {
            self.uniforms
                .set_mat3_ref("u_normal_matrix", Rc::clone(&self.normal_cell));
        }
    }

    /// Standard node draw sequence.
    ///
    /// Applies wireframe and depth-test state, handles the camera lock,
    /// re-uploads dirty color data, binds the texture, computes the render
    /// transform and matrices, resolves the uniform map, issues the draw and
    /// recurses into children, unwinding all state in reverse order.
    pub fn draw(&mut self, device: &mut dyn RenderDevice, ctx: &mut FrameContext) {
        if self.camera_translated {
            self.draw_in_view(device, ctx);
        } else {
            // Lock orientation to the camera without following its position.
            let locked = ctx.camera_view.view_matrix_no_translation();
            ctx.scoped_view(locked, |ctx| self.draw_in_view(device, ctx));
        }
    }

    fn draw_in_view(&mut self, device: &mut dyn RenderDevice, ctx: &mut FrameContext) {
        let shader = self
            .material
            .shader()
            .expect("node material has no shader bound");

        let wireframe = self.material.wireframe() || ctx.wireframe;
        if wireframe {
            device.set_wireframe(true);
        }

        let depth_disabled = !self.depth_tested;
        if depth_disabled {
            device.set_depth_test(false);
        }

        ctx.activate_shader(device, shader);

        // Material color changed; regenerate vertex colors and re-upload.
        if self.material.needs_update() {
            let color = self.material.color();
            self.geometry.colors.fill(color);
            if let Some(mesh) = self.mesh {
                device.bind_mesh(mesh);
                device.update_channel(mesh, ChannelData::Colors(&self.geometry.colors));
            }
            self.material.set_needs_update(false);
        }

        let texture = self.material.texture();
        if let Some(texture) = texture {
            device.set_uniform(shader, "u_diffuse", UniformValue::Int(0));
            device.bind_texture(texture, 0);
        }

        let mut render_transform = self.transform.clone();
        if self.interpolate_transform {
            render_transform.interpolate_from(&self.prev_transform, ctx.transform_interpolation);
        }

        self.calc_model_view_projection(ctx, &render_transform);

        self.uniforms
            .resolve_all(|name, value| device.set_uniform(shader, name, value));

        // A zero draw count is a silent no-op.
        if let Some(mesh) = self.mesh {
            if self.draw_count > 0 {
                device.draw_indexed(mesh, 0, self.draw_count);
            }
        }

        // Children receive the same context; their transforms are not
        // composed with this node's.
        for child in &mut self.children {
            child.draw(device, ctx);
        }

        if let Some(texture) = texture {
            device.unbind_texture(texture);
        }
        if depth_disabled {
            device.set_depth_test(true);
        }
        if wireframe {
            device.set_wireframe(false);
        }
    }

    /// Compute the transformation matrices for a draw.
    ///
    /// Multiplication order is significant: the model composes onto the
    /// model stack top, the view applies from the left, and the projection
    /// multiplies the result.
    pub fn calc_model_view_projection(&mut self, ctx: &FrameContext, transform: &Transform) {
        let model = transform.model() * ctx.model.top();
        let model_view = ctx.view.top() * model;
        let projection = ctx.projection.top();
        let model_view_projection = projection * model_view;

        self.matrices = TransformMatrices {
            model,
            model_view,
            projection,
            model_view_projection,
        };

        *self.mvp_cell.borrow_mut() = model_view_projection;
        *self.normal_cell.borrow_mut() = normal_matrix(&model);
    }

    /// Matrices computed by the latest draw
    pub fn matrices(&self) -> &TransformMatrices {
        &self.matrices
    }

    /// Depth key used by scene sorting: the override if set, else the
    /// transform's z translation
    pub fn sort_key(&self) -> f32 {
        self.sort_index.unwrap_or(self.transform.translation.z)
    }

    /// Override the depth key used by scene sorting
    pub fn set_sort_index(&mut self, sort_index: f32) {
        self.sort_index = Some(sort_index);
    }

    /// Mesh handle, once created
    pub fn mesh(&self) -> Option<MeshHandle> {
        self.mesh
    }

    /// Attach a created mesh handle
    pub fn set_mesh(&mut self, mesh: MeshHandle) {
        self.mesh = Some(mesh);
    }

    /// Number of indices issued per draw
    pub fn draw_count(&self) -> u32 {
        self.draw_count
    }

    /// Set the number of indices issued per draw
    pub fn set_draw_count(&mut self, draw_count: u32) {
        self.draw_count = draw_count;
    }

    /// Node material
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Mutable node material
    pub fn material_mut(&mut self) -> &mut Material {
        &mut self.material
    }

    /// Geometry record backing the mesh
    pub fn geometry(&self) -> &GeometryData {
        &self.geometry
    }

    /// Mutable geometry record
    pub fn geometry_mut(&mut self) -> &mut GeometryData {
        &mut self.geometry
    }

    /// Current transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable current transform
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Replace the current transform
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Snapshot the current transform as the previous one, for
    /// interpolation against the next physics step
    pub fn store_current_transform(&mut self) {
        self.prev_transform = self.transform.clone();
    }

    /// Previous transform snapshot
    pub fn prev_transform(&self) -> &Transform {
        &self.prev_transform
    }

    /// Bounding box
    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    /// Mutable bounding box
    pub fn aabb_mut(&mut self) -> &mut AABB {
        &mut self.aabb
    }

    /// Physics record
    pub fn physics_body(&self) -> &PhysicsBody {
        &self.physics_body
    }

    /// Mutable physics record
    pub fn physics_body_mut(&mut self) -> &mut PhysicsBody {
        &mut self.physics_body
    }

    /// Append an owned child node; children draw after this node in
    /// insertion order and share its lifetime
    pub fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    /// Owned child nodes
    pub fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    /// Mutable owned child nodes
    pub fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    /// Should this node be drawn?
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set whether this node is drawn
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Is this node depth tested?
    pub fn is_depth_tested(&self) -> bool {
        self.depth_tested
    }

    /// Set whether this node is depth tested
    pub fn set_depth_tested(&mut self, depth_tested: bool) {
        self.depth_tested = depth_tested;
    }

    /// Does this node follow the camera position, or is it locked to the
    /// camera orientation only?
    pub fn is_camera_translated(&self) -> bool {
        self.camera_translated
    }

    /// Set whether this node follows the camera position
    pub fn set_camera_translated(&mut self, camera_translated: bool) {
        self.camera_translated = camera_translated;
    }

    /// Is transform interpolation against the previous snapshot enabled?
    pub fn interpolates_transform(&self) -> bool {
        self.interpolate_transform
    }

    /// Enable or disable transform interpolation
    pub fn set_interpolate_transform(&mut self, interpolate: bool) {
        self.interpolate_transform = interpolate;
    }

    /// Index of this node in its owning scene, if added to one
    pub fn scene_index(&self) -> Option<usize> {
        self.scene_index
    }

    /// Record this node's index in its owning scene
    pub fn set_scene_index(&mut self, scene_index: Option<usize>) {
        self.scene_index = scene_index;
    }
}

/// Compute the inverse-transpose of the 3x3 submatrix of a model matrix
fn normal_matrix(model: &Mat4) -> Mat3 {
    let linear: Mat3 = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .unwrap_or_else(Mat3::identity)
        .transpose()
}

/// One drawable unit in the scene graph.
///
/// The set of node kinds is small and closed: plain mesh nodes, text nodes
/// and HUD nodes built from them. `logic` runs every frame before drawing;
/// `draw` defaults to the standard sequence over the node's data.
pub trait SceneNode {
    /// Shared node state
    fn data(&self) -> &NodeData;

    /// Mutable shared node state
    fn data_mut(&mut self) -> &mut NodeData;

    /// Create GPU resources for this node through the device
    fn init(&mut self, _device: &mut dyn RenderDevice) -> RenderResult<()> {
        Ok(())
    }

    /// Per-frame logic, run before drawing; a no-op by default
    fn logic(&mut self, _ctx: &FrameContext) {}

    /// Draw this node and its children
    fn draw(&mut self, device: &mut dyn RenderDevice, ctx: &mut FrameContext) {
        self.data_mut().draw(device, ctx);
    }
}

/// Per-frame logic closure attached to a mesh node
pub type NodeLogic = Box<dyn FnMut(&mut NodeData, &FrameContext)>;

/// Plain lit or unlit mesh node
pub struct MeshNode {
    data: NodeData,
    logic_fn: Option<NodeLogic>,
}

impl MeshNode {
    /// Create a mesh node from geometry and a material
    pub fn new(geometry: GeometryData, material: Material) -> Self {
        Self {
            data: NodeData::new(geometry, material),
            logic_fn: None,
        }
    }

    /// Attach a per-frame logic closure
    pub fn set_logic(&mut self, logic: impl FnMut(&mut NodeData, &FrameContext) + 'static) {
        self.logic_fn = Some(Box::new(logic));
    }
}

impl SceneNode for MeshNode {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    /// Generate missing color data, create the mesh and install the
    /// default uniform bindings
    fn init(&mut self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        let data = &mut self.data;

        if data.geometry.colors.is_empty() {
            let color = data.material.color();
            let len = data.geometry.positions.len();
            data.geometry.colors = vec![color; len];
            data.material.set_needs_update(false);
        }

        let mesh = device.create_mesh(&data.geometry)?;
        data.set_mesh(mesh);
        data.set_draw_count(data.geometry.index_count());
        data.install_default_bindings();

        log::debug!(
            "initialized mesh node, {} vertices, draw_count = {}",
            data.geometry.positions.len(),
            data.draw_count()
        );

        Ok(())
    }

    fn logic(&mut self, ctx: &FrameContext) {
        if let Some(logic) = &mut self.logic_fn {
            logic(&mut self.data, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Vec2, Vec4};
    use crate::render::api::ShaderHandle;
    use crate::render::backends::recording::{DeviceCall, RecordingDevice};
    use approx::assert_relative_eq;

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

    fn lit_node(device: &mut RecordingDevice) -> MeshNode {
        let shader = device.create_shader("lit").unwrap();
        let mut node = MeshNode::new(quad_geometry(), Material::with_shader(shader));
        node.init(device).unwrap();
        node
    }

    #[test]
    fn init_generates_color_data_from_material() {
        let mut device = RecordingDevice::new();
        let shader = device.create_shader("lit").unwrap();
        let mut material = Material::with_shader(shader);
        material.set_color(Vec4::new(0.0, 1.0, 0.0, 1.0));

        let mut node = MeshNode::new(quad_geometry(), material);
        node.init(&mut device).unwrap();

        let colors = &node.data().geometry().colors;
        assert_eq!(colors.len(), 4);
        assert_relative_eq!(colors[0], Vec4::new(0.0, 1.0, 0.0, 1.0));
        assert!(!node.data().material().needs_update());
        assert_eq!(node.data().draw_count(), 6);
    }

    #[test]
    fn draw_issues_one_indexed_draw_with_mvp() {
        let mut device = RecordingDevice::new();
        let mut node = lit_node(&mut device);
        let mut ctx = FrameContext::new();
        ctx.lights.clear();

        device.clear_calls();
        node.draw(&mut device, &mut ctx);

        assert_eq!(device.draw_calls(), 1);
        assert_eq!(
            device.uniform_values("u_model_view_projection_matrix").len(),
            1
        );
        // Lit geometry with normals also uploads the normal matrix.
        assert_eq!(device.uniform_values("u_normal_matrix").len(), 1);
    }

    #[test]
    fn zero_draw_count_skips_the_draw_call() {
        let mut device = RecordingDevice::new();
        let mut node = lit_node(&mut device);
        node.data_mut().set_draw_count(0);

        let mut ctx = FrameContext::new();
        device.clear_calls();
        node.draw(&mut device, &mut ctx);
        assert_eq!(device.draw_calls(), 0);
    }

    #[test]
    #[should_panic(expected = "node material has no shader bound")]
    fn drawing_without_shader_panics() {
        let mut device = RecordingDevice::new();
        let mut node = MeshNode::new(quad_geometry(), Material::new());
        let mut ctx = FrameContext::new();
        node.draw(&mut device, &mut ctx);
    }

    #[test]
    fn dirty_material_reuploads_color_channel() {
        let mut device = RecordingDevice::new();
        let mut node = lit_node(&mut device);
        node.data_mut()
            .material_mut()
            .set_color(Vec4::new(1.0, 0.0, 0.0, 1.0));

        let mut ctx = FrameContext::new();
        device.clear_calls();
        node.draw(&mut device, &mut ctx);

        let mesh = node.data().mesh().unwrap();
        assert!(device
            .calls()
            .contains(&DeviceCall::UpdateChannel(mesh, "colors", 4)));
        assert!(!node.data().material().needs_update());
        assert_relative_eq!(
            node.data().geometry().colors[3],
            Vec4::new(1.0, 0.0, 0.0, 1.0)
        );

        // Not dirty anymore; next draw does not upload.
        device.clear_calls();
        node.draw(&mut device, &mut ctx);
        assert!(!device
            .calls()
            .iter()
            .any(|call| matches!(call, DeviceCall::UpdateChannel(..))));
    }

    #[test]
    fn camera_locked_node_restores_view_stack() {
        let mut device = RecordingDevice::new();
        let mut node = lit_node(&mut device);
        node.data_mut().set_camera_translated(false);

        let mut ctx = FrameContext::new();
        let depth_before = ctx.view.depth();
        node.draw(&mut device, &mut ctx);
        assert_eq!(ctx.view.depth(), depth_before);
    }

    #[test]
    fn non_depth_tested_node_toggles_depth_state() {
        let mut device = RecordingDevice::new();
        let mut node = lit_node(&mut device);
        node.data_mut().set_depth_tested(false);

        let mut ctx = FrameContext::new();
        device.clear_calls();
        node.draw(&mut device, &mut ctx);

        let calls = device.calls();
        let off = calls
            .iter()
            .position(|c| *c == DeviceCall::SetDepthTest(false))
            .expect("depth test disabled");
        let on = calls
            .iter()
            .position(|c| *c == DeviceCall::SetDepthTest(true))
            .expect("depth test restored");
        assert!(off < on);
    }

    #[test]
    fn children_draw_after_parent_in_insertion_order() {
        let mut device = RecordingDevice::new();
        let mut parent = lit_node(&mut device);
        let child_a = lit_node(&mut device);
        let child_b = lit_node(&mut device);
        let parent_mesh = parent.data().mesh().unwrap();
        let mesh_a = child_a.data().mesh().unwrap();
        let mesh_b = child_b.data().mesh().unwrap();

        parent.data_mut().add_child(Box::new(child_a));
        parent.data_mut().add_child(Box::new(child_b));

        let mut ctx = FrameContext::new();
        device.clear_calls();
        parent.draw(&mut device, &mut ctx);

        let draws: Vec<MeshHandle> = device
            .calls()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::DrawIndexed(mesh, _, _) => Some(*mesh),
                _ => None,
            })
            .collect();
        assert_eq!(draws, vec![parent_mesh, mesh_a, mesh_b]);
    }

    #[test]
    fn interpolated_transform_blends_translation_for_render_only() {
        let mut device = RecordingDevice::new();
        let mut node = lit_node(&mut device);

        node.data_mut().transform_mut().translation = Vec3::new(0.0, 0.0, 0.0);
        node.data_mut().store_current_transform();
        node.data_mut().transform_mut().translation = Vec3::new(10.0, 0.0, 0.0);
        node.data_mut().set_interpolate_transform(true);

        let mut ctx = FrameContext::new();
        ctx.transform_interpolation = 0.5;
        node.draw(&mut device, &mut ctx);

        // Rendered at the halfway point.
        assert_relative_eq!(node.data().matrices().model[(0, 3)], 5.0, epsilon = 1e-6);
        // The stored transform itself is untouched.
        assert_relative_eq!(node.data().transform().translation.x, 10.0);
    }

    #[test]
    fn physics_body_stores_inverse_mass() {
        let mut body = PhysicsBody::default();
        body.set_mass(4.0);
        assert_relative_eq!(body.mass_inv, 0.25);
        assert_relative_eq!(body.mass(), 4.0);
    }
}
