//! Scene: the ordered collection of root nodes and lights

use log::debug;

use crate::render::lighting::Light;
use crate::scene::node::SceneNode;

/// Depth ordering policy for scene sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending sort key: back-to-front, required for correct alpha
    /// blending of potentially-transparent geometry. The default.
    #[default]
    Inverse,
    /// Descending sort key: front-to-back, for opaque early-out rendering
    Normal,
}

/// Ordered root nodes plus lights.
///
/// Every node is tagged with its current index in the sequence; removal
/// re-indexes all subsequent nodes so the stored index always matches the
/// actual position.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<Box<dyn SceneNode>>,
    lights: Vec<Light>,
    sort_order: SortOrder,
    render_to_texture: bool,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, storing and returning its index in the sequence
    pub fn add(&mut self, mut node: Box<dyn SceneNode>) -> usize {
        let index = self.nodes.len();
        node.data_mut().set_scene_index(Some(index));
        self.nodes.push(node);
        debug!("added node at scene index {index}");
        index
    }

    /// Remove and return the node at an index.
    ///
    /// Every node after it has its stored index decremented by one.
    pub fn remove(&mut self, index: usize) -> Box<dyn SceneNode> {
        let mut removed = self.nodes.remove(index);
        removed.data_mut().set_scene_index(None);
        for node in &mut self.nodes[index..] {
            let old = node
                .data()
                .scene_index()
                .expect("scene node is missing its index");
            node.data_mut().set_scene_index(Some(old - 1));
        }
        debug!("removed node at scene index {index}, {} remain", self.nodes.len());
        removed
    }

    /// Stable sort of the nodes by their depth key.
    ///
    /// Insertion sort: each node's insertion point among its already-sorted
    /// predecessors is found by binary search and the node is rotated into
    /// place. Stored indices are refreshed afterwards.
    pub fn sort(&mut self) {
        for i in 1..self.nodes.len() {
            let key = self.nodes[i].data().sort_key();
            let insert_at = match self.sort_order {
                SortOrder::Inverse => self.nodes[..i]
                    .partition_point(|node| node.data().sort_key() <= key),
                SortOrder::Normal => self.nodes[..i]
                    .partition_point(|node| node.data().sort_key() >= key),
            };
            self.nodes[insert_at..=i].rotate_right(1);
        }

        for (index, node) in self.nodes.iter_mut().enumerate() {
            node.data_mut().set_scene_index(Some(index));
        }
    }

    /// Set the depth ordering policy used by [`sort`](Self::sort)
    pub fn set_sort_order(&mut self, sort_order: SortOrder) {
        self.sort_order = sort_order;
    }

    /// Current depth ordering policy
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Clear all nodes and lights
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.lights.clear();
        debug!("scene reset");
    }

    /// Nodes in sequence order
    pub fn nodes(&self) -> &[Box<dyn SceneNode>] {
        &self.nodes
    }

    /// Mutable nodes in sequence order
    pub fn nodes_mut(&mut self) -> &mut [Box<dyn SceneNode>] {
        &mut self.nodes
    }

    /// Number of root nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the scene holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a light to the scene
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Lights in the scene
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Request rendering into the offscreen target instead of the visible
    /// framebuffer
    pub fn set_render_to_texture(&mut self, render_to_texture: bool) {
        self.render_to_texture = render_to_texture;
    }

    /// Does this scene render to the offscreen target?
    pub fn render_to_texture(&self) -> bool {
        self.render_to_texture
    }
}
