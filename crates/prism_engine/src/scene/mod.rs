//! Scene graph
//!
//! Nodes, bounding volumes and the scene collection the frame renderer
//! traverses.

pub mod bounds;
pub mod graph;
pub mod hud;
pub mod node;
pub mod text;

pub use bounds::AABB;
pub use graph::{Scene, SortOrder};
pub use hud::TimeDisplay;
pub use node::{MeshNode, NodeData, PhysicsBody, SceneNode, TransformMatrices};
pub use text::{FontAtlas, Glyph, TextNode};
