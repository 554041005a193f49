//! # Prism Engine
//!
//! Frame orchestration core of a realtime 3D engine: a depth-sorted scene
//! graph, a per-frame draw pipeline with balanced matrix stacks and
//! shader-switch minimization, and dynamic shader parameter binding.
//!
//! All GPU work happens behind the [`render::RenderDevice`] trait; the
//! engine itself owns no graphics API. The bundled recording backend makes
//! every frame inspectable, which is also how the engine tests itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_engine::prelude::*;
//! use prism_engine::render::backends::recording::RecordingDevice;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = RecordingDevice::new();
//!     let mut renderer = FrameRenderer::new(&RendererConfig::default());
//!     renderer.init(&mut device)?;
//!
//!     let mut scene = Scene::new();
//!     let shader = device.create_shader("lit")?;
//!     let mut cube = MeshNode::new(GeometryData::new(), Material::with_shader(shader));
//!     cube.init(&mut device)?;
//!     scene.add(Box::new(cube));
//!
//!     let camera = Camera::new();
//!     renderer.render(&mut device, &mut scene, &camera);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::Config,
        foundation::{
            animation::Scaler,
            math::{Mat3, Mat4, Transform, Vec2, Vec3, Vec4},
            time::FrameTimer,
        },
        render::{
            Camera, CullMode, DrawMode, FrameContext, FrameRenderer, GeometryData, Light,
            Material, RenderDevice, RendererConfig, UniformMap,
        },
        scene::{MeshNode, Scene, SceneNode, SortOrder, TextNode, TimeDisplay},
    };
}
