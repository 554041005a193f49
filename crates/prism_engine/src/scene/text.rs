//! Text rendering nodes
//!
//! A [`FontAtlas`] is a passive record built by the host application from
//! already-decoded font data: the atlas texture handle plus per-glyph
//! metrics and uv rectangles. A [`TextNode`] bakes its string into one quad
//! per glyph and draws either the full text or a single-glyph range, which
//! is what HUD counters use.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::render::api::{RenderDevice, TextureHandle, UniformValue};
use crate::render::context::FrameContext;
use crate::render::material::Material;
use crate::render::mesh::{ChannelData, GeometryData};
use crate::render::RenderResult;
use crate::scene::node::{NodeData, SceneNode};

/// Indices per baked glyph quad
pub const INDICES_PER_QUAD: u32 = 6;

// Text meshes render very small in world units; one font pixel maps to
// roughly a centimeter.
const TEXT_SCALE: f32 = 0.01;

/// Metrics and uv rectangle for one glyph in an atlas
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Bearing from the pen position to the quad's top-left, in pixels
    pub offset: Vec2,
    /// Quad width and height in pixels
    pub size: Vec2,
    /// Horizontal pen advance in pixels
    pub advance: f32,
    /// Top-left corner of the glyph in atlas uv space
    pub uv_min: Vec2,
    /// Bottom-right corner of the glyph in atlas uv space
    pub uv_max: Vec2,
}

/// Passive font atlas record.
///
/// Font file decoding and atlas rasterization stay outside the engine; the
/// host hands over a finished texture and the glyph table.
pub struct FontAtlas {
    texture: TextureHandle,
    size: Vec2,
    glyphs: HashMap<char, Glyph>,
    kerning: HashMap<(char, char), f32>,
}

impl FontAtlas {
    /// Create an atlas over an existing texture of the given pixel size
    pub fn new(texture: TextureHandle, size: Vec2) -> Self {
        Self {
            texture,
            size,
            glyphs: HashMap::new(),
            kerning: HashMap::new(),
        }
    }

    /// Register a glyph's metrics
    pub fn add_glyph(&mut self, character: char, glyph: Glyph) {
        self.glyphs.insert(character, glyph);
    }

    /// Register a kerning adjustment for a glyph pair
    pub fn set_kerning(&mut self, previous: char, character: char, kerning: f32) {
        self.kerning.insert((previous, character), kerning);
    }

    /// Look up a glyph; characters missing from the charset have none
    pub fn glyph(&self, character: char) -> Option<&Glyph> {
        self.glyphs.get(&character)
    }

    /// Kerning between two glyphs, zero when the pair has none
    pub fn kerning(&self, previous: char, character: char) -> f32 {
        self.kerning
            .get(&(previous, character))
            .copied()
            .unwrap_or(0.0)
    }

    /// Atlas texture handle
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Atlas pixel dimensions
    pub fn size(&self) -> Vec2 {
        self.size
    }
}

/// Scene node drawing baked glyph quads over a font atlas
pub struct TextNode {
    data: NodeData,
    atlas: Rc<FontAtlas>,
    text: String,
    // Advance the pen between glyphs while baking. Disabled for counter
    // displays that position one glyph at a time through the model stack.
    offset_glyphs: bool,
    draw_range: Option<(u32, u32)>,
    dimensions: Vec2,
    glyph_dimensions: Vec<Vec2>,
}

impl TextNode {
    /// Create a text node over a shared atlas
    pub fn new(atlas: Rc<FontAtlas>, material: Material) -> Self {
        Self {
            data: NodeData::new(GeometryData::new(), material),
            atlas,
            text: String::new(),
            offset_glyphs: true,
            draw_range: None,
            dimensions: Vec2::zeros(),
            glyph_dimensions: Vec::new(),
        }
    }

    /// Set the text, rebaking the glyph mesh when it changes
    pub fn set_text(&mut self, device: &mut dyn RenderDevice, text: &str) -> RenderResult<()> {
        if self.text == text {
            return Ok(());
        }
        self.text = text.to_owned();
        self.update_mesh(device)
    }

    /// Current text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Enable or disable pen advancement between baked glyphs
    pub fn set_offset_glyphs(&mut self, offset_glyphs: bool) {
        self.offset_glyphs = offset_glyphs;
    }

    /// Restrict drawing to `count` glyphs starting at glyph `offset`
    pub fn set_draw_range(&mut self, offset: u32, count: u32) {
        self.draw_range = Some((offset, count));
    }

    /// Draw the full text again
    pub fn clear_draw_range(&mut self) {
        self.draw_range = None;
    }

    /// Width and height of the baked text in atlas pixels
    pub fn dimensions(&self) -> Vec2 {
        self.dimensions
    }

    /// Pixel dimensions of one baked glyph
    pub fn glyph_dimensions(&self, index: usize) -> Vec2 {
        self.glyph_dimensions[index]
    }

    /// Shared font atlas
    pub fn atlas(&self) -> &Rc<FontAtlas> {
        &self.atlas
    }

    /// Bake the current text into quad geometry.
    ///
    /// One quad per glyph: positions from the pen position, bearing and
    /// advance (with kerning against the previous glyph), texcoords from
    /// the glyph's uv rectangle, six indices per quad.
    fn bake_text(&mut self) -> GeometryData {
        let mut geometry = GeometryData::new();
        let glyph_count = self.text.chars().count();
        geometry.positions.reserve(glyph_count * 4);
        geometry.texcoords.reserve(glyph_count * 4);
        geometry
            .indices
            .reserve(glyph_count * INDICES_PER_QUAD as usize);

        self.glyph_dimensions.clear();
        self.dimensions = Vec2::zeros();

        let mut pen = Vec2::zeros();
        let mut previous: Option<char> = None;
        let mut quad = 0u32;

        for character in self.text.chars() {
            let Some(glyph) = self.atlas.glyph(character) else {
                continue;
            };

            if self.offset_glyphs {
                if let Some(previous) = previous {
                    let kerning = self.atlas.kerning(previous, character);
                    pen.x += kerning;
                    self.dimensions.x += kerning;
                }
            }

            // Quad corners in pixels; y grows upward from the baseline.
            let x0 = pen.x + glyph.offset.x;
            let y0 = pen.y + glyph.offset.y;
            let x1 = x0 + glyph.size.x;
            let y1 = y0 - glyph.size.y;

            self.glyph_dimensions.push(glyph.size);

            geometry.positions.extend([
                Vec3::new(x0, y0, 0.0),
                Vec3::new(x0, y1, 0.0),
                Vec3::new(x1, y1, 0.0),
                Vec3::new(x1, y0, 0.0),
            ]);
            geometry.texcoords.extend([
                Vec2::new(glyph.uv_min.x, glyph.uv_min.y),
                Vec2::new(glyph.uv_min.x, glyph.uv_max.y),
                Vec2::new(glyph.uv_max.x, glyph.uv_max.y),
                Vec2::new(glyph.uv_max.x, glyph.uv_min.y),
            ]);

            let base = quad * 4;
            geometry
                .indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
            quad += 1;

            if self.offset_glyphs {
                pen.x += glyph.advance;
            }
            self.dimensions.x += glyph.advance;

            previous = Some(character);
        }

        geometry
    }

    /// Rebake and create or update the glyph mesh
    fn update_mesh(&mut self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        if self.text.is_empty() {
            return Ok(());
        }

        let geometry = self.bake_text();
        let index_count = geometry.index_count();

        if let Some(mesh) = self.data.mesh() {
            device.bind_mesh(mesh);
            device.update_channel(mesh, ChannelData::Positions(&geometry.positions));
            device.update_channel(mesh, ChannelData::Texcoords(&geometry.texcoords));
            device.update_channel(mesh, ChannelData::Indices(&geometry.indices));
            debug!("updated text mesh, text = {:?}, draw_count = {index_count}", self.text);
        } else {
            let mesh = device.create_mesh(&geometry)?;
            self.data.set_mesh(mesh);
            debug!("created text mesh, text = {:?}, draw_count = {index_count}", self.text);
        }

        self.data.set_draw_count(index_count);
        *self.data.geometry_mut() = geometry;
        Ok(())
    }

    fn draw_glyphs(&mut self, device: &mut dyn RenderDevice, ctx: &mut FrameContext) {
        let shader = self
            .data
            .material()
            .shader()
            .expect("text node material has no shader bound");
        let mesh = self.data.mesh().expect("text node has no baked mesh");
        let texture = self
            .data
            .material()
            .texture()
            .expect("text node material has no atlas texture");
        let color = self.data.material().color();
        let draw_range = self.draw_range;

        ctx.activate_shader(device, shader);
        device.bind_texture(texture, 0);

        let data = &mut self.data;
        ctx.scoped_model(ctx.model.top(), |ctx| {
            let transform = data.transform().clone();
            data.calc_model_view_projection(ctx, &transform);

            device.set_uniform(shader, "u_diffuse", UniformValue::Int(0));
            device.set_uniform(
                shader,
                "u_model_view_projection_matrix",
                UniformValue::Mat4(data.matrices().model_view_projection),
            );
            device.set_uniform(shader, "u_color", UniformValue::Vec4(color));

            match draw_range {
                Some((offset, count)) => device.draw_indexed(
                    mesh,
                    offset * INDICES_PER_QUAD,
                    count * INDICES_PER_QUAD,
                ),
                None => device.draw_indexed(mesh, 0, data.draw_count()),
            }
        });
    }
}

impl SceneNode for TextNode {
    fn data(&self) -> &NodeData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut NodeData {
        &mut self.data
    }

    /// Attach the atlas texture to the material, scale down to world units
    /// and bake any pre-set text
    fn init(&mut self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        self.data.material_mut().set_texture(self.atlas.texture());
        self.data.transform_mut().scale = Vec3::new(TEXT_SCALE, TEXT_SCALE, TEXT_SCALE);

        if !self.text.is_empty() && self.data.mesh().is_none() {
            self.update_mesh(device)?;
        }
        Ok(())
    }

    fn draw(&mut self, device: &mut dyn RenderDevice, ctx: &mut FrameContext) {
        // Empty text draws nothing.
        if self.text.is_empty() {
            return;
        }

        if self.data.is_camera_translated() {
            self.draw_glyphs(device, ctx);
        } else {
            let locked = ctx.camera_view.view_matrix_no_translation();
            ctx.scoped_view(locked, |ctx| self.draw_glyphs(device, ctx));
        }
    }
}
