//! HUD overlay nodes

use std::rc::Rc;

use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::RenderDevice;
use crate::render::context::FrameContext;
use crate::render::material::Material;
use crate::render::RenderResult;
use crate::scene::node::{NodeData, SceneNode};
use crate::scene::text::{FontAtlas, TextNode};

// Charset baked once; digits first so a digit's value is its glyph index.
const CHARSET: &str = "0123456789:.";
const SEPARATOR_IDX: u32 = 10;
const FRACTION_IDX: u32 = 11;

// Tick period of the fastest digit pair, in milliseconds.
const OPERATING_FREQ: f32 = 10.0;

const PAIR_MM: usize = 0;
const PAIR_SS: usize = 1;
const PAIR_FF: usize = 2;
const PAIR_COUNT: usize = 3;

/// HUD node rendering elapsed time as `MM:SS.FF`.
///
/// Built from one [`TextNode`] baked with the digit charset; each digit is
/// drawn as a single-glyph range with the model stack translated per glyph
/// width. Digit pairs carry into each other at their 9/5 limits with a
/// remainder accumulator, so the display tracks frametime without drift.
pub struct TimeDisplay {
    text: TextNode,
    // Digit pairs, high digit first: minutes, seconds, hundredths.
    numbers: [[u32; 2]; PAIR_COUNT],
    remainder: f32,
}

impl TimeDisplay {
    /// Create a time display over a shared font atlas
    pub fn new(atlas: Rc<FontAtlas>, material: Material) -> Self {
        let mut text = TextNode::new(atlas, material);
        // Glyphs are positioned one at a time through the model stack, so
        // the baked quads must all sit at the pen origin.
        text.set_offset_glyphs(false);
        Self {
            text,
            numbers: [[0, 0]; PAIR_COUNT],
            remainder: 0.0,
        }
    }

    /// Displayed `(minutes, seconds, hundredths)` values
    pub fn time(&self) -> (u32, u32, u32) {
        let pair = |idx: usize| self.numbers[idx][0] * 10 + self.numbers[idx][1];
        (pair(PAIR_MM), pair(PAIR_SS), pair(PAIR_FF))
    }

    /// Reset the display to 00:00.00
    pub fn reset(&mut self) {
        self.numbers = [[0, 0]; PAIR_COUNT];
        self.remainder = 0.0;
    }

    // Advance one digit pair. Returns true when the pair wrapped and the
    // next one carries.
    fn inc_pair(numbers: &mut [[u32; 2]; PAIR_COUNT], idx: usize) -> bool {
        let high_limit = if idx == PAIR_FF { 9 } else { 5 };

        numbers[idx][1] += 1;
        if numbers[idx][1] > 9 {
            numbers[idx][1] = 0;
            numbers[idx][0] += 1;
            if numbers[idx][0] > high_limit {
                numbers[idx][0] = 0;
                return true;
            }
        }
        false
    }
}

impl SceneNode for TimeDisplay {
    fn data(&self) -> &NodeData {
        self.text.data()
    }

    fn data_mut(&mut self) -> &mut NodeData {
        self.text.data_mut()
    }

    fn init(&mut self, device: &mut dyn RenderDevice) -> RenderResult<()> {
        self.text.set_text(device, CHARSET)?;
        self.text.init(device)
    }

    fn logic(&mut self, ctx: &FrameContext) {
        let mut time_delta = ctx.frametime + self.remainder;
        while time_delta > OPERATING_FREQ {
            time_delta -= OPERATING_FREQ;
            if Self::inc_pair(&mut self.numbers, PAIR_FF)
                && Self::inc_pair(&mut self.numbers, PAIR_SS)
            {
                Self::inc_pair(&mut self.numbers, PAIR_MM);
            }
        }
        self.remainder = time_delta;
    }

    fn draw(&mut self, device: &mut dyn RenderDevice, ctx: &mut FrameContext) {
        let numbers = self.numbers;
        let glyph_width = self.text.glyph_dimensions(0).x;
        let text = &mut self.text;

        ctx.scoped_model(ctx.model.top(), |ctx| {
            let mut translation = Vec3::zeros();
            let mut pair_offset = 0.0;

            for (pair, digits) in numbers.iter().enumerate() {
                for (i, &digit) in digits.iter().enumerate() {
                    translation.x = pair_offset + glyph_width * i as f32;
                    ctx.model.set_top(Mat4::new_translation(&translation));

                    text.set_draw_range(digit, 1);
                    text.draw(device, ctx);
                }

                // Leave a gap for the separator glyph.
                pair_offset += glyph_width * 3.0;

                if pair + 1 < PAIR_COUNT {
                    let separator = if pair == PAIR_SS {
                        FRACTION_IDX
                    } else {
                        SEPARATOR_IDX
                    };

                    translation.x += glyph_width;
                    ctx.model.set_top(Mat4::new_translation(&translation));

                    text.set_draw_range(separator, 1);
                    text.draw(device, ctx);
                }
            }
        });
    }
}
