use crate::error::RenderError;
use crate::glm;
use crate::palette::PaletteUniforms;
use crate::rendering::quad::GeometryQuad;
use crate::rendering::shader::ShaderProgram;
use crate::sprite::Sprite;
use crate::utils::constants::{CANVAS_TEXTURE_UNIT, MEDIUM_TEXTURE_UNIT, SCREEN_MIX};
use crate::utils::file::{SPRITE_FRAG, SPRITE_VERT};
use gl::types::*;

const UNIFORM_NAMES: [&str; 20] = [
    "canvasFrameOffset",
    "canvasFrameSize",
    "canvasImageSize",
    "mediumFrameOffset",
    "mediumFrameSize",
    "mediumImageSize",
    "rotation",
    "scale",
    "position",
    "tint",
    "canvasMediumMix",
    "paletteAKeys",
    "paletteAEntries",
    "numPaletteA",
    "paletteBKeys",
    "paletteBEntries",
    "numPaletteB",
    "swapHeight",
    "canvas",
    "medium",
];

const ATTRIB_NAMES: [&str; 2] = ["vertPosition", "vertUV"];

/// The shared rendering context: one shader program and one unit quad every
/// sprite draw funnels through.
///
/// Constructing the renderer is the library's init step and requires a
/// current GL context (with functions loaded); sprite constructors borrow it
/// so resource creation cannot precede initialization. Teardown happens on
/// drop. All methods leave the global GL binding state the way they found
/// it, so sequential calls compose; nothing here is thread-safe.
pub struct SpriteRenderer {
    program: ShaderProgram,
    quad: GeometryQuad,
    tmp_viewport: [GLint; 4],
}

impl SpriteRenderer {
    /// compiles the shared shader program and builds the shared quad
    pub fn new() -> Result<Self, RenderError> {
        let mut program = ShaderProgram::new(SPRITE_VERT, SPRITE_FRAG)?;
        for name in UNIFORM_NAMES {
            program.add_unif_location(name);
        }
        for name in ATTRIB_NAMES {
            program.add_attr_location(name);
        }
        let quad = GeometryQuad::new(&program);
        log::debug!("sprite renderer initialized");

        Ok(Self {
            program,
            quad,
            tmp_viewport: [0; 4],
        })
    }

    /// Composites ``medium`` into ``canvas``'s render target.
    ///
    /// The medium's current frame is transformed by its rotation, scale, and
    /// position, recolored per its palettes, tinted, and blended over the
    /// canvas's source content by ``mix`` (0 = pure canvas, 1 = pure medium,
    /// clamped). Pixels outside the medium's footprint are left untouched.
    pub fn render_to_sprite(&self, canvas: &Sprite, medium: &Sprite, mix: f32) {
        let mix = mix.clamp(0.0, 1.0);

        let mut saved_viewport: [GLint; 4] = [0; 4];
        unsafe {
            gl::GetIntegerv(gl::VIEWPORT, saved_viewport.as_mut_ptr());
            gl::BindFramebuffer(gl::FRAMEBUFFER, canvas.framebuffer_id());
            gl::Viewport(0, 0, canvas.width() as GLsizei, canvas.height() as GLsizei);
            // 2D only, no z-buffer.
            gl::Disable(gl::DEPTH_TEST);
            gl::UseProgram(self.program.id);

            gl::ActiveTexture(gl::TEXTURE0 + CANVAS_TEXTURE_UNIT);
            gl::BindTexture(gl::TEXTURE_2D, canvas.texture_id());
            gl::Uniform1i(self.program.get_unif("canvas"), CANVAS_TEXTURE_UNIT as GLint);

            gl::ActiveTexture(gl::TEXTURE0 + MEDIUM_TEXTURE_UNIT);
            gl::BindTexture(gl::TEXTURE_2D, medium.texture_id());
            gl::Uniform1i(self.program.get_unif("medium"), MEDIUM_TEXTURE_UNIT as GLint);

            gl::Uniform1f(self.program.get_unif("canvasMediumMix"), mix);
        }

        self.upload_frame_windows(
            glm::vec2(canvas.width() as f32, canvas.height() as f32),
            glm::vec2(canvas.frame().offset().0 as f32, canvas.frame().offset().1 as f32),
            glm::vec2(canvas.image_width() as f32, canvas.image_height() as f32),
            medium,
        );
        self.upload_sprite_state(medium);

        self.quad.draw();
        self.restore_bindings(&saved_viewport);
    }

    /// Draws ``sprite`` to the current display viewport, transformed and
    /// recolored the same way as [`SpriteRenderer::render_to_sprite`]. Both
    /// samplers bind the sprite's own texture, so the mix factor cancels
    /// out.
    pub fn render_to_screen(&self, sprite: &Sprite) {
        let mut saved_viewport: [GLint; 4] = [0; 4];
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl::GetIntegerv(gl::VIEWPORT, saved_viewport.as_mut_ptr());
            gl::Disable(gl::DEPTH_TEST);
            gl::UseProgram(self.program.id);

            gl::ActiveTexture(gl::TEXTURE0 + CANVAS_TEXTURE_UNIT);
            gl::BindTexture(gl::TEXTURE_2D, sprite.texture_id());
            gl::Uniform1i(self.program.get_unif("canvas"), CANVAS_TEXTURE_UNIT as GLint);

            gl::ActiveTexture(gl::TEXTURE0 + MEDIUM_TEXTURE_UNIT);
            gl::BindTexture(gl::TEXTURE_2D, sprite.texture_id());
            gl::Uniform1i(self.program.get_unif("medium"), MEDIUM_TEXTURE_UNIT as GLint);

            gl::Uniform1f(self.program.get_unif("canvasMediumMix"), SCREEN_MIX);
        }

        // The canvas here is the display: its frame is the viewport.
        let viewport_size = glm::vec2(saved_viewport[2] as f32, saved_viewport[3] as f32);
        self.upload_frame_windows(viewport_size, glm::vec2(0.0, 0.0), viewport_size, sprite);
        self.upload_sprite_state(sprite);

        self.quad.draw();
        self.restore_bindings(&saved_viewport);
    }

    /// Redirects all subsequent draw calls into the sprite's render target
    /// until [`SpriteRenderer::end_render_to_sprite`]; depth testing is off
    /// and the viewport covers the sprite. Escape hatch for custom drawing.
    pub fn begin_render_to_sprite(&mut self, sprite: &Sprite) {
        unsafe {
            gl::GetIntegerv(gl::VIEWPORT, self.tmp_viewport.as_mut_ptr());
            gl::BindFramebuffer(gl::FRAMEBUFFER, sprite.framebuffer_id());
            gl::Viewport(0, 0, sprite.width() as GLsizei, sprite.height() as GLsizei);
            gl::Disable(gl::DEPTH_TEST);
        }
    }

    /// restores the default framebuffer and the prior viewport
    pub fn end_render_to_sprite(&self) {
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl::Viewport(
                self.tmp_viewport[0],
                self.tmp_viewport[1],
                self.tmp_viewport[2] as GLsizei,
                self.tmp_viewport[3] as GLsizei,
            );
        }
    }

    /// uploads both sprites' frame windows and image extents
    fn upload_frame_windows(
        &self,
        canvas_frame_size: glm::Vec2,
        canvas_frame_offset: glm::Vec2,
        canvas_image_size: glm::Vec2,
        medium: &Sprite,
    ) {
        let (medium_off_x, medium_off_y) = medium.frame().offset();
        unsafe {
            self.upload_vec2("canvasFrameSize", canvas_frame_size);
            self.upload_vec2("canvasFrameOffset", canvas_frame_offset);
            self.upload_vec2("canvasImageSize", canvas_image_size);
            self.upload_vec2(
                "mediumFrameSize",
                glm::vec2(medium.width() as f32, medium.height() as f32),
            );
            self.upload_vec2(
                "mediumFrameOffset",
                glm::vec2(medium_off_x as f32, medium_off_y as f32),
            );
            self.upload_vec2(
                "mediumImageSize",
                glm::vec2(medium.image_width() as f32, medium.image_height() as f32),
            );
        }
    }

    /// uploads the medium sprite's transform, tint, and palette state
    fn upload_sprite_state(&self, sprite: &Sprite) {
        let (pos_x, pos_y) = sprite.position();
        let (scale_x, scale_y) = sprite.scale();
        let tint = sprite.tint().unwrap_or(crate::color::Color::WHITE);
        unsafe {
            gl::Uniform1f(self.program.get_unif("rotation"), sprite.rotation());
            self.upload_vec2("scale", glm::vec2(scale_x, scale_y));
            self.upload_vec2("position", glm::vec2(pos_x as f32, pos_y as f32));
            gl::Uniform1f(self.program.get_unif("swapHeight"), sprite.swap_height() as f32);
            gl::Uniform4f(
                self.program.get_unif("tint"),
                tint.r,
                tint.g,
                tint.b,
                tint.a,
            );
        }
        self.upload_palettes(sprite);
    }

    /// Uploads both palette banks. An absent slot mirrors the present
    /// palette so a lone palette applies on both sides of the swap boundary;
    /// with neither attached both counts go to zero and no recoloring
    /// happens.
    fn upload_palettes(&self, sprite: &Sprite) {
        let unpacked_a = sprite.palette_a().map(|p| p.borrow().unpack());
        let unpacked_b = sprite.palette_b().map(|p| p.borrow().unpack());
        let (bank_a, bank_b) = match (unpacked_a, unpacked_b) {
            (Some(a), Some(b)) => (a, b),
            (Some(a), None) => (a.clone(), a),
            (None, Some(b)) => (b.clone(), b),
            (None, None) => (PaletteUniforms::default(), PaletteUniforms::default()),
        };

        unsafe {
            self.upload_palette_bank("paletteAKeys", "paletteAEntries", "numPaletteA", &bank_a);
            self.upload_palette_bank("paletteBKeys", "paletteBEntries", "numPaletteB", &bank_b);
        }
    }

    unsafe fn upload_palette_bank(
        &self,
        keys_name: &str,
        entries_name: &str,
        num_name: &str,
        bank: &PaletteUniforms,
    ) {
        if bank.count > 0 {
            gl::Uniform4fv(self.program.get_unif(keys_name), bank.count, bank.keys.as_ptr());
            gl::Uniform4fv(
                self.program.get_unif(entries_name),
                bank.count,
                bank.entries.as_ptr(),
            );
        }
        gl::Uniform1i(self.program.get_unif(num_name), bank.count);
    }

    unsafe fn upload_vec2(&self, name: &str, value: glm::Vec2) {
        gl::Uniform2f(self.program.get_unif(name), value.x, value.y);
    }

    /// rebinds the defaults so no draw leaks global state
    fn restore_bindings(&self, saved_viewport: &[GLint; 4]) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + CANVAS_TEXTURE_UNIT);
            gl::BindTexture(gl::TEXTURE_2D, 0);
            gl::ActiveTexture(gl::TEXTURE0 + MEDIUM_TEXTURE_UNIT);
            gl::BindTexture(gl::TEXTURE_2D, 0);
            gl::UseProgram(0);
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
            gl::Viewport(
                saved_viewport[0],
                saved_viewport[1],
                saved_viewport[2] as GLsizei,
                saved_viewport[3] as GLsizei,
            );
        }
    }
}
