use crate::color::Color;
use crate::error::RenderError;
use crate::palette::Palette;
use crate::rendering::renderer::SpriteRenderer;
use crate::utils::constants::EMPTY_SOURCE_SIZE;
use crate::utils::tools::SharedPtr;
use gl::types::*;
use stb_image::image::{Image, LoadResult};
use std::path::Path;
use std::ptr;

/// Pixel format of a sprite's textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// channels per pixel
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    fn gl_format(self) -> GLenum {
        match self {
            Self::Rgb => gl::RGB,
            Self::Rgba => gl::RGBA,
        }
    }

    fn gl_internal_format(self) -> GLint {
        match self {
            Self::Rgb => gl::RGB8 as GLint,
            Self::Rgba => gl::RGBA8 as GLint,
        }
    }

    fn decode_depth(self) -> usize {
        self.channels()
    }
}

/// A single color channel, for targeted texel queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

/// The window into a sprite sheet that selects the current animation frame.
///
/// Offsets are texel coordinates of the frame's top-left corner within the
/// full image. Frames are expected to tile the sheet left-to-right,
/// top-to-bottom with no remainder; the window performs no bounds checks of
/// its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameWindow {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) image_width: u32,
    pub(crate) image_height: u32,
    pub(crate) offset_x: u32,
    pub(crate) offset_y: u32,
}

impl FrameWindow {
    /// a window covering the whole image (static sprites)
    pub(crate) fn single(width: u32, height: u32) -> Self {
        Self::tiled(width, height, width, height)
    }

    /// a frame-sized window into a larger sheet
    pub(crate) fn tiled(width: u32, height: u32, image_width: u32, image_height: u32) -> Self {
        Self {
            width,
            height,
            image_width,
            image_height,
            offset_x: 0,
            offset_y: 0,
        }
    }

    /// Steps to the next frame: right along the row, down a row at the right
    /// edge, back to the origin past the bottom row.
    pub fn advance(&mut self) {
        self.offset_x += self.width;
        if self.offset_x >= self.image_width {
            self.offset_x = 0;
            self.offset_y += self.height;
        }
        if self.offset_y >= self.image_height {
            self.offset_x = 0;
            self.offset_y = 0;
        }
    }

    /// current frame offset in texels
    pub fn offset(&self) -> (u32, u32) {
        (self.offset_x, self.offset_y)
    }
}

/// A GPU-resident sprite: a source texture holding the (possibly animated)
/// image, plus a frame-sized render-target texture and framebuffer it can be
/// composited into.
///
/// The sprite exclusively owns its GL texture and framebuffer objects and
/// releases them on drop. Attached palettes stay caller-owned behind
/// ``SharedPtr`` and may be shared between sprites or mutated after
/// attachment; the tint is a plain copied value.
pub struct Sprite {
    tex: GLuint,
    att: GLuint,
    fbo: GLuint,
    format: PixelFormat,
    frame: FrameWindow,

    rotation: f32,
    pos_x: i32,
    pos_y: i32,
    scale_x: f32,
    scale_y: f32,
    tint: Option<Color>,

    palette_a: Option<SharedPtr<Palette>>,
    palette_b: Option<SharedPtr<Palette>>,
    swap_height: i32,
}

impl Sprite {
    /// Creates a sprite with no image: a zeroed ``width x height`` render
    /// target of the requested format. The source texture is a small
    /// zero-filled placeholder so the shared shader's samplers always have a
    /// complete texture to bind.
    pub fn empty(_renderer: &SpriteRenderer, width: u32, height: u32, format: PixelFormat) -> Self {
        let tex = generate_texture(EMPTY_SOURCE_SIZE, EMPTY_SOURCE_SIZE, format, None);
        let att = generate_texture(width, height, format, None);
        let fbo = generate_framebuffer(att);
        log::debug!("created empty {width}x{height} sprite");

        Self::assemble(tex, att, fbo, format, FrameWindow::single(width, height))
    }

    /// Creates a static sprite from a PNG file. The image is decoded as
    /// RGBA first, falling back to RGB; if both attempts fail the decoder's
    /// complaint is returned.
    pub fn from_png(
        _renderer: &SpriteRenderer,
        path: impl AsRef<Path>,
    ) -> Result<Self, RenderError> {
        let (image, format) = decode_png(path.as_ref())?;
        let width = image.width as u32;
        let height = image.height as u32;

        let tex = generate_texture(width, height, format, Some(&image.data));
        let att = generate_texture(width, height, format, None);
        let fbo = generate_framebuffer(att);
        log::debug!("created {width}x{height} sprite from {:?}", path.as_ref());

        Ok(Self::assemble(
            tex,
            att,
            fbo,
            format,
            FrameWindow::single(width, height),
        ))
    }

    /// Creates an animated sprite from a PNG sprite sheet. The source
    /// texture holds the entire sheet while the render target is sized to a
    /// single ``frame_width x frame_height`` frame.
    pub fn animated_from_png(
        _renderer: &SpriteRenderer,
        path: impl AsRef<Path>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, RenderError> {
        let (image, format) = decode_png(path.as_ref())?;
        let image_width = image.width as u32;
        let image_height = image.height as u32;

        let tex = generate_texture(image_width, image_height, format, Some(&image.data));
        let att = generate_texture(frame_width, frame_height, format, None);
        let fbo = generate_framebuffer(att);
        log::debug!(
            "created animated sprite from {:?} ({image_width}x{image_height} sheet, {frame_width}x{frame_height} frames)",
            path.as_ref()
        );

        Ok(Self::assemble(
            tex,
            att,
            fbo,
            format,
            FrameWindow::tiled(frame_width, frame_height, image_width, image_height),
        ))
    }

    fn assemble(tex: GLuint, att: GLuint, fbo: GLuint, format: PixelFormat, frame: FrameWindow) -> Self {
        Self {
            tex,
            att,
            fbo,
            format,
            frame,
            rotation: 0.0,
            pos_x: 0,
            pos_y: 0,
            scale_x: 1.0,
            scale_y: 1.0,
            tint: None,
            palette_a: None,
            palette_b: None,
            swap_height: 0,
        }
    }

    /// Retrofits animation onto a sprite built with [`Sprite::from_png`]:
    /// the render target is resized to one frame and the frame window reset.
    /// Frames must tile the existing image exactly.
    pub fn init_animation(&mut self, frame_width: u32, frame_height: u32) {
        resize_texture(self.att, frame_width, frame_height, self.format);
        self.frame = FrameWindow::tiled(
            frame_width,
            frame_height,
            self.frame.image_width,
            self.frame.image_height,
        );
    }

    /// steps the frame window to the next animation frame
    pub fn advance_frame(&mut self) {
        self.frame.advance();
    }

    // transform state

    /// sets the rotation in radians
    pub fn set_rotation(&mut self, rads: f32) {
        self.rotation = rads;
    }

    /// sets the horizontal and vertical scale factors
    pub fn set_scale(&mut self, x: f32, y: f32) {
        self.scale_x = x;
        self.scale_y = y;
    }

    /// sets the position of the frame's origin corner in canvas pixels
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.pos_x = x;
        self.pos_y = y;
    }

    /// Sets the tint the sprite's texels are multiplied with, term by term.
    /// ``None`` disables tinting.
    pub fn set_tint(&mut self, tint: Option<Color>) {
        self.tint = tint;
    }

    /// resets rotation, position, scale, and tint to their defaults
    pub fn clear_transforms(&mut self) {
        self.rotation = 0.0;
        self.pos_x = 0;
        self.pos_y = 0;
        self.scale_x = 1.0;
        self.scale_y = 1.0;
        self.tint = None;
    }

    // palette state

    /// attaches or detaches the first palette
    pub fn set_palette_a(&mut self, palette: Option<SharedPtr<Palette>>) {
        self.palette_a = palette;
    }

    /// attaches or detaches the second palette
    pub fn set_palette_b(&mut self, palette: Option<SharedPtr<Palette>>) {
        self.palette_b = palette;
    }

    /// Sets the row at which palette choice flips: top-down target rows
    /// before it recolor through palette A, the rest through palette B.
    pub fn set_swap_height(&mut self, height: i32) {
        self.swap_height = height;
    }

    // accessors

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    pub fn image_width(&self) -> u32 {
        self.frame.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.frame.image_height
    }

    pub fn frame(&self) -> &FrameWindow {
        &self.frame
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn position(&self) -> (i32, i32) {
        (self.pos_x, self.pos_y)
    }

    pub fn scale(&self) -> (f32, f32) {
        (self.scale_x, self.scale_y)
    }

    pub fn tint(&self) -> Option<Color> {
        self.tint
    }

    pub fn palette_a(&self) -> Option<&SharedPtr<Palette>> {
        self.palette_a.as_ref()
    }

    pub fn palette_b(&self) -> Option<&SharedPtr<Palette>> {
        self.palette_b.as_ref()
    }

    pub fn swap_height(&self) -> i32 {
        self.swap_height
    }

    /// raw handle of the source texture
    pub fn texture_id(&self) -> GLuint {
        self.tex
    }

    /// raw handle of the render-target framebuffer
    pub fn framebuffer_id(&self) -> GLuint {
        self.fbo
    }

    // readback

    /// Reads back the entire render target as row-major floats, 3 or 4
    /// channels per pixel depending on the format. Blocks on a full
    /// pipeline sync; use sparingly.
    pub fn texels(&self) -> Vec<f32> {
        self.texel_region(0, 0, self.frame.width, self.frame.height)
    }

    /// Reads back a ``w x h`` rectangle of the render target starting at
    /// ``(x, y)``. Same cost caveats as [`Sprite::texels`].
    pub fn texel_region(&self, x: u32, y: u32, w: u32, h: u32) -> Vec<f32> {
        let mut data = vec![0f32; w as usize * h as usize * self.format.channels()];
        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.fbo);
            gl::ReadPixels(
                x as GLint,
                y as GLint,
                w as GLsizei,
                h as GLsizei,
                self.format.gl_format(),
                gl::FLOAT,
                data.as_mut_ptr() as *mut GLvoid,
            );
            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
        data
    }

    /// reads back the single texel at ``(x, y)``
    pub fn color_at(&self, x: u32, y: u32) -> Color {
        let data = self.texel_region(x, y, 1, 1);
        let a = match self.format {
            PixelFormat::Rgba => data[3],
            PixelFormat::Rgb => 1.0,
        };
        Color::new(data[0], data[1], data[2], a)
    }

    /// reads back one channel of the texel at ``(x, y)``
    pub fn channel_at(&self, x: u32, y: u32, channel: Channel) -> f32 {
        let color = self.color_at(x, y);
        match channel {
            Channel::Red => color.r,
            Channel::Green => color.g,
            Channel::Blue => color.b,
            Channel::Alpha => color.a,
        }
    }
}

impl Drop for Sprite {
    fn drop(&mut self) {
        log::debug!("dropped sprite");
        unsafe {
            gl::DeleteFramebuffers(1, &self.fbo);
            gl::DeleteTextures(1, &self.tex);
            gl::DeleteTextures(1, &self.att);
        }
    }
}

/// Decodes a PNG as RGBA, falling back to RGB only if the 4-channel attempt
/// fails, mirroring the two-bit-depth load ladder of the wire format.
fn decode_png(path: &Path) -> Result<(Image<u8>, PixelFormat), RenderError> {
    let rgba_error = match stb_image::image::load_with_depth(path, PixelFormat::Rgba.decode_depth(), false) {
        LoadResult::ImageU8(image) => return Ok((image, PixelFormat::Rgba)),
        LoadResult::Error(reason) => reason,
        LoadResult::ImageF32(_) => String::from("unexpected float image data"),
    };
    log::warn!("RGBA decode of {path:?} failed ({rgba_error}), retrying as RGB");

    match stb_image::image::load_with_depth(path, PixelFormat::Rgb.decode_depth(), false) {
        LoadResult::ImageU8(image) => Ok((image, PixelFormat::Rgb)),
        LoadResult::Error(reason) => {
            log::error!("failed to decode image {path:?}: {reason}");
            Err(RenderError::ImageDecode {
                path: path.to_path_buf(),
                reason,
            })
        }
        LoadResult::ImageF32(_) => Err(RenderError::ImageDecode {
            path: path.to_path_buf(),
            reason: String::from("unexpected float image data"),
        }),
    }
}

/// Generates a texture object filled with the given image data, or with
/// zeros when none is supplied (GL would otherwise leave the content
/// undefined, and readback of untouched sprites is part of the contract).
fn generate_texture(width: u32, height: u32, format: PixelFormat, data: Option<&[u8]>) -> GLuint {
    let zeroed;
    let data = match data {
        Some(d) => d,
        None => {
            zeroed = vec![0u8; width as usize * height as usize * format.channels()];
            &zeroed
        }
    };

    let mut tex_id = 0;
    unsafe {
        gl::GenTextures(1, &mut tex_id);
        gl::BindTexture(gl::TEXTURE_2D, tex_id);
        // Byte-tight rows; RGB data is not 4-aligned for odd widths.
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            format.gl_internal_format(),
            width as GLsizei,
            height as GLsizei,
            0,
            format.gl_format(),
            gl::UNSIGNED_BYTE,
            data.as_ptr() as *const GLvoid,
        );

        // Pixel-art sampling: no mipmaps, nearest filtering, edge clamping.
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_BASE_LEVEL, 0);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, 0);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
        gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);

        gl::BindTexture(gl::TEXTURE_2D, 0);
    }
    tex_id
}

/// reallocates a texture object's storage at a new size, discarding content
fn resize_texture(tex_id: GLuint, width: u32, height: u32, format: PixelFormat) {
    unsafe {
        gl::BindTexture(gl::TEXTURE_2D, tex_id);
        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            format.gl_internal_format(),
            width as GLsizei,
            height as GLsizei,
            0,
            format.gl_format(),
            gl::UNSIGNED_BYTE,
            ptr::null(),
        );
        gl::BindTexture(gl::TEXTURE_2D, 0);
    }
}

/// generates a framebuffer with the given texture as its color attachment
fn generate_framebuffer(att: GLuint) -> GLuint {
    let mut fbo = 0;
    unsafe {
        gl::GenFramebuffers(1, &mut fbo);
        gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
        gl::FramebufferTexture2D(
            gl::FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            att,
            0,
        );
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
    }
    fbo
}
