/// The maximum number of replacement pairs a palette can hold. Mirrored by
/// the uniform array sizes in the fragment shader.
pub const MAX_PALETTE_ENTRIES: usize = 256;

/// Texture units the two samplers are pinned to.
pub(crate) const CANVAS_TEXTURE_UNIT: u32 = 0;
pub(crate) const MEDIUM_TEXTURE_UNIT: u32 = 1;

/// Edge length of the placeholder source texture backing empty sprites. The
/// shader samples both its samplers unconditionally, so even an image-less
/// sprite keeps a complete texture bindable; the content is never drawn.
pub(crate) const EMPTY_SOURCE_SIZE: u32 = 2;

/// Mix value for the screen path, where both samplers bind the same texture
/// and the blend factor cancels out.
pub(crate) const SCREEN_MIX: f32 = 0.5;
