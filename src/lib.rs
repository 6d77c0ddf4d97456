pub mod color;
pub mod error;
pub mod palette;
pub mod rendering;
pub mod sprite;
pub mod utils;

pub use env_logger;
pub use gl;
pub use log;
pub use nalgebra_glm as glm;
pub use stb_image;

/// All features that are very common to use.
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::error::{PaletteFull, RenderError};
    pub use crate::glm;
    pub use crate::log;
    pub use crate::palette::Palette;
    pub use crate::rendering::renderer::SpriteRenderer;
    pub use crate::rendering::shader::{ShaderProgram, ShaderStage};
    pub use crate::sprite::{Channel, FrameWindow, PixelFormat, Sprite};
    pub use crate::utils::constants::MAX_PALETTE_ENTRIES;
    pub use crate::utils::tools::*;
    pub use gl::types::*;
}
