// directory paths
macro_rules! shader_path {
    ($file:literal) => {
        concat!(
            concat!(env!("CARGO_MANIFEST_DIR"), "/assets/shaders/"),
            $file
        )
    };
}

// shader files
pub(crate) const SPRITE_VERT: &str = include_str!(shader_path!("sprite.vert"));
pub(crate) const SPRITE_FRAG: &str = include_str!(shader_path!("sprite.frag"));
