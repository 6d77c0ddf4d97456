use crate::rendering::shader::ShaderStage;
use crate::utils::constants::MAX_PALETTE_ENTRIES;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while creating GPU resources.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The image decoder rejected the file in every pixel format we tried.
    #[error("failed to decode image {path:?}: {reason}")]
    ImageDecode { path: PathBuf, reason: String },
    /// A shader stage failed to compile; carries the driver's info log.
    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    /// The shader program failed to link; carries the driver's info log.
    #[error("shader program failed to link:\n{log}")]
    ProgramLink { log: String },
}

/// Returned when a palette already holds ``MAX_PALETTE_ENTRIES`` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("palette already holds the maximum of {MAX_PALETTE_ENTRIES} entries")]
pub struct PaletteFull;
