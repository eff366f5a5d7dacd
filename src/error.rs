use thiserror::Error;

/// Failures reported by the extraction engine.
///
/// None of these are retried internally. A retry normally means taking a
/// new screenshot, which is the caller's decision.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    /// An edge or corner search exhausted its search space.
    #[error("Target not found: {0}")]
    NotFound(String),

    /// A seven-segment bit pattern that maps to no known character.
    #[error("Unknown segment pattern: {mask:#09b}")]
    DecodeError { mask: u8 },

    /// A recogniser with no viable candidates, or an invalid template setup.
    #[error("Recognition failed: {0}")]
    RecognitionFailure(String),

    #[error("Sample size {sample_width}x{sample_height} does not match subject {subject_width}x{subject_height}")]
    SizeMismatch {
        subject_width: u32,
        subject_height: u32,
        sample_width: u32,
        sample_height: u32,
    },
}

pub type Result<T> = std::result::Result<T, VisionError>;
