use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Frame dimensions mismatch: expected {expected:?}, got {actual:?}")]
    FrameDims {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Calibration Error: {0}")]
    Calibration(String),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "opencv")]
    #[error("OpenCV Error: {0}")]
    OpenCv(#[from] opencv::Error),
}
