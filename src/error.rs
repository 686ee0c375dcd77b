use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("model error: {0}")]
    Model(#[from] ort::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

pub type Result<T> = std::result::Result<T, InspectorError>;
