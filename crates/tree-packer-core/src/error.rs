use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreePackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("No space left on the canvas for a {width}x{height} rectangle")]
    CanvasFull { width: u32, height: u32 },
    #[error("Destination texture is not bound")]
    NotBound,
    #[error("Invalid rectangle size {width}x{height}: both sides must be > 0")]
    InvalidSize { width: u32, height: u32 },
    #[error("Payload has {actual} bytes, expected {expected}")]
    PayloadSize { expected: usize, actual: usize },
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Invalid tile id {id} (sheet has {total} tiles)")]
    InvalidTileId { id: usize, total: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TreePackerError>;
