use std::path::PathBuf;

use crate::Size;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("item {index} ({}x{}) does not fit in a {}x{} bin", .size.width, .size.height, .bin.width, .bin.height)]
    TooLarge { index: usize, size: Size, bin: Size },
    #[error("item {index} has a zero dimension")]
    EmptyItem { index: usize },
    #[error("invalid pack options: {0}")]
    InvalidOptions(String),
    #[error("no images found in {}", .0.display())]
    NoImages(PathBuf),
}
