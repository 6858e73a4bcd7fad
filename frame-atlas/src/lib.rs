mod atlas;
mod config;
mod error;
mod pack;
mod rect;
mod texture;
pub mod animation;

pub use atlas::*;
pub use config::*;
pub use error::*;
pub use pack::*;
pub use rect::*;
pub use texture::*;
