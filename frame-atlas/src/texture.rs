use std::path::{Path, PathBuf};

use image::{ImageError, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::{pack, Error, PackOptions, Rect, Size, UvRect};

pub const METADATA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedFrame {
    pub name: String,
    pub page: usize,
    pub rect: Rect,
    pub uv: UvRect,
}

/// Describes a saved [`TexturePack`]: page file names relative to the
/// metadata file and where every frame ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasMetadata {
    pub version: u32,
    pub bin: Size,
    pub pages: Vec<String>,
    pub frames: Vec<PackedFrame>,
}

impl AtlasMetadata {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Page bitmaps with a set of named frames composited into them.
#[derive(Debug, Clone)]
pub struct TexturePack {
    bin: Size,
    pub pages: Vec<RgbaImage>,
    pub frames: Vec<PackedFrame>,
}

impl TexturePack {
    pub fn pack_images(images: Vec<(String, RgbaImage)>, options: PackOptions) -> Result<Self, Error> {
        let sizes = images
            .iter()
            .map(|(_, img)| Size::new(img.width(), img.height()))
            .collect::<Vec<_>>();
        let layout = pack(&sizes, &options)?;
        let bin = layout.bin;

        let mut pages = (0..layout.pages)
            .map(|_| RgbaImage::new(bin.width, bin.height))
            .collect::<Vec<_>>();
        let mut frames = Vec::with_capacity(images.len());
        for ((name, img), placement) in images.into_iter().zip(&layout.placements) {
            let rect = placement.rect;
            image::imageops::replace(&mut pages[placement.page], &img, rect.x as i64, rect.y as i64);
            frames.push(PackedFrame {
                name,
                page: placement.page,
                rect,
                uv: rect.uv(bin),
            });
        }

        log::info!(
            "packed {} frames into {} page(s) of {}x{} ({:.1}% occupancy)",
            frames.len(),
            pages.len(),
            bin.width,
            bin.height,
            layout.occupancy() * 100.0
        );
        Ok(Self { bin, pages, frames })
    }

    /// Packs every image file directly inside `path`, ordered by file name.
    /// Frames are named after the file stem.
    pub fn pack_folder<P: AsRef<Path>>(path: P, options: PackOptions) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut files = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.is_file())
            .collect::<Vec<_>>();
        files.sort();

        let mut images: Vec<(String, RgbaImage)> = Vec::new();
        for file in files {
            if ImageFormat::from_path(&file).is_err() {
                log::warn!("skipping {}: not an image", file.display());
                continue;
            }
            let img = match image::open(&file) {
                Ok(img) => img.to_rgba8(),
                Err(e @ (ImageError::Unsupported(_) | ImageError::Decoding(_))) => {
                    log::warn!("skipping {}: {}", file.display(), e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let name = file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("frame")
                .to_string();
            if images.iter().any(|(n, _)| *n == name) {
                log::warn!(
                    "{} shares the frame name {:?} with an earlier file",
                    file.display(),
                    name
                );
            }
            images.push((name, img));
        }

        if images.is_empty() {
            return Err(Error::NoImages(path.to_path_buf()));
        }
        Self::pack_images(images, options)
    }

    pub fn bin(&self) -> Size {
        self.bin
    }

    pub fn frame(&self, name: &str) -> Option<&PackedFrame> {
        self.frames.iter().find(|f| f.name == name)
    }

    pub fn metadata(&self, stem: &str) -> AtlasMetadata {
        AtlasMetadata {
            version: METADATA_VERSION,
            bin: self.bin,
            pages: (0..self.pages.len())
                .map(|i| format!("{stem}_{i}.png"))
                .collect(),
            frames: self.frames.clone(),
        }
    }

    /// Writes `{stem}_{page}.png` for every page and `{stem}.json` into `dir`.
    /// Returns the written paths, metadata last.
    pub fn save<P: AsRef<Path>>(&self, dir: P, stem: &str) -> Result<Vec<PathBuf>, Error> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let metadata = self.metadata(stem);
        let mut written = Vec::with_capacity(self.pages.len() + 1);
        for (page, file_name) in self.pages.iter().zip(&metadata.pages) {
            let path = dir.join(file_name);
            page.save_with_format(&path, ImageFormat::Png)?;
            written.push(path);
        }

        let path = dir.join(format!("{stem}.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&metadata)?)?;
        written.push(path);
        Ok(written)
    }
}
