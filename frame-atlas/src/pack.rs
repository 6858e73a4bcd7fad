use serde::{Deserialize, Serialize};

use crate::{Atlas, Error, PackOptions, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub page: usize,
    /// Position of the item itself, padding excluded.
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub bin: Size,
    pub pages: usize,
    /// One entry per input item, in input order.
    pub placements: Vec<Placement>,
}

impl Layout {
    pub fn page_placements(&self, page: usize) -> impl Iterator<Item = (usize, &Placement)> + '_ {
        self.placements
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.page == page)
    }

    /// Used area of every page over its bin area.
    pub fn occupancy(&self) -> f32 {
        let total = self.bin.area() * self.pages as u64;
        if total == 0 {
            return 0.0;
        }
        let used: u64 = self.placements.iter().map(|p| p.rect.area()).sum();
        (used as f64 / total as f64) as f32
    }
}

/// Lays `sizes` out over as many bins as needed, in input order.
///
/// Items are placed into the current bin until one does not fit. That bin
/// is then flushed as a finished page, the atlas is reset and the same item
/// is tried again on the fresh page.
pub fn pack(sizes: &[Size], options: &PackOptions) -> Result<Layout, Error> {
    options.validate()?;
    let bin = options.bin();
    let mut atlas = Atlas::with_options(bin.width, bin.height, options);
    let mut page = 0;
    let mut placements = Vec::with_capacity(sizes.len());

    for (index, size) in sizes.iter().enumerate() {
        if size.is_empty() {
            return Err(Error::EmptyItem { index });
        }
        let padded = size.padded(options.padding);
        if !padded.fits_in(bin) {
            return Err(Error::TooLarge {
                index,
                size: *size,
                bin,
            });
        }

        let mut rect = atlas.find(padded);
        if rect.is_empty() {
            log::debug!(
                "page {} full at {:.1}% after {} items, starting page {}",
                page,
                atlas.occupancy() * 100.0,
                atlas.used().len(),
                page + 1
            );
            atlas.reset(bin.width, bin.height);
            page += 1;
            rect = atlas.find(padded);
        }
        // an empty bin always holds anything that fits in it
        debug_assert!(!rect.is_empty());

        placements.push(Placement {
            page,
            rect: rect.inset(options.padding),
        });
    }

    let pages = if placements.is_empty() { 0 } else { page + 1 };
    Ok(Layout {
        bin,
        pages,
        placements,
    })
}
