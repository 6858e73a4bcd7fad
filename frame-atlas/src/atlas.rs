use crate::{FitHeuristic, PackOptions, Rect, Size, SplitRule};

/// A single fixed-size bin. Keeps the rects handed out so far and the free
/// space left over, as disjoint guillotine pieces.
///
/// ```
/// use frame_atlas::{Atlas, Size};
///
/// let mut atlas = Atlas::new(100, 100);
/// let a = atlas.find(Size::new(40, 40));
/// assert_eq!((a.x, a.y), (0, 0));
/// assert!(atlas.find(Size::new(70, 70)).is_empty());
///
/// atlas.reset(100, 100);
/// assert!(!atlas.find(Size::new(70, 70)).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atlas {
    size: Size,
    used: Vec<Rect>,
    free: Vec<Rect>,
    heuristic: FitHeuristic,
    split: SplitRule,
    merge_free: bool,
}

impl Atlas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_options(width, height, &PackOptions::default())
    }

    pub fn with_options(width: u32, height: u32, options: &PackOptions) -> Self {
        let mut atlas = Self {
            size: Size::new(width, height),
            used: Vec::new(),
            free: Vec::new(),
            heuristic: options.heuristic,
            split: options.split,
            merge_free: options.merge_free,
        };
        atlas.reset(width, height);
        atlas
    }

    /// Forgets every placement and makes the whole bin free again.
    pub fn reset(&mut self, width: u32, height: u32) {
        self.size = Size::new(width, height);
        self.used.clear();
        self.free.clear();
        let whole = Rect::new(0, 0, width, height);
        if !whole.is_empty() {
            self.free.push(whole);
        }
    }

    /// Reserves a rect of `requested` size and returns where it went.
    ///
    /// Returns an empty rect when no free rect can hold the request; the bin
    /// is left untouched in that case and the caller is expected to start a
    /// new one.
    pub fn find(&mut self, requested: Size) -> Rect {
        if requested.is_empty() {
            return Rect::EMPTY;
        }
        let Some(index) = self.choose(requested) else {
            return Rect::EMPTY;
        };

        let chosen = self.free[index];
        let placed = Rect::from_size(chosen.x, chosen.y, requested);
        let horizontal = self.split.is_horizontal(chosen.size(), requested);

        let mut free = Vec::with_capacity(self.free.len() + 2);
        for (i, rect) in self.free.iter().enumerate() {
            if !rect.intersects(&placed) {
                free.push(*rect);
            } else if i == index {
                split(rect, &placed, horizontal, &mut free);
            } else {
                // only reached when free rects overlap each other
                split(rect, &placed, true, &mut free);
            }
        }
        self.free = free;
        self.used.push(placed);

        self.prune_contained();
        if self.merge_free {
            self.merge_adjacent();
        }
        placed
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn used(&self) -> &[Rect] {
        &self.used
    }

    pub fn free(&self) -> &[Rect] {
        &self.free
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn used_area(&self) -> u64 {
        self.used.iter().map(Rect::area).sum()
    }

    /// Fraction of the bin covered by placed rects.
    pub fn occupancy(&self) -> f32 {
        let total = self.size.area();
        if total == 0 {
            return 0.0;
        }
        (self.used_area() as f64 / total as f64) as f32
    }

    fn choose(&self, requested: Size) -> Option<usize> {
        let mut best: Option<(usize, (u64, u64))> = None;
        for (i, rect) in self.free.iter().enumerate() {
            if !requested.fits_in(rect.size()) {
                continue;
            }
            let leftover_w = (rect.width - requested.width) as u64;
            let leftover_h = (rect.height - requested.height) as u64;
            let score = match self.heuristic {
                FitHeuristic::BestAreaFit => (
                    rect.area() - requested.area(),
                    leftover_w.min(leftover_h),
                ),
                FitHeuristic::BestShortSideFit => (
                    leftover_w.min(leftover_h),
                    leftover_w.max(leftover_h),
                ),
                FitHeuristic::FirstFit => return Some(i),
            };
            // strict compare so the earlier rect wins a tie
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((i, score));
            }
        }
        best.map(|(i, _)| i)
    }

    fn prune_contained(&mut self) {
        let mut i = 0;
        while i < self.free.len() {
            let rect = self.free[i];
            let redundant = self
                .free
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.contains(&rect) && (j < i || *other != rect));
            if redundant {
                self.free.remove(i);
            } else {
                i += 1;
            }
        }
    }

    fn merge_adjacent(&mut self) {
        'restart: loop {
            for i in 0..self.free.len() {
                for j in (i + 1)..self.free.len() {
                    if let Some(merged) = merge(&self.free[i], &self.free[j]) {
                        self.free[i] = merged;
                        self.free.remove(j);
                        continue 'restart;
                    }
                }
            }
            break;
        }
    }
}

/// Pushes the parts of `free` not covered by `placed` as disjoint rects.
/// A horizontal split keeps the bands above and below `placed` at full
/// width, a vertical one keeps the bands left and right at full height.
fn split(free: &Rect, placed: &Rect, horizontal: bool, out: &mut Vec<Rect>) {
    let mut push = |x: u32, y: u32, width: u32, height: u32| {
        if width > 0 && height > 0 {
            out.push(Rect::new(x, y, width, height));
        }
    };

    if horizontal {
        if placed.y > free.y {
            push(free.x, free.y, free.width, placed.y - free.y);
        }
        if placed.bottom() < free.bottom() {
            push(
                free.x,
                placed.bottom(),
                free.width,
                free.bottom() - placed.bottom(),
            );
        }
        let top = free.y.max(placed.y);
        let band = free.bottom().min(placed.bottom()) - top;
        if placed.x > free.x {
            push(free.x, top, placed.x - free.x, band);
        }
        if placed.right() < free.right() {
            push(placed.right(), top, free.right() - placed.right(), band);
        }
    } else {
        if placed.x > free.x {
            push(free.x, free.y, placed.x - free.x, free.height);
        }
        if placed.right() < free.right() {
            push(
                placed.right(),
                free.y,
                free.right() - placed.right(),
                free.height,
            );
        }
        let left = free.x.max(placed.x);
        let band = free.right().min(placed.right()) - left;
        if placed.y > free.y {
            push(left, free.y, band, placed.y - free.y);
        }
        if placed.bottom() < free.bottom() {
            push(left, placed.bottom(), band, free.bottom() - placed.bottom());
        }
    }
}

/// Union of two rects sharing a full edge.
fn merge(a: &Rect, b: &Rect) -> Option<Rect> {
    if a.x == b.x && a.width == b.width {
        if a.bottom() == b.y {
            return Some(Rect::new(a.x, a.y, a.width, a.height + b.height));
        }
        if b.bottom() == a.y {
            return Some(Rect::new(a.x, b.y, a.width, a.height + b.height));
        }
    }
    if a.y == b.y && a.height == b.height {
        if a.right() == b.x {
            return Some(Rect::new(a.x, a.y, a.width + b.width, a.height));
        }
        if b.right() == a.x {
            return Some(Rect::new(b.x, a.y, a.width + b.width, a.height));
        }
    }
    None
}
