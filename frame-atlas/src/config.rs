//! Options shared by the single-bin [`Atlas`](crate::Atlas) and the
//! multi-page layout. They can be loaded from a JSON file, missing fields
//! take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Size};

/// How [`Atlas::find`](crate::Atlas::find) scores the free rects that can hold
/// a request. Lower scores win and ties go to the earlier free rect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FitHeuristic {
    /// Smallest leftover area, then smallest leftover short side.
    #[default]
    BestAreaFit,
    /// Smallest leftover short side, then smallest leftover long side.
    BestShortSideFit,
    /// First free rect that fits.
    FirstFit,
}

/// Which way the chosen free rect is cut after a placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitRule {
    #[default]
    ShorterLeftoverAxis,
    LongerLeftoverAxis,
    /// The bottom residual spans the full free rect width.
    Horizontal,
    /// The right residual spans the full free rect height.
    Vertical,
}

impl SplitRule {
    /// Returns true when the split should be horizontal for a request of
    /// `placed` inside `free`.
    pub fn is_horizontal(self, free: Size, placed: Size) -> bool {
        let leftover_w = free.width - placed.width;
        let leftover_h = free.height - placed.height;
        match self {
            SplitRule::ShorterLeftoverAxis => leftover_w <= leftover_h,
            SplitRule::LongerLeftoverAxis => leftover_w > leftover_h,
            SplitRule::Horizontal => true,
            SplitRule::Vertical => false,
        }
    }
}

/// Largest bin side accepted, the common GPU texture size limit.
pub const MAX_SIZE: u32 = 16384;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackOptions {
    /// Width and height of every bin.
    pub size: u32,
    /// Transparent border added on every side of a packed image.
    pub padding: u32,
    pub heuristic: FitHeuristic,
    pub split: SplitRule,
    /// Merge free rects that share a full edge after every placement.
    pub merge_free: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            size: 1024,
            padding: 0,
            heuristic: FitHeuristic::default(),
            split: SplitRule::default(),
            merge_free: false,
        }
    }
}

impl PackOptions {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let options: PackOptions = serde_json::from_str(&raw)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.size == 0 {
            return Err(Error::InvalidOptions("size must be > 0".into()));
        }
        if self.size > MAX_SIZE {
            return Err(Error::InvalidOptions(format!(
                "size {} exceeds the maximum of {}",
                self.size, MAX_SIZE
            )));
        }
        if self.padding.saturating_mul(2) >= self.size {
            return Err(Error::InvalidOptions(format!(
                "padding {} leaves no room in a {} bin",
                self.padding, self.size
            )));
        }
        Ok(())
    }

    pub fn bin(&self) -> Size {
        Size::new(self.size, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: PackOptions = serde_json::from_str(r#"{ "size": 256 }"#).unwrap();
        assert_eq!(options.size, 256);
        assert_eq!(options.padding, 0);
        assert_eq!(options.heuristic, FitHeuristic::BestAreaFit);
        assert_eq!(options.split, SplitRule::ShorterLeftoverAxis);
        assert!(!options.merge_free);
    }

    #[test]
    fn enums_use_kebab_case() {
        let options: PackOptions = serde_json::from_str(
            r#"{ "heuristic": "best-short-side-fit", "split": "vertical", "merge_free": true }"#,
        )
        .unwrap();
        assert_eq!(options.heuristic, FitHeuristic::BestShortSideFit);
        assert_eq!(options.split, SplitRule::Vertical);
        assert!(options.merge_free);
    }

    #[test]
    fn validate_rejects_degenerate_bins() {
        let zero = PackOptions {
            size: 0,
            ..Default::default()
        };
        assert!(matches!(zero.validate(), Err(Error::InvalidOptions(_))));

        let fat_padding = PackOptions {
            size: 16,
            padding: 8,
            ..Default::default()
        };
        assert!(matches!(fat_padding.validate(), Err(Error::InvalidOptions(_))));
        assert!(PackOptions::default().validate().is_ok());
    }

    #[test]
    fn validate_caps_bin_size() {
        let huge = PackOptions {
            size: u32::MAX,
            ..Default::default()
        };
        assert!(matches!(huge.validate(), Err(Error::InvalidOptions(_))));

        let over = PackOptions {
            size: MAX_SIZE + 1,
            ..Default::default()
        };
        assert!(matches!(over.validate(), Err(Error::InvalidOptions(_))));

        let max = PackOptions {
            size: MAX_SIZE,
            ..Default::default()
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "size": 512, "padding": 2 }"#).expect("write options");

        let options = PackOptions::load(&path).expect("load options");
        assert_eq!(options.bin(), Size::new(512, 512));
        assert_eq!(options.padding, 2);
    }

    #[test]
    fn load_validates() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{ "size": 0 }"#).expect("write options");

        assert!(matches!(PackOptions::load(&path), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn shorter_leftover_axis() {
        let free = Size::new(100, 100);
        assert!(SplitRule::ShorterLeftoverAxis.is_horizontal(free, Size::new(40, 40)));
        assert!(SplitRule::ShorterLeftoverAxis.is_horizontal(free, Size::new(90, 10)));
        assert!(!SplitRule::ShorterLeftoverAxis.is_horizontal(free, Size::new(10, 90)));
        assert!(!SplitRule::LongerLeftoverAxis.is_horizontal(free, Size::new(90, 10)));
    }
}
