//! Animated sprites whose frames share packed texture pages.

use std::io::{BufReader, Read};
use std::path::Path;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbaImage};

use crate::{Error, PackOptions, PackedFrame, TexturePack};

/// Delay used for frames that specify none.
pub const DEFAULT_DELAY_MS: u32 = 100;

#[derive(Debug, Clone)]
pub struct Animation {
    pub pack: TexturePack,
    delays_ms: Vec<u32>,
}

impl Animation {
    /// Packs `frames` in order. Frame `i` is stored in the pack as `"{i}"`.
    pub fn from_frames(frames: Vec<(RgbaImage, u32)>, options: PackOptions) -> Result<Self, Error> {
        let mut delays_ms = Vec::with_capacity(frames.len());
        let images = frames
            .into_iter()
            .enumerate()
            .map(|(i, (img, delay))| {
                delays_ms.push(if delay == 0 { DEFAULT_DELAY_MS } else { delay });
                (i.to_string(), img)
            })
            .collect::<Vec<_>>();
        let pack = TexturePack::pack_images(images, options)?;
        Ok(Self { pack, delays_ms })
    }

    pub fn load_gif<P: AsRef<Path>>(path: P, options: PackOptions) -> Result<Self, Error> {
        let file = std::fs::File::open(path)?;
        Self::from_gif_reader(BufReader::new(file), options)
    }

    pub fn from_gif_reader<R: Read>(reader: R, options: PackOptions) -> Result<Self, Error> {
        let decoder = GifDecoder::new(reader)?;
        let frames = decoder
            .into_frames()
            .collect_frames()?
            .into_iter()
            .map(|frame| {
                let (numer, denom) = frame.delay().numer_denom_ms();
                let delay = if denom == 0 { 0 } else { numer / denom };
                (frame.into_buffer(), delay)
            })
            .collect::<Vec<_>>();
        log::debug!("decoded {} gif frames", frames.len());
        Self::from_frames(frames, options)
    }

    pub fn len(&self) -> usize {
        self.delays_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays_ms.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&PackedFrame> {
        self.pack.frames.get(index)
    }

    pub fn delay_ms(&self, index: usize) -> Option<u32> {
        self.delays_ms.get(index).copied()
    }

    pub fn duration_ms(&self) -> u64 {
        self.delays_ms.iter().map(|d| *d as u64).sum()
    }

    /// Index of the frame on screen `elapsed_ms` into a looping playback.
    pub fn frame_at(&self, elapsed_ms: u64) -> usize {
        let duration = self.duration_ms();
        if duration == 0 {
            return 0;
        }
        let mut t = elapsed_ms % duration;
        for (i, delay) in self.delays_ms.iter().enumerate() {
            if t < *delay as u64 {
                return i;
            }
            t -= *delay as u64;
        }
        self.delays_ms.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, Frame, Rgba};

    fn options(size: u32) -> PackOptions {
        PackOptions {
            size,
            ..Default::default()
        }
    }

    fn frame(shade: u8) -> RgbaImage {
        RgbaImage::from_pixel(8, 8, Rgba([shade, shade, shade, 255]))
    }

    #[test]
    fn playback_loops_over_delays() {
        let frames = vec![(frame(0), 50), (frame(1), 0), (frame(2), 25)];
        let anim = Animation::from_frames(frames, options(64)).unwrap();

        assert_eq!(anim.len(), 3);
        assert_eq!(anim.delay_ms(1), Some(DEFAULT_DELAY_MS));
        assert_eq!(anim.duration_ms(), 175);
        assert_eq!(anim.frame_at(0), 0);
        assert_eq!(anim.frame_at(49), 0);
        assert_eq!(anim.frame_at(50), 1);
        assert_eq!(anim.frame_at(150), 2);
        assert_eq!(anim.frame_at(175), 0);
        assert_eq!(anim.frame(2).unwrap().name, "2");
    }

    #[test]
    fn frames_spill_over_pages_in_order() {
        let frames = (0..6).map(|i| (frame(i), 40)).collect::<Vec<_>>();
        let anim = Animation::from_frames(frames, options(16)).unwrap();

        assert_eq!(anim.pack.pages.len(), 2);
        let pages: Vec<usize> = (0..anim.len()).map(|i| anim.frame(i).unwrap().page).collect();
        assert_eq!(pages, vec![0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn empty_animation_has_no_frames() {
        let anim = Animation::from_frames(Vec::new(), options(16)).unwrap();
        assert!(anim.is_empty());
        assert_eq!(anim.frame_at(1234), 0);
        assert!(anim.pack.pages.is_empty());
    }

    #[test]
    fn decodes_gif_frames_and_delays() {
        let mut bytes = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut bytes);
            encoder
                .encode_frames((0..3u8).map(|i| {
                    Frame::from_parts(frame(i * 100), 0, 0, Delay::from_numer_denom_ms(70, 1))
                }))
                .unwrap();
        }

        let anim = Animation::from_gif_reader(bytes.as_slice(), options(32)).unwrap();
        assert_eq!(anim.len(), 3);
        assert_eq!(anim.delay_ms(0), Some(70));
        assert_eq!(anim.pack.pages.len(), 1);
        for i in 0..3 {
            assert_eq!(anim.frame(i).unwrap().rect.size(), crate::Size::new(8, 8));
        }
    }

    #[test]
    fn load_gif_reports_missing_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = Animation::load_gif(dir.path().join("missing.gif"), options(32));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
