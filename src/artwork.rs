//! Album art prepared for the radial canvas.
//!
//! The image is scaled once to a fixed grid and turned into point groups
//! keyed by quantized color, so a frame draws one `Points` batch per color
//! instead of one call per pixel. Two precomposited variants exist: the
//! bright one shown while idle, and the scrim-dimmed one the spokes draw
//! over once the overlay is on.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;
use image::imageops::FilterType;
use ratatui::style::Color;

use crate::visualizers::radial::CANVAS_UNITS;

/// Pixel grid the art is downsampled to.
const ART_GRID: u32 = 100;

/// Channel bucket width for grouping. Terminal cells cannot show the full
/// photo anyway; 32 levels keeps the group count bounded.
const COLOR_STEP: u8 = 32;

/// Opacity of the translucent black laid over the art behind the spokes.
/// Cells have no alpha, so it is precomposited as a brightness multiply.
const SCRIM_ALPHA: f32 = 0.6;

type PointGroups = Vec<(Color, Vec<(f64, f64)>)>;

pub struct Artwork {
    bright: PointGroups,
    dimmed: PointGroups,
}

impl Artwork {
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        Ok(Self::from_image(&img))
    }

    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img
            .resize_exact(ART_GRID, ART_GRID, FilterType::Triangle)
            .to_rgb8();
        let cell = CANVAS_UNITS / ART_GRID as f64;
        let mut bright: BTreeMap<(u8, u8, u8), Vec<(f64, f64)>> = BTreeMap::new();
        let mut dimmed: BTreeMap<(u8, u8, u8), Vec<(f64, f64)>> = BTreeMap::new();

        for (x, y, pixel) in rgb.enumerate_pixels() {
            // Image rows grow downward, canvas y grows upward.
            let px = (x as f64 + 0.5) * cell;
            let py = CANVAS_UNITS - (y as f64 + 0.5) * cell;
            let [r, g, b] = pixel.0;
            bright.entry(quantize(r, g, b)).or_default().push((px, py));
            dimmed
                .entry(quantize(dim(r), dim(g), dim(b)))
                .or_default()
                .push((px, py));
        }

        Self {
            bright: into_groups(bright),
            dimmed: into_groups(dimmed),
        }
    }

    /// Point groups in a stable order, dimmed for the overlay state.
    pub fn points(&self, dimmed: bool) -> &[(Color, Vec<(f64, f64)>)] {
        if dimmed { &self.dimmed } else { &self.bright }
    }
}

fn quantize(r: u8, g: u8, b: u8) -> (u8, u8, u8) {
    let q = |v: u8| (v / COLOR_STEP) * COLOR_STEP + COLOR_STEP / 2;
    (q(r), q(g), q(b))
}

fn dim(v: u8) -> u8 {
    (v as f32 * (1.0 - SCRIM_ALPHA)) as u8
}

fn into_groups(map: BTreeMap<(u8, u8, u8), Vec<(f64, f64)>>) -> PointGroups {
    map.into_iter()
        .map(|((r, g, b), coords)| (Color::Rgb(r, g, b), coords))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn two_tone_image() -> DynamicImage {
        let img = RgbImage::from_fn(8, 8, |x, _| {
            if x < 4 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn groups_cover_the_canvas_in_bounds() {
        let art = Artwork::from_image(&two_tone_image());
        let mut total = 0;
        for (_, coords) in art.points(false) {
            for &(x, y) in coords {
                assert!((0.0..=CANVAS_UNITS).contains(&x));
                assert!((0.0..=CANVAS_UNITS).contains(&y));
            }
            total += coords.len();
        }
        assert_eq!(total, (ART_GRID * ART_GRID) as usize);
    }

    #[test]
    fn dimmed_variant_is_darker() {
        let art = Artwork::from_image(&two_tone_image());
        let sum = |groups: &[(Color, Vec<(f64, f64)>)]| -> u64 {
            groups
                .iter()
                .map(|(color, coords)| {
                    let Color::Rgb(r, g, b) = color else {
                        panic!("expected rgb colors")
                    };
                    (*r as u64 + *g as u64 + *b as u64) * coords.len() as u64
                })
                .sum()
        };
        assert!(sum(art.points(true)) < sum(art.points(false)));
    }

    #[test]
    fn group_order_is_deterministic() {
        let a = Artwork::from_image(&two_tone_image());
        let b = Artwork::from_image(&two_tone_image());
        let colors = |art: &Artwork| -> Vec<Color> {
            art.points(false).iter().map(|(c, _)| *c).collect()
        };
        assert_eq!(colors(&a), colors(&b));
        // Resampling blends the seam, so at least the two source colors.
        assert!(a.points(false).len() >= 2);
    }

    #[test]
    fn quantize_buckets_are_centered() {
        assert_eq!(quantize(0, 31, 32), (16, 16, 48));
        assert_eq!(quantize(255, 255, 255), (240, 240, 240));
    }
}
