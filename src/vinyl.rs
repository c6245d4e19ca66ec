use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

/// Two degrees per tick, counting the angle down; the platter turns the
/// same way as the original turntable animation.
pub const DEFAULT_STEP_DEGREES: f32 = -2.0;

/// Channel threshold above which a texture pixel counts as background
/// white and is knocked out to transparent.
const WHITE_CUTOFF: u8 = 200;

/// Spinning-disc decoration. Holds an upright base frame and an
/// accumulating angle, wrapped modulo 360; playback state never touches it
/// except through the center label, which changes only on track change.
pub struct VinylSpin {
    base: RgbaImage,
    angle: f32,
    step: f32,
    label: String,
}

impl VinylSpin {
    /// Procedurally drawn disc, used when no texture file is configured.
    pub fn new(size: u32, step: f32) -> Self {
        Self {
            base: draw_disc(size.max(2)),
            angle: 0.0,
            step,
            label: String::new(),
        }
    }

    /// Load a disc texture from disk, knocking out near-white background
    /// pixels so the disc keeps a round silhouette on any backdrop.
    pub fn from_texture(path: &Path, size: u32, step: f32) -> Result<Self> {
        let img = image::open(path)
            .with_context(|| format!("cannot open vinyl texture {}", path.display()))?;
        let mut rgba = img
            .resize_exact(size.max(2), size.max(2), image::imageops::FilterType::Lanczos3)
            .to_rgba8();
        for pixel in rgba.pixels_mut() {
            let [r, g, b, _] = pixel.0;
            if r > WHITE_CUTOFF && g > WHITE_CUTOFF && b > WHITE_CUTOFF {
                *pixel = Rgba([255, 255, 255, 0]);
            }
        }
        Ok(Self {
            base: rgba,
            angle: 0.0,
            step,
            label: String::new(),
        })
    }

    /// One animation tick: advance and wrap the angle.
    pub fn tick(&mut self) {
        self.angle = (self.angle + self.step).rem_euclid(360.0);
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Center label, updated only on track change.
    pub fn set_label(&mut self, title: &str, artist: &str) {
        self.label = format!("{title}\n{artist}");
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The current frame: the base disc rotated to the current angle.
    pub fn frame(&self) -> RgbaImage {
        rotate(&self.base, self.angle)
    }
}

/// Rotate around the image center with inverse nearest-neighbor mapping.
/// Pixels sampled from outside the source stay transparent.
fn rotate(src: &RgbaImage, degrees: f32) -> RgbaImage {
    let (w, h) = src.dimensions();
    let cx = (w as f32 - 1.0) / 2.0;
    let cy = (h as f32 - 1.0) / 2.0;
    let (sin, cos) = degrees.to_radians().sin_cos();
    let mut out = RgbaImage::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let sx = (cos * dx + sin * dy + cx).round();
            let sy = (-sin * dx + cos * dy + cy).round();
            if sx >= 0.0 && sy >= 0.0 && (sx as u32) < w && (sy as u32) < h {
                out.put_pixel(x, y, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }

    out
}

/// A grooved black disc with a label ring and spindle hole, transparent
/// outside the rim.
fn draw_disc(size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let center = (size as f32 - 1.0) / 2.0;
    let rim = center;
    let label_radius = rim * 0.32;
    let hole_radius = rim * 0.04;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let r = (dx * dx + dy * dy).sqrt();

            let pixel = if r > rim {
                Rgba([0, 0, 0, 0])
            } else if r <= hole_radius {
                Rgba([0, 0, 0, 0])
            } else if r <= label_radius {
                // Label: two tones so the spin is visible.
                if dx.atan2(dy) > 0.0 {
                    Rgba([168, 50, 60, 255])
                } else {
                    Rgba([140, 36, 46, 255])
                }
            } else {
                // Grooves: alternating dark rings.
                let band = (r - label_radius) as u32 / 3;
                if band % 2 == 0 {
                    Rgba([24, 24, 24, 255])
                } else {
                    Rgba([38, 38, 38, 255])
                }
            };
            img.put_pixel(x, y, pixel);
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_accumulates_and_wraps() {
        let mut v = VinylSpin::new(16, DEFAULT_STEP_DEGREES);
        assert_eq!(v.angle(), 0.0);
        v.tick();
        // The default step counts down and wraps straight into [0, 360).
        assert_eq!(v.angle(), 358.0);
        for _ in 0..179 {
            v.tick();
        }
        // 180 ticks of 2 degrees land back on zero.
        assert!(v.angle().abs() < 1e-3);
    }

    #[test]
    fn positive_step_wraps_at_360() {
        let mut v = VinylSpin::new(16, 2.0);
        v.tick();
        assert_eq!(v.angle(), 2.0);
        for _ in 0..179 {
            v.tick();
        }
        assert!(v.angle().abs() < 1e-3);
    }

    #[test]
    fn frame_keeps_dimensions() {
        let mut v = VinylSpin::new(21, 7.0);
        v.tick();
        let frame = v.frame();
        assert_eq!(frame.dimensions(), (21, 21));
    }

    #[test]
    fn zero_rotation_is_identity() {
        let v = VinylSpin::new(17, DEFAULT_STEP_DEGREES);
        assert_eq!(v.frame(), draw_disc(17));
    }

    #[test]
    fn disc_corners_are_transparent() {
        let disc = draw_disc(32);
        assert_eq!(disc.get_pixel(0, 0)[3], 0);
        assert_eq!(disc.get_pixel(31, 31)[3], 0);
        // Center of the rim band is opaque.
        assert_eq!(disc.get_pixel(15, 2)[3], 255);
    }

    #[test]
    fn label_only_changes_when_asked() {
        let mut v = VinylSpin::new(16, DEFAULT_STEP_DEGREES);
        v.set_label("Song", "Artist");
        let before = v.label().to_string();
        v.tick();
        v.tick();
        assert_eq!(v.label(), before);
        v.set_label("Other", "Artist");
        assert_eq!(v.label(), "Other\nArtist");
    }
}
