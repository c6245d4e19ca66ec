use image::{DynamicImage, GenericImageView, RgbaImage};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use reqwest::Client;
use thiserror::Error;

/// Pixels below this alpha render as empty terminal cells.
const ALPHA_CUTOFF: u8 = 16;

#[derive(Debug, Error)]
pub enum ArtError {
    #[error("artwork request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("artwork decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ArtError> {
    Ok(image::load_from_memory(bytes)?)
}

/// High-quality square resize, done once per successful fetch. Per-frame
/// terminal scaling uses a cheaper filter in the render helpers below.
pub fn resize_square(img: &DynamicImage, size: u32) -> DynamicImage {
    img.resize_exact(size, size, image::imageops::FilterType::Lanczos3)
}

/// Downloads and decodes album art. Non-success statuses and transport
/// failures surface as `ArtError::Network`, malformed bytes as
/// `ArtError::Decode`.
pub struct ArtFetcher {
    client: Client,
}

impl ArtFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str, size: u32) -> Result<DynamicImage, ArtError> {
        let resp = self.client.get(url).send().await?.error_for_status()?;
        let bytes = resp.bytes().await?;
        let img = decode(&bytes)?;
        Ok(resize_square(&img, size))
    }
}

/// Render an image into terminal lines using upper-half-block cells:
/// each character row carries two pixel rows (fg = top, bg = bottom).
pub fn render_half_blocks(img: &DynamicImage, cols: u16, rows: u16) -> Vec<Line<'static>> {
    let cols = cols.max(1) as u32;
    let pixel_rows = (rows.max(1) as u32) * 2;
    let resized = img.resize_exact(cols, pixel_rows, image::imageops::FilterType::Triangle);
    rgba_to_lines(&resized.to_rgba8())
}

/// Same cell encoding for an RGBA frame that already has the target
/// dimensions (the vinyl frame). Transparent pixels become blank cells so
/// the disc keeps its round silhouette.
pub fn render_rgba_half_blocks(img: &RgbaImage, cols: u16, rows: u16) -> Vec<Line<'static>> {
    let cols = cols.max(1) as u32;
    let pixel_rows = (rows.max(1) as u32) * 2;
    let resized = image::imageops::resize(
        img,
        cols,
        pixel_rows,
        image::imageops::FilterType::Triangle,
    );
    rgba_to_lines(&resized)
}

fn rgba_to_lines(img: &RgbaImage) -> Vec<Line<'static>> {
    let (width, height) = img.dimensions();
    let mut lines = Vec::with_capacity((height / 2) as usize);

    for y in (0..height.saturating_sub(height % 2)).step_by(2) {
        let mut spans: Vec<Span> = Vec::with_capacity(width as usize);
        for x in 0..width {
            let top = img.get_pixel(x, y);
            let bottom = img.get_pixel(x, y + 1);
            let top_visible = top[3] >= ALPHA_CUTOFF;
            let bottom_visible = bottom[3] >= ALPHA_CUTOFF;

            let span = match (top_visible, bottom_visible) {
                (false, false) => Span::raw(" "),
                (true, false) => Span::styled(
                    "▀",
                    Style::default().fg(Color::Rgb(top[0], top[1], top[2])),
                ),
                (false, true) => Span::styled(
                    "▄",
                    Style::default().fg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
                ),
                (true, true) => Span::styled(
                    "▀",
                    Style::default()
                        .fg(Color::Rgb(top[0], top[1], top[2]))
                        .bg(Color::Rgb(bottom[0], bottom[1], bottom[2])),
                ),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    lines
}
