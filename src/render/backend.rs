//! Rendering backend trait and shared types.
//!
//! The [`RenderBackend`] trait is the single seam between the pipeline and the
//! engine that turns SVG into pixels. The production implementation is
//! [`ChromeBackend`](super::chrome::ChromeBackend); tests use the
//! `MockBackend` below.
//!
//! Every backend's output goes through [`check_png`] before it reaches the
//! writer, so an empty or mis-sized capture is a [`RenderError`] instead of a
//! broken file on disk.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("could not start the browser: {0}")]
    Launch(String),
    #[error("could not load the SVG into the page: {0}")]
    Page(String),
    #[error("page did not settle: {0}")]
    Unstable(String),
    #[error("screenshot failed: {0}")]
    Capture(String),
    #[error("screenshot is empty")]
    EmptyImage,
    #[error("screenshot is not a readable PNG: {0}")]
    InvalidPng(String),
    #[error("screenshot is {}x{}, expected {}x{}", .actual.0, .actual.1, .expected.0, .expected.1)]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Capture rectangle in CSS pixels. Captures are taken at scale 1, so the
/// PNG is `width`×`height` pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    pub x: f64,
    pub y: f64,
    pub width: u32,
    pub height: u32,
}

impl Clip {
    /// A `width`×`height` rectangle offset by `inset` on both axes.
    pub fn for_size(width: u32, height: u32, inset: f64) -> Self {
        Self {
            x: inset,
            y: inset,
            width,
            height,
        }
    }

    /// Smallest viewport that contains the whole clip.
    pub fn viewport(&self) -> (u32, u32) {
        (
            (self.x + self.width as f64).ceil() as u32,
            (self.y + self.height as f64).ceil() as u32,
        )
    }
}

/// Turns an SVG document into PNG bytes.
pub trait RenderBackend {
    /// Render `svg` and capture the `clip` rectangle as a PNG.
    fn render(&self, svg: &[u8], clip: Clip) -> Result<Vec<u8>, RenderError>;
}

impl<T: RenderBackend + ?Sized> RenderBackend for &T {
    fn render(&self, svg: &[u8], clip: Clip) -> Result<Vec<u8>, RenderError> {
        (**self).render(svg, clip)
    }
}

/// Check that `png` decodes as a PNG of exactly the clip's size.
pub fn check_png(png: &[u8], clip: Clip) -> Result<(), RenderError> {
    if png.is_empty() {
        return Err(RenderError::EmptyImage);
    }
    let actual = ImageReader::with_format(Cursor::new(png), ImageFormat::Png)
        .into_dimensions()
        .map_err(|e| RenderError::InvalidPng(e.to_string()))?;
    let expected = (clip.width, clip.height);
    if actual != expected {
        return Err(RenderError::SizeMismatch { expected, actual });
    }
    Ok(())
}
