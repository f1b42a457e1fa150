use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use image::{DynamicImage, ImageFormat};

/// Decoded pixels ready for upload, plus the source's natural size.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub natural_w: u32,
    pub natural_h: u32,
}

/// Resolves a media URL to a local path. Only plain paths and `file://` URLs
/// are loadable; remote schemes return `None`.
pub fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if url.contains("://") || url.is_empty() {
        return None;
    }
    Some(PathBuf::from(url))
}

pub fn open_image(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read image: {:?}", path))?;
    let format = image::guess_format(&bytes).ok();

    if format == Some(ImageFormat::Gif) {
        return first_gif_frame(bytes, path);
    }

    match format {
        Some(fmt) => image::load_from_memory_with_format(&bytes, fmt)
            .with_context(|| format!("Failed to decode image: {:?}", path)),
        None => image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode image: {:?}", path)),
    }
}

/// Decodes an image and downsizes it so neither edge exceeds `max_edge`.
pub fn decode_for_display(path: &Path, max_edge: u32) -> Result<DecodedImage> {
    let img = open_image(path)?;
    let (natural_w, natural_h) = (img.width(), img.height());
    if natural_w == 0 || natural_h == 0 {
        bail!("Image has empty dimensions: {:?}", path);
    }
    let display = if natural_w > max_edge || natural_h > max_edge {
        img.thumbnail(max_edge, max_edge)
    } else {
        img
    };
    let (width, height) = (display.width(), display.height());
    Ok(DecodedImage {
        rgba: display.to_rgba8().into_raw(),
        width,
        height,
        natural_w,
        natural_h,
    })
}

fn first_gif_frame(bytes: Vec<u8>, path: &Path) -> Result<DynamicImage> {
    let decoder = GifDecoder::new(Cursor::new(bytes))
        .with_context(|| format!("Failed to decode GIF: {:?}", path))?;
    let mut frames = decoder.into_frames();
    if let Some(frame) = frames.next() {
        let frame = frame.context("Failed to decode GIF frame")?;
        return Ok(DynamicImage::ImageRgba8(frame.into_buffer()));
    }
    Err(anyhow!("GIF has no frames: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_local_path() {
        assert_eq!(local_path("a/b.png"), Some(PathBuf::from("a/b.png")));
        assert_eq!(local_path("file:///tmp/x.jpg"), Some(PathBuf::from("/tmp/x.jpg")));
        assert_eq!(local_path("https://cdn.test/x.jpg"), None);
        assert_eq!(local_path(""), None);
    }

    #[test]
    fn test_decode_for_display_downsizes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.png");
        write_png(&path, 400, 200);

        let decoded = decode_for_display(&path, 100).unwrap();
        assert_eq!((decoded.natural_w, decoded.natural_h), (400, 200));
        assert_eq!((decoded.width, decoded.height), (100, 50));
        assert_eq!(decoded.rgba.len(), 100 * 50 * 4);
    }

    #[test]
    fn test_missing_and_corrupt_files_error() {
        let dir = tempdir().unwrap();
        assert!(open_image(&dir.path().join("missing.png")).is_err());
        assert!(decode_for_display(&dir.path().join("missing.png"), 64).is_err());

        let junk = dir.path().join("junk.png");
        std::fs::write(&junk, b"not an image").unwrap();
        assert!(open_image(&junk).is_err());
    }
}
