use std::io::Cursor;

use anyhow::{Context, Result};
use image::{
    codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView, ImageFormat,
};

#[derive(Debug, Clone)]
pub struct CompressOptions {
    /// Size budget in bytes.
    pub max_size_bytes: usize,
    pub max_width_or_height: u32,
    pub initial_quality: u8,
    /// Quality for the single retry when the first pass is still over budget.
    pub retry_quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_size_bytes: 1024 * 1024,
            max_width_or_height: 1920,
            initial_quality: 80,
            retry_quality: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// The input bytes, untouched.
    Original,
    Jpeg,
    Png,
}

#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_size: usize,
    pub encoding: Encoding,
}

impl CompressedImage {
    pub fn reencoded(&self) -> bool {
        self.encoding != Encoding::Original
    }

    pub fn content_type(&self, original_content_type: &str) -> String {
        match self.encoding {
            Encoding::Original => original_content_type.to_string(),
            Encoding::Jpeg => "image/jpeg".to_string(),
            Encoding::Png => "image/png".to_string(),
        }
    }

    pub fn extension(&self, original_extension: &str) -> String {
        match self.encoding {
            Encoding::Original => original_extension.to_string(),
            Encoding::Jpeg => "jpg".to_string(),
            Encoding::Png => "png".to_string(),
        }
    }
}

/// Downscale and re-encode an image as JPEG until it fits the byte budget.
///
/// Inputs already within budget come back untouched. The longer side of the
/// result never exceeds `max_width_or_height`. Among results that respect it
/// the smallest wins, so an input that already fits the dimensions is never
/// replaced by something larger. Images that JPEG cannot shrink (flat
/// graphics, screenshots) are also tried as PNG after scaling.
pub fn compress_image(input: &[u8], options: &CompressOptions) -> Result<CompressedImage> {
    let img = image::load_from_memory(input).context("Unsupported or corrupt image")?;
    let (width, height) = img.dimensions();

    if input.len() <= options.max_size_bytes {
        return Ok(keep_original(input, width, height));
    }

    let fits_dimensions = width.max(height) <= options.max_width_or_height;
    let scaled = scale_to_fit(img, options.max_width_or_height);
    let (new_width, new_height) = scaled.dimensions();

    let mut jpeg = encode_jpeg(&scaled, options.initial_quality)?;
    if jpeg.len() > options.max_size_bytes {
        log::debug!(
            "JPEG at quality {} is {} bytes, retrying at {}",
            options.initial_quality,
            jpeg.len(),
            options.retry_quality
        );
        jpeg = encode_jpeg(&scaled, options.retry_quality)?;
    }

    let (bytes, encoding) = if jpeg.len() < input.len() {
        (jpeg, Encoding::Jpeg)
    } else {
        let png = encode_png(&scaled)?;
        if png.len() < jpeg.len() {
            (png, Encoding::Png)
        } else {
            (jpeg, Encoding::Jpeg)
        }
    };

    if bytes.len() >= input.len() && fits_dimensions {
        return Ok(keep_original(input, width, height));
    }

    Ok(CompressedImage {
        bytes,
        width: new_width,
        height: new_height,
        original_size: input.len(),
        encoding,
    })
}

fn keep_original(input: &[u8], width: u32, height: u32) -> CompressedImage {
    CompressedImage {
        bytes: input.to_vec(),
        width,
        height,
        original_size: input.len(),
        encoding: Encoding::Original,
    }
}

fn scale_to_fit(img: DynamicImage, max_side: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width.max(height) <= max_side {
        return img;
    }
    img.resize(max_side, max_side, FilterType::Lanczos3)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .context("JPEG encoding failed")?;
    Ok(out.into_inner())
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)
        .context("PNG encoding failed")?;
    Ok(out.into_inner())
}
