//! Image preparation for `/analyze-image`: re-encode until the payload fits the transfer ceiling.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use log::debug;
use std::path::Path;

use crate::error::ServiceError;
use crate::utils::config::ImageConsts;

/// Decode the image at `path` and re-encode it under [`ImageConsts::MAX_BYTES`].
pub fn compress_image(path: &Path) -> Result<Vec<u8>, ServiceError> {
    let reader = ImageReader::open(path)
        .map_err(|e| ServiceError::Image(format!("opening {}: {e}", path.display())))?
        .with_guessed_format()
        .map_err(|e| ServiceError::Image(format!("reading {}: {e}", path.display())))?;
    let format = reader.format();
    let img = reader
        .decode()
        .map_err(|e| ServiceError::Image(format!("decoding {}: {e}", path.display())))?;
    shrink_to_fit(&img, format, ImageConsts::MAX_BYTES)
}

/// Encode `img` (PNG stays PNG, everything else becomes JPEG) and keep lowering JPEG quality,
/// then dimensions, until the bytes fit `max_bytes`. Once a side would drop below
/// [`ImageConsts::MIN_SIDE`] the last encoding is returned as is.
pub fn shrink_to_fit(
    img: &DynamicImage,
    format: Option<ImageFormat>,
    max_bytes: usize,
) -> Result<Vec<u8>, ServiceError> {
    let lossless = matches!(format, Some(ImageFormat::Png));
    let (orig_w, orig_h) = (img.width(), img.height());
    let (mut width, mut height) = (orig_w, orig_h);
    let mut quality = ImageConsts::START_QUALITY;

    loop {
        let resized;
        let current = if (width, height) == (orig_w, orig_h) {
            img
        } else {
            resized = img.resize_exact(width, height, FilterType::Lanczos3);
            &resized
        };
        let buf = encode(current, lossless, quality)?;
        if buf.len() <= max_bytes {
            return Ok(buf);
        }
        debug!(
            "image {}x{} q{} is {} bytes, over {}",
            width,
            height,
            quality,
            buf.len(),
            max_bytes
        );

        if !lossless && quality >= ImageConsts::MIN_QUALITY + ImageConsts::QUALITY_STEP {
            quality -= ImageConsts::QUALITY_STEP;
        } else {
            width = (width as f64 * ImageConsts::SCALE_STEP) as u32;
            height = (height as f64 * ImageConsts::SCALE_STEP) as u32;
            quality = ImageConsts::START_QUALITY;
        }

        if width < ImageConsts::MIN_SIDE || height < ImageConsts::MIN_SIDE {
            return Ok(buf);
        }
    }
}

fn encode(img: &DynamicImage, lossless: bool, quality: u8) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Vec::new();
    let result = if lossless {
        img.write_with_encoder(PngEncoder::new(&mut buf))
    } else {
        // JPEG has no alpha channel.
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
    };
    result.map_err(|e| ServiceError::Image(format!("encoding: {e}")))?;
    Ok(buf)
}
