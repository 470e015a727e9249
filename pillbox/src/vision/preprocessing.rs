use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, ImageFormat, ImageReader};

use crate::config::VisionConfig;
use crate::error::{PillboxError, Result};

/// Prepares a pill photo for text detection.
///
/// Rejects images smaller than `min_image_dimension` on either side, shrinks
/// anything larger than `max_image_dimension` (aspect ratio kept), flattens to
/// 8-bit grayscale without alpha, stretches contrast, and re-encodes as PNG.
pub fn preprocess_image(bytes: &[u8], config: &VisionConfig) -> Result<Vec<u8>> {
    let img = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| PillboxError::Validation(format!("Failed to read image: {e}")))?
        .decode()
        .map_err(|e| PillboxError::Validation(format!("Failed to decode image: {e}")))?;

    let (width, height) = img.dimensions();
    let min = config.min_image_dimension;
    if width < min || height < min {
        return Err(PillboxError::Validation(format!(
            "Image too small: {width}x{height}, minimum {min}x{min}"
        )));
    }

    let img = resize_if_needed(img, config.max_image_dimension);
    let gray = stretch_contrast(img.to_luma8());

    let mut output = Vec::new();
    DynamicImage::ImageLuma8(gray)
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| PillboxError::Internal(format!("Failed to encode image: {e}")))?;

    Ok(output)
}

fn resize_if_needed(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dim && height <= max_dim {
        return img;
    }

    let ratio = max_dim as f32 / width.max(height) as f32;
    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);

    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Linear histogram stretch: darkest pixel to 0, lightest to 255.
fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_val, max_val) = gray
        .pixels()
        .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));

    if max_val <= min_val {
        return gray;
    }

    let range = f32::from(max_val - min_val);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0];
        let normalized = f32::from(value - min_val) / range;
        image::Luma([(normalized * 255.0).round() as u8])
    })
}
