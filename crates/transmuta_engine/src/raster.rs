use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};

use transmuta_core::{image_format, ConvertedPayload};

use crate::strategy::ConvertStrategy;
use crate::types::{ConvertError, ConvertRequest, FailureKind};

/// Fixed 0.9 quality factor for lossy encodes.
const JPEG_QUALITY: u8 = 90;

/// Image-to-image conversion: the one strategy doing genuine byte-level work.
///
/// Decodes the source into a pixel grid, composites it at the origin onto a
/// same-sized surface, and re-encodes to the target media type. Targets
/// without native transparency get the surface pre-filled opaque white;
/// transparent targets keep the source alpha intact.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterStrategy;

#[async_trait::async_trait]
impl ConvertStrategy for RasterStrategy {
    async fn convert(&self, request: &ConvertRequest) -> Result<ConvertedPayload, ConvertError> {
        convert_pixels(&request.source, &request.target)
    }
}

pub(crate) fn convert_pixels(source: &[u8], target_id: &str) -> Result<ConvertedPayload, ConvertError> {
    let Some(target) = image_format(target_id) else {
        return Err(ConvertError::new(
            FailureKind::UnsupportedContext,
            format!("no raster encoder for target '{target_id}'"),
        ));
    };

    let decoded = image::load_from_memory(source)
        .map_err(|err| ConvertError::new(FailureKind::Decode, err.to_string()))?;

    let background = if target.transparent {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([255, 255, 255, 255])
    };
    let mut canvas = RgbaImage::from_pixel(decoded.width(), decoded.height(), background);
    imageops::overlay(&mut canvas, &decoded.to_rgba8(), 0, 0);

    let mut out = Cursor::new(Vec::new());
    let encoded = match target.id {
        "jpeg" => {
            let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY).encode_image(&flattened)
        }
        "bmp" => DynamicImage::ImageRgba8(canvas)
            .to_rgb8()
            .write_to(&mut out, ImageFormat::Bmp),
        "png" => canvas.write_to(&mut out, ImageFormat::Png),
        "webp" => canvas.write_to(&mut out, ImageFormat::WebP),
        other => {
            return Err(ConvertError::new(
                FailureKind::UnsupportedContext,
                format!("registered image format '{other}' has no encoder"),
            ))
        }
    };
    encoded.map_err(|err| ConvertError::new(FailureKind::Encode, err.to_string()))?;

    let bytes = out.into_inner();
    if bytes.is_empty() {
        return Err(ConvertError::new(
            FailureKind::Encode,
            "encoder produced no output",
        ));
    }
    Ok(ConvertedPayload {
        bytes: Bytes::from(bytes),
        media_type: target.media_type.to_string(),
    })
}
