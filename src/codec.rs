use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;

use crate::error::{Error, Result};

/// Encode a raster as PNG bytes. Rasters without pixels are rejected.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::EmptyImage {
            width: image.width(),
            height: image.height(),
        });
    }
    let mut bytes: Vec<u8> = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Normalize a raster to PNG and encode it as base64 text
pub fn encode_image(image: &DynamicImage) -> Result<String> {
    Ok(STANDARD.encode(encode_png(image)?))
}

/// Decode base64 text into raw bytes
pub fn decode_base64<T: AsRef<[u8]>>(text: T) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.as_ref())?)
}

/// Decode image bytes into an 8-bit RGB raster
pub fn decode_image<B: AsRef<[u8]>>(bytes: B) -> Result<DynamicImage> {
    let image = image::load_from_memory(bytes.as_ref())?;
    Ok(DynamicImage::ImageRgb8(image.to_rgb8()))
}

/// Decode base64 text straight into a raster
pub fn decode_base64_image<T: AsRef<[u8]>>(text: T) -> Result<DynamicImage> {
    decode_image(decode_base64(text)?)
}
