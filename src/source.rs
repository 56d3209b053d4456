use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::{codec, error::Result};

/// Where an input raster comes from
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Already decoded raster
    Memory(DynamicImage),
    /// Image file on disk. Must exist and be decodable.
    Path(PathBuf),
}

impl ImageSource {
    pub fn path<P: AsRef<Path>>(path: P) -> Self {
        ImageSource::Path(path.as_ref().to_path_buf())
    }

    /// Load the raster, reading and decoding the file for path sources
    pub async fn load(&self) -> Result<DynamicImage> {
        match self {
            ImageSource::Memory(image) => Ok(image.clone()),
            ImageSource::Path(path) => {
                let bytes = tokio::fs::read(path).await?;
                Ok(image::load_from_memory(&bytes)?)
            }
        }
    }

    /// PNG-normalized base64 text of the raster
    pub async fn to_base64(&self) -> Result<String> {
        match self {
            ImageSource::Memory(image) => codec::encode_image(image),
            ImageSource::Path(_) => codec::encode_image(&self.load().await?),
        }
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        ImageSource::Memory(image)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        ImageSource::path(path)
    }
}

#[cfg(test)]
mod test {
    use image::GrayImage;

    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_path_source_is_png_normalized() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("input.bmp");
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, image::Luma([255])));
        image.save_with_format(&path, image::ImageFormat::Bmp)?;

        let text = ImageSource::path(&path).to_base64().await?;
        let bytes = codec::decode_base64(text)?;
        assert_eq!(
            image::guess_format(&bytes).map_err(Error::decode)?,
            image::ImageFormat::Png
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = ImageSource::path("/nonexistent/input.png")
            .to_base64()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_undecodable_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("broken.png");
        tokio::fs::write(&path, b"garbage").await?;

        let err = ImageSource::path(&path).to_base64().await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        Ok(())
    }
}
