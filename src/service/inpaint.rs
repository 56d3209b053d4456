use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{
    codec,
    error::{Error, Result},
    output::{self, Output, OutputMode},
    source::ImageSource,
};

use super::Client;

/// Inpainting call parameters
#[derive(Debug, Clone, Default)]
pub struct InpaintRequest {
    image: Option<ImageSource>,
    mask: Option<ImageSource>,
    output: OutputMode,
    endpoint_id: Option<String>,
}

impl InpaintRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image<S: Into<ImageSource>>(self, image: S) -> Self {
        Self {
            image: Some(image.into()),
            ..self
        }
    }

    pub fn mask<S: Into<ImageSource>>(self, mask: S) -> Self {
        Self {
            mask: Some(mask.into()),
            ..self
        }
    }

    pub fn output(self, output: OutputMode) -> Self {
        Self { output, ..self }
    }

    /// Override the configured inpainting endpoint for this call
    pub fn endpoint_id(self, endpoint_id: &str) -> Self {
        Self {
            endpoint_id: Some(endpoint_id.to_string()),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct InpaintInput {
    image: String,
    mask: String,
}

/// Backend timing statistics, in seconds
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub inference_time: Option<f64>,
    pub overall_time: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InpaintResponse {
    #[serde(default)]
    pub output_image: Option<String>,
    #[serde(default)]
    pub stats: Option<Stats>,
}

impl InpaintResponse {
    /// The encoded output image, if present and non-empty
    pub fn output_image(&self) -> Option<&str> {
        self.output_image.as_deref().filter(|image| !image.is_empty())
    }
}

fn format_seconds(seconds: Option<f64>) -> String {
    seconds
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

impl Client {
    /// Fill the masked region of an image.
    ///
    /// With [`OutputMode::ReturnInMemory`] the repaired image is decoded and returned.
    /// With [`OutputMode::WriteToPath`] the bytes sent back by the service are written as-is.
    pub async fn inpaint(&self, request: InpaintRequest) -> Result<Output<DynamicImage>> {
        let debug = self.config.debug;
        let image = request.image.as_ref().ok_or(Error::MissingInput("image"))?;
        let mask = request.mask.as_ref().ok_or(Error::MissingInput("mask"))?;
        self.config.auth()?;

        let endpoint_id = request
            .endpoint_id
            .as_deref()
            .unwrap_or(&self.config.inpaint_endpoint);

        let input = InpaintInput {
            image: image.to_base64().await?,
            mask: mask.to_base64().await?,
        };

        let start = Instant::now();
        let body = self.run_sync(endpoint_id, &input).await?;
        let elapsed = start.elapsed();

        let response: InpaintResponse = serde_json::from_str(&body)?;
        let output_image = response.output_image().ok_or(Error::EmptyResult)?;
        let bytes = codec::decode_base64(output_image)?;

        let stats = response.stats.clone().unwrap_or_default();
        diagnostic!(
            debug,
            "Inference Time (Backend): {} seconds",
            format_seconds(stats.inference_time)
        );
        diagnostic!(
            debug,
            "Overall Time (Backend): {} seconds",
            format_seconds(stats.overall_time)
        );
        diagnostic!(
            debug,
            "Total Time (Frontend): {:.2} seconds",
            elapsed.as_secs_f64()
        );

        match request.output {
            OutputMode::ReturnInMemory => Ok(Output::InMemory(codec::decode_image(&bytes)?)),
            OutputMode::WriteToPath(path) => {
                output::write_bytes(&path, &bytes).await?;
                tracing::info!("Inpainted image saved as {}", path.display());
                Ok(Output::Written(path))
            }
        }
    }
}
