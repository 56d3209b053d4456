use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::{
    codec,
    error::{Error, Result},
    output::{self, Output, OutputMode},
    source::ImageSource,
};

use super::Client;

/// Segmentation call parameters
#[derive(Debug, Clone, Default)]
pub struct SegmentRequest {
    image: Option<ImageSource>,
    class_names: Option<Vec<String>>,
    output: OutputMode,
    endpoint_id: Option<String>,
}

impl SegmentRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image<S: Into<ImageSource>>(self, image: S) -> Self {
        Self {
            image: Some(image.into()),
            ..self
        }
    }

    /// Restrict segmentation to these labels. Unset means every class the service knows.
    pub fn class_names<I, S>(self, class_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            class_names: Some(class_names.into_iter().map(Into::into).collect()),
            ..self
        }
    }

    pub fn output(self, output: OutputMode) -> Self {
        Self { output, ..self }
    }

    /// Override the configured segmentation endpoint for this call
    pub fn endpoint_id(self, endpoint_id: &str) -> Self {
        Self {
            endpoint_id: Some(endpoint_id.to_string()),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct SegmentInput {
    image: String,
    class_names: Option<Vec<String>>,
}

/// Box coordinates as sent by the service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct BoundingBox(Vec<f64>);

impl BoundingBox {
    pub fn new(coords: Vec<f64>) -> Self {
        BoundingBox(coords)
    }

    pub fn coords(&self) -> &[f64] {
        &self.0
    }

    /// `[x1, y1, x2, y2]` when the box has exactly four coordinates
    pub fn as_xyxy(&self) -> Option<[f64; 4]> {
        self.0.as_slice().try_into().ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SegmentResponse {
    #[serde(default)]
    pub masks: Vec<String>,
    #[serde(default)]
    pub bounding_boxes: Vec<BoundingBox>,
}

/// Decoded segmentation result. `masks[i]` belongs to `boxes[i]`.
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub masks: Vec<DynamicImage>,
    pub boxes: Vec<BoundingBox>,
}

impl Segmentation {
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Masks paired with their boxes. Stops at the shorter of the two lists.
    pub fn iter(&self) -> impl Iterator<Item = (&DynamicImage, &BoundingBox)> {
        self.masks.iter().zip(self.boxes.iter())
    }
}

impl TryFrom<SegmentResponse> for Segmentation {
    type Error = Error;

    fn try_from(response: SegmentResponse) -> Result<Self> {
        if response.masks.len() != response.bounding_boxes.len() {
            tracing::warn!(
                masks = response.masks.len(),
                boxes = response.bounding_boxes.len(),
                "Mask and bounding box counts differ"
            );
        }
        let masks = response
            .masks
            .iter()
            .map(codec::decode_base64_image)
            .collect::<Result<Vec<_>>>()?;
        Ok(Segmentation {
            masks,
            boxes: response.bounding_boxes,
        })
    }
}

impl Client {
    /// Segment an image into masks and bounding boxes.
    ///
    /// An empty mask list is a valid result. With [`OutputMode::WriteToPath`]
    /// the response body is persisted unchanged.
    pub async fn segment(&self, request: SegmentRequest) -> Result<Output<Segmentation>> {
        let image = request.image.as_ref().ok_or(Error::MissingInput("image"))?;
        self.config.auth()?;

        let endpoint_id = request
            .endpoint_id
            .as_deref()
            .unwrap_or(&self.config.segment_endpoint);

        let input = SegmentInput {
            image: image.to_base64().await?,
            class_names: request.class_names.clone(),
        };

        let body = self.run_sync(endpoint_id, &input).await?;
        let response: SegmentResponse = serde_json::from_str(&body)?;
        diagnostic!(
            self.config.debug,
            masks = response.masks.len(),
            boxes = response.bounding_boxes.len(),
            "Segmentation response"
        );

        match request.output {
            OutputMode::ReturnInMemory => Ok(Output::InMemory(response.try_into()?)),
            OutputMode::WriteToPath(path) => {
                output::write_bytes(&path, body.as_bytes()).await?;
                tracing::info!("Segmentation result saved as {}", path.display());
                Ok(Output::Written(path))
            }
        }
    }
}
