pub mod auth;
pub mod codec;
pub mod error;
pub mod output;
pub mod service;
pub mod source;
pub(crate) mod utils;

pub use error::{Error, Result};
pub use output::{Output, OutputMode};
#[cfg(feature = "inpaint")]
pub use service::inpaint::{InpaintRequest, InpaintResponse, Stats};
#[cfg(feature = "segment")]
pub use service::segment::{BoundingBox, SegmentRequest, SegmentResponse, Segmentation};
pub use service::{Client, Config, ConfigBuilder};
pub use source::ImageSource;
