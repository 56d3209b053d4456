use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
#[cfg(feature = "inpaint")]
use runpod_vision::InpaintRequest;
#[cfg(feature = "segment")]
use runpod_vision::SegmentRequest;
use runpod_vision::{Client, ConfigBuilder, ImageSource, Output, OutputMode};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(version, about = "Inpainting and segmentation on RunPod serverless endpoints")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Endpoint ID, overriding the configured default
    #[arg(long, global = true)]
    endpoint_id: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    base_url: Option<Url>,

    /// Print request and timing diagnostics
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Fill the masked region of an image
    #[cfg(feature = "inpaint")]
    Inpaint {
        /// Input image path
        #[arg(short, long)]
        image: PathBuf,

        /// Mask image path
        #[arg(short, long)]
        mask: PathBuf,

        /// Output path
        #[arg(short, long, default_value = "result.png")]
        output: PathBuf,
    },
    /// Segment an image into masks and bounding boxes
    #[cfg(feature = "segment")]
    Segment {
        /// Input image path
        #[arg(short, long)]
        image: PathBuf,

        /// Class names to segment, comma separated
        #[arg(short, long, value_delimiter = ',')]
        class_names: Option<Vec<String>>,

        /// Output path
        #[arg(short, long, default_value = "result.json")]
        output: PathBuf,
    },
}

fn init_tracing(debug: bool) {
    let default = if debug { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn written(output: Output<impl Sized>) -> Result<PathBuf> {
    output
        .written_path()
        .map(|path| path.to_path_buf())
        .context("Expected the result to be written to disk")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut builder = ConfigBuilder::from_env()
        .context("Failed to read configuration from environment")?
        .debug(cli.debug);
    if let Some(base_url) = cli.base_url {
        builder = builder.base_url(base_url);
    }
    let client = Client::new(builder.build());

    match cli.command {
        #[cfg(feature = "inpaint")]
        Command::Inpaint {
            image,
            mask,
            output,
        } => {
            let mut request = InpaintRequest::new()
                .image(ImageSource::Path(image))
                .mask(ImageSource::Path(mask))
                .output(OutputMode::WriteToPath(output));
            if let Some(endpoint_id) = &cli.endpoint_id {
                request = request.endpoint_id(endpoint_id);
            }
            let path = written(client.inpaint(request).await.context("Inpainting failed")?)?;
            println!("Inpainted image saved as {}", path.display());
        }
        #[cfg(feature = "segment")]
        Command::Segment {
            image,
            class_names,
            output,
        } => {
            let mut request = SegmentRequest::new()
                .image(ImageSource::Path(image))
                .output(OutputMode::WriteToPath(output));
            if let Some(class_names) = class_names {
                request = request.class_names(class_names);
            }
            if let Some(endpoint_id) = &cli.endpoint_id {
                request = request.endpoint_id(endpoint_id);
            }
            let path = written(client.segment(request).await.context("Segmentation failed")?)?;
            println!("Segmentation result saved as {}", path.display());
        }
    };

    Ok(())
}
