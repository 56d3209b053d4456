use std::path::{Path, PathBuf};

use tokio::{fs::File, io::AsyncWriteExt};

use crate::error::Result;

/// How the caller wants the result delivered
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OutputMode {
    /// Decode the result and hand it back
    #[default]
    ReturnInMemory,
    /// Persist the raw result at this path and return nothing but the path
    WriteToPath(PathBuf),
}

impl OutputMode {
    pub fn path<P: AsRef<Path>>(path: P) -> Self {
        OutputMode::WriteToPath(path.as_ref().to_path_buf())
    }
}

/// Result of a service call
#[derive(Debug, Clone)]
pub enum Output<T> {
    InMemory(T),
    Written(PathBuf),
}

impl<T> Output<T> {
    pub fn into_memory(self) -> Option<T> {
        match self {
            Output::InMemory(value) => Some(value),
            Output::Written(_) => None,
        }
    }

    pub fn written_path(&self) -> Option<&Path> {
        match self {
            Output::InMemory(_) => None,
            Output::Written(path) => Some(path),
        }
    }
}

/// Write bytes verbatim, replacing any existing file
pub(crate) async fn write_bytes<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let mut file = File::options()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path.as_ref())
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}
