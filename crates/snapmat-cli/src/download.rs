//! Download directory sink
//!
//! Finished screenshots land as timestamped PNG files in one directory,
//! created on first use.

use std::fs;
use std::path::PathBuf;

use snapmat_capture::{timestamped_download_name, DeliveryError, DeliverySink};
use snapmat_render::CompositionResult;

pub struct DownloadDir {
    dir: PathBuf,
}

impl DownloadDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DeliverySink for DownloadDir {
    fn deliver(&self, image: &CompositionResult) -> Result<String, DeliveryError> {
        fs::create_dir_all(&self.dir).map_err(|e| DeliveryError::Sink(e.to_string()))?;

        let name = timestamped_download_name();
        let path = self.dir.join(&name);
        fs::write(&path, &image.bytes).map_err(|e| DeliveryError::Sink(e.to_string()))?;

        tracing::info!("saved {}x{} image to {}", image.width, image.height, path.display());
        Ok(name)
    }
}
