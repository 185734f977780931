use std::path::Path;
use std::time::Instant;

use shared::ShaderConstants;
use thiserror::Error;

use crate::config::Snapshot;
use crate::{cpu, driver};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write snapshot to {path}")]
    Write {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

pub fn constants(snapshot: &Snapshot) -> ShaderConstants {
    ShaderConstants {
        width: snapshot.width,
        height: snapshot.height,
        time: driver::wrap_secs(f64::from(snapshot.time)),
        ..Default::default()
    }
}

/// Renders one idle-camera frame on the CPU and saves it as PNG.
pub fn write(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let started = Instant::now();
    let image = cpu::render(&constants(snapshot));
    save(&image, &snapshot.path)?;
    tracing::info!(
        path = %snapshot.path.display(),
        width = snapshot.width,
        height = snapshot.height,
        time = snapshot.time,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "wrote snapshot"
    );
    Ok(())
}

fn save(image: &image::RgbaImage, path: &Path) -> Result<(), SnapshotError> {
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| SnapshotError::Write {
            path: path.display().to_string(),
            source,
        })
}
