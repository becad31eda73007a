use std::path::{Component, Path, PathBuf};

use anyhow::Context as _;

use crate::encode::encoder::{Container, MediaBlob, MediaPayload};
use crate::foundation::error::{ReelError, ReelResult};

/// A delivered export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveredMedia {
    /// File name the media was saved under.
    pub filename: String,
    /// Where it ended up, when the delivery target is a file system.
    pub location: Option<PathBuf>,
    /// MIME type of the media.
    pub mime_type: String,
    /// Size in bytes.
    pub bytes: u64,
}

/// Hands finished media to the user.
pub trait MediaDelivery: Send + Sync {
    /// Save `blob` as `filename`.
    fn deliver(&self, blob: MediaBlob, filename: &str) -> ReelResult<DeliveredMedia>;
}

/// Saves media into a directory.
#[derive(Clone, Debug)]
pub struct DirectoryDelivery {
    /// Target directory, created on first delivery.
    pub dir: PathBuf,
}

impl DirectoryDelivery {
    /// Deliver into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl MediaDelivery for DirectoryDelivery {
    fn deliver(&self, blob: MediaBlob, filename: &str) -> ReelResult<DeliveredMedia> {
        check_file_name(filename)?;
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create output directory '{}'", self.dir.display())
        })?;
        let dest = self.dir.join(filename);

        match blob.payload {
            MediaPayload::Bytes(bytes) => {
                std::fs::write(&dest, bytes)
                    .with_context(|| format!("failed to write '{}'", dest.display()))?;
            }
            MediaPayload::File(src) if src == dest => {}
            MediaPayload::File(src) => {
                if std::fs::rename(&src, &dest).is_err() {
                    // Different file systems: copy, then drop the source.
                    std::fs::copy(&src, &dest).with_context(|| {
                        format!("failed to copy '{}' to '{}'", src.display(), dest.display())
                    })?;
                    std::fs::remove_file(&src)
                        .with_context(|| format!("failed to remove '{}'", src.display()))?;
                }
            }
        }

        let bytes = std::fs::metadata(&dest)
            .with_context(|| format!("failed to stat '{}'", dest.display()))?
            .len();
        tracing::info!(path = %dest.display(), bytes, "delivered export");
        Ok(DeliveredMedia {
            filename: filename.to_string(),
            location: Some(dest),
            mime_type: blob.mime_type,
            bytes,
        })
    }
}

/// Reject anything but a single plain file name: no separators, no `.`/`..`, no root.
pub fn check_file_name(name: &str) -> ReelResult<()> {
    if name.is_empty() {
        return Err(ReelError::validation("export file name is empty"));
    }
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain || name.contains(['/', '\\']) {
        return Err(ReelError::validation(format!(
            "export file name '{name}' must be a plain file name, not a path"
        )));
    }
    Ok(())
}

/// File name for an export of the animation called `name`.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`; an empty name falls back to
/// `fractal-animation`.
pub fn export_file_name(name: &str, container: Container) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = stem.trim_matches('_');
    let stem = if stem.is_empty() {
        "fractal-animation"
    } else {
        stem
    };
    format!("{stem}.{}", container.extension())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/delivery.rs"]
mod tests;
