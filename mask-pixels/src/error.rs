use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The one unrecoverable condition: continuing would write annotations
    /// into a location that cannot hold them.
    #[error("Mask file {} is a directory, move it somewhere else and restart the tool", .0.display())]
    MaskPathIsDirectory(PathBuf),

    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Image error at {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No image is loaded")]
    NoContent,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.into(),
            source,
        }
    }

    /// Fatal errors must terminate the process at the outermost boundary.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MaskPathIsDirectory(_))
    }
}
