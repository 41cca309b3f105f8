use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use image::{DynamicImage, ImageResult};

use crate::{Error, MaskBuffer, Result};

mod file;
mod in_memory;

pub use file::FileStorage;
pub use in_memory::InMemoryStorage;

const MASK_DIR: &str = "mask";
const MASK_EXTENSION: &str = "bmp";

/// One source image of the selected directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub stem: String,
}

impl ImageEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, stem }
    }

    pub fn mask_path(&self) -> PathBuf {
        resolve_mask_path(&self.path)
    }
}

/// Per-image annotation persistence. Every method runs to completion on the
/// calling thread.
pub trait Storage {
    /// Supported images directly inside `dir`, sorted by path.
    fn list_images(&self, dir: &Path) -> Result<Vec<ImageEntry>>;
    fn load_image(&self, entry: &ImageEntry) -> Result<DynamicImage>;
    /// Loads the mask of `entry`, regenerating it if it is missing, has the
    /// wrong resolution or `force_clear` is set.
    fn ensure_mask(&self, entry: &ImageEntry, force_clear: bool) -> Result<MaskBuffer>;
    fn store_mask(&self, mask_path: &Path, mask: &MaskBuffer) -> Result<()>;
    fn rotate_image_and_mask(&self, image_path: &Path, mask_path: &Path) -> Result<()>;
    fn rotate_image_only(&self, image_path: &Path) -> Result<()>;
    fn rotate_mask_only(&self, mask_path: &Path) -> Result<()>;
}

/// `<dir>/mask/<stem>.bmp` for `<dir>/<stem>.<ext>`.
pub fn resolve_mask_path(image_path: &Path) -> PathBuf {
    let stem = image_path.file_stem().unwrap_or_default();
    let mut file_name = stem.to_os_string();
    file_name.push(".");
    file_name.push(MASK_EXTENSION);

    image_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(MASK_DIR)
        .join(file_name)
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
enum Kind {
    Jpeg,
    Png,
    Bmp,
}

impl FromStr for Kind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" => Ok(Self::Jpeg),
            "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            _ => Err(()),
        }
    }
}

fn kind_of(path: &Path) -> Option<Kind> {
    path.extension()?.to_str()?.parse().ok()
}

pub fn is_supported_image(path: &Path) -> bool {
    kind_of(path).is_some()
}

/// Writes through a hidden sibling file which then replaces `path`, so readers
/// never observe a partially written file.
fn write_atomically(path: &Path, write: impl FnOnce(&Path) -> ImageResult<()>) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::io(path, std::io::Error::other("Path has no file name")))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = write(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(Error::image(path, e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::io(path, e)
    })
}
