use std::{fs, path::Path};

use image::{DynamicImage, ImageFormat, Rgb};
use itertools::Itertools;
use log::{info, warn};

use super::{ImageEntry, Storage, is_supported_image, resolve_mask_path, write_atomically};
use crate::{EditorConfig, Error, MaskBuffer, Result, Size};

/// Masks as lossless bitmaps in a `mask/` folder next to the images.
pub struct FileStorage {
    mask_size: Size,
    background: Rgb<u8>,
}

impl FileStorage {
    pub fn new(mask_size: Size, background: Rgb<u8>) -> Self {
        Self {
            mask_size,
            background,
        }
    }

    fn rotated_image(path: &Path) -> Result<(DynamicImage, ImageFormat)> {
        let format = ImageFormat::from_path(path).map_err(|e| Error::image(path, e))?;
        let image = image::open(path).map_err(|e| Error::image(path, e))?;
        Ok((image.rotate90(), format))
    }

    fn rotated_mask(path: &Path) -> Result<MaskBuffer> {
        let image = image::open(path).map_err(|e| Error::image(path, e))?;
        Ok(MaskBuffer::from(image.into_rgb8()).rotated())
    }

    fn write_image(path: &Path, image: &DynamicImage, format: ImageFormat) -> Result<()> {
        write_atomically(path, |tmp| image.save_with_format(tmp, format))
    }

    /// Loads an existing mask. Masks which cannot be decoded or have the wrong
    /// resolution are deleted.
    fn load_valid_mask(&self, mask_path: &Path) -> Result<Option<MaskBuffer>> {
        if !mask_path.exists() {
            return Ok(None);
        }
        let loaded = match image::open(mask_path) {
            Ok(image) => {
                let (width, height) = (image.width(), image.height());
                let mask = MaskBuffer::from_image(image, self.mask_size);
                if mask.is_none() {
                    warn!(
                        "Mask {} has size {width}x{height}, expected {}x{}. Regenerating it",
                        mask_path.display(),
                        self.mask_size.width,
                        self.mask_size.height
                    );
                }
                mask
            }
            Err(e) => {
                warn!("Mask {} is unreadable ({e}). Regenerating it", mask_path.display());
                None
            }
        };
        if loaded.is_none() {
            fs::remove_file(mask_path).map_err(|e| Error::io(mask_path, e))?;
        }
        Ok(loaded)
    }
}

impl From<&EditorConfig> for FileStorage {
    fn from(config: &EditorConfig) -> Self {
        Self::new(config.mask_size, config.eraser_color.into())
    }
}

impl Storage for FileStorage {
    fn list_images(&self, dir: &Path) -> Result<Vec<ImageEntry>> {
        let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
        Ok(entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {e}", dir.display());
                    None
                }
            })
            .filter(|path| path.is_file() && is_supported_image(path))
            .sorted()
            .map(ImageEntry::new)
            .collect())
    }

    fn load_image(&self, entry: &ImageEntry) -> Result<DynamicImage> {
        image::open(&entry.path).map_err(|e| Error::image(&entry.path, e))
    }

    fn ensure_mask(&self, entry: &ImageEntry, force_clear: bool) -> Result<MaskBuffer> {
        let mask_path = resolve_mask_path(&entry.path);
        if let Some(mask_dir) = mask_path.parent() {
            fs::create_dir_all(mask_dir).map_err(|e| Error::io(mask_dir, e))?;
        }
        if mask_path.is_dir() {
            return Err(Error::MaskPathIsDirectory(mask_path));
        }

        match self.load_valid_mask(&mask_path)? {
            Some(mask) if !force_clear => Ok(mask),
            _ => {
                let mask = MaskBuffer::new_filled(self.mask_size, self.background);
                self.store_mask(&mask_path, &mask)?;
                info!("Created blank mask {}", mask_path.display());
                Ok(mask)
            }
        }
    }

    fn store_mask(&self, mask_path: &Path, mask: &MaskBuffer) -> Result<()> {
        write_atomically(mask_path, |tmp| {
            mask.as_image().save_with_format(tmp, ImageFormat::Bmp)
        })
    }

    fn rotate_image_and_mask(&self, image_path: &Path, mask_path: &Path) -> Result<()> {
        let (image, format) = Self::rotated_image(image_path)?;
        let mask = Self::rotated_mask(mask_path)?;
        Self::write_image(image_path, &image, format)?;
        self.store_mask(mask_path, &mask)?;
        info!("Rotated {} and its mask", image_path.display());
        Ok(())
    }

    fn rotate_image_only(&self, image_path: &Path) -> Result<()> {
        let (image, format) = Self::rotated_image(image_path)?;
        Self::write_image(image_path, &image, format)?;
        info!("Rotated {}", image_path.display());
        Ok(())
    }

    fn rotate_mask_only(&self, mask_path: &Path) -> Result<()> {
        let mask = Self::rotated_mask(mask_path)?;
        self.store_mask(mask_path, &mask)?;
        info!("Rotated mask {}", mask_path.display());
        Ok(())
    }
}
