use std::{
    collections::{BTreeMap, HashMap, HashSet},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use image::{DynamicImage, Rgb};
use log::{info, warn};

use super::{ImageEntry, Storage, is_supported_image, resolve_mask_path};
use crate::{Error, MaskBuffer, Result, Size};

#[derive(Default)]
struct Data {
    images: BTreeMap<PathBuf, DynamicImage>,
    masks: HashMap<PathBuf, MaskBuffer>,
    directories: HashSet<PathBuf>,
}

/// Storage without a filesystem. Paths are only used as keys.
#[derive(Clone)]
pub struct InMemoryStorage {
    mask_size: Size,
    background: Rgb<u8>,
    data: Arc<Mutex<Data>>,
}

impl InMemoryStorage {
    pub fn new(
        mask_size: Size,
        background: Rgb<u8>,
        images: impl IntoIterator<Item = (PathBuf, DynamicImage)>,
    ) -> Self {
        Self {
            mask_size,
            background,
            data: Arc::new(Mutex::new(Data {
                images: images.into_iter().collect(),
                ..Default::default()
            })),
        }
    }

    /// Preloads a mask, regardless of its resolution.
    pub fn with_mask(self, mask_path: impl Into<PathBuf>, mask: MaskBuffer) -> Self {
        self.lock().masks.insert(mask_path.into(), mask);
        self
    }

    /// Marks `path` as an existing directory.
    pub fn with_directory(self, path: impl Into<PathBuf>) -> Self {
        self.lock().directories.insert(path.into());
        self
    }

    pub fn mask(&self, mask_path: &Path) -> Option<MaskBuffer> {
        self.lock().masks.get(mask_path).cloned()
    }

    pub fn image(&self, image_path: &Path) -> Option<DynamicImage> {
        self.lock().images.get(image_path).cloned()
    }

    /// Forgets an image while keeping its mask, like a file that became unreadable.
    pub fn remove_image(&self, image_path: &Path) -> Option<DynamicImage> {
        self.lock().images.remove(image_path)
    }

    fn lock(&self) -> MutexGuard<'_, Data> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(path: &Path) -> Error {
    Error::io(path, io::Error::from(io::ErrorKind::NotFound))
}

impl Storage for InMemoryStorage {
    fn list_images(&self, dir: &Path) -> Result<Vec<ImageEntry>> {
        Ok(self
            .lock()
            .images
            .keys()
            .filter(|path| path.parent() == Some(dir) && is_supported_image(path))
            .map(ImageEntry::new)
            .collect())
    }

    fn load_image(&self, entry: &ImageEntry) -> Result<DynamicImage> {
        self.image(&entry.path).ok_or_else(|| not_found(&entry.path))
    }

    fn ensure_mask(&self, entry: &ImageEntry, force_clear: bool) -> Result<MaskBuffer> {
        let mask_path = resolve_mask_path(&entry.path);
        let mut data = self.lock();
        if data.directories.contains(&mask_path) {
            return Err(Error::MaskPathIsDirectory(mask_path));
        }

        match data.masks.get(&mask_path) {
            Some(existing) if existing.size() != self.mask_size => {
                warn!("Mask {} has the wrong size. Regenerating it", mask_path.display());
            }
            Some(existing) if !force_clear => return Ok(existing.clone()),
            _ => {}
        }

        let mask = MaskBuffer::new_filled(self.mask_size, self.background);
        data.masks.insert(mask_path.clone(), mask.clone());
        info!("Created blank mask {}", mask_path.display());
        Ok(mask)
    }

    fn store_mask(&self, mask_path: &Path, mask: &MaskBuffer) -> Result<()> {
        let mut data = self.lock();
        if data.directories.contains(mask_path) {
            return Err(Error::MaskPathIsDirectory(mask_path.to_path_buf()));
        }
        data.masks.insert(mask_path.to_path_buf(), mask.clone());
        Ok(())
    }

    fn rotate_image_and_mask(&self, image_path: &Path, mask_path: &Path) -> Result<()> {
        let mut data = self.lock();
        let image = data.images.get(image_path).ok_or_else(|| not_found(image_path))?;
        let mask = data.masks.get(mask_path).ok_or_else(|| not_found(mask_path))?;
        let (image, mask) = (image.rotate90(), mask.rotated());
        data.images.insert(image_path.to_path_buf(), image);
        data.masks.insert(mask_path.to_path_buf(), mask);
        Ok(())
    }

    fn rotate_image_only(&self, image_path: &Path) -> Result<()> {
        let mut data = self.lock();
        let image = data.images.get_mut(image_path).ok_or_else(|| not_found(image_path))?;
        *image = image.rotate90();
        Ok(())
    }

    fn rotate_mask_only(&self, mask_path: &Path) -> Result<()> {
        let mut data = self.lock();
        let mask = data.masks.get_mut(mask_path).ok_or_else(|| not_found(mask_path))?;
        *mask = mask.rotated();
        Ok(())
    }
}
