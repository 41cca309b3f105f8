use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::{
    CanvasSurface, EditorConfig, Error, Frame, Navigation, Point, Result, Storage, StrokeEnd, Tool,
    UiState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Browsing,
    /// The directory has no supported images. Nothing changed.
    NoImages,
}

/// File operation to run on the current image before it is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowAction {
    Clear,
    RotateImageAndMask,
    RotateImage,
    RotateMask,
}

/// One annotation session: the image set being browsed and the canvas of the
/// current image.
pub struct Editor {
    storage: Box<dyn Storage>,
    navigation: Navigation,
    canvas: CanvasSurface,
}

impl Editor {
    pub fn new(storage: Box<dyn Storage>, config: EditorConfig) -> Self {
        Self {
            storage,
            navigation: Navigation::Empty,
            canvas: CanvasSurface::new(config),
        }
    }

    pub fn select_directory(&mut self, dir: impl Into<PathBuf>) -> Result<SelectOutcome> {
        let dir = dir.into();
        let entries = self.storage.list_images(&dir)?;
        if entries.is_empty() {
            warn!("{} contains no supported images", dir.display());
            return Ok(SelectOutcome::NoImages);
        }
        self.save_current()?;
        self.navigation.select(dir, entries);
        self.show_current(None)?;
        Ok(SelectOutcome::Browsing)
    }

    pub fn next(&mut self) -> Result<bool> {
        self.save_current()?;
        let moved = self.navigation.next();
        if moved {
            self.show_current(None)?;
        }
        Ok(moved)
    }

    pub fn prev(&mut self) -> Result<bool> {
        self.save_current()?;
        let moved = self.navigation.prev();
        if moved {
            self.show_current(None)?;
        }
        Ok(moved)
    }

    /// Jumps to the 1-based `page`. The current image is reloaded even if
    /// the page is out of range.
    pub fn jump_to(&mut self, page: i64) -> Result<bool> {
        self.save_current()?;
        let moved = self.navigation.jump_to(page);
        if !moved {
            info!("Ignoring jump to page {page}");
        }
        self.show_current(None)?;
        Ok(moved)
    }

    /// Loads the current image and its mask into the canvas, running `action` first.
    /// On failure the canvas is left empty, so it never paints into the mask of
    /// an image other than the current one.
    pub fn show_current(&mut self, action: Option<ShowAction>) -> Result<()> {
        let result = self.load_current(action);
        if result.is_err() {
            self.canvas.unload();
        }
        result
    }

    fn load_current(&mut self, action: Option<ShowAction>) -> Result<()> {
        let Some(entry) = self.navigation.current().cloned() else {
            self.canvas.unload();
            return Ok(());
        };
        let mask_path = entry.mask_path();
        let mut mask = self
            .storage
            .ensure_mask(&entry, action == Some(ShowAction::Clear))?;

        let rotation = match action {
            Some(ShowAction::RotateImageAndMask) => Some(
                self.storage
                    .rotate_image_and_mask(&entry.path, &mask_path),
            ),
            Some(ShowAction::RotateImage) => Some(self.storage.rotate_image_only(&entry.path)),
            Some(ShowAction::RotateMask) => Some(self.storage.rotate_mask_only(&mask_path)),
            Some(ShowAction::Clear) | None => None,
        };
        if let Some(rotation) = rotation {
            rotation?;
            mask = self.storage.ensure_mask(&entry, false)?;
        }

        let image = self.storage.load_image(&entry)?;
        self.canvas.load_content(&image, mask, mask_path);
        info!("Showing {}", entry.path.display());
        Ok(())
    }

    pub fn clear_mask(&mut self) -> Result<()> {
        self.run_action(ShowAction::Clear)
    }

    pub fn rotate_image_and_mask(&mut self) -> Result<()> {
        self.run_action(ShowAction::RotateImageAndMask)
    }

    pub fn rotate_image_only(&mut self) -> Result<()> {
        self.run_action(ShowAction::RotateImage)
    }

    pub fn rotate_mask_only(&mut self) -> Result<()> {
        self.run_action(ShowAction::RotateMask)
    }

    fn run_action(&mut self, action: ShowAction) -> Result<()> {
        if self.navigation.current().is_none() {
            return Err(Error::NoContent);
        }
        self.show_current(Some(action))
    }

    fn save_current(&self) -> Result<()> {
        if self.canvas.mask_path().is_some() {
            self.canvas.save(self.storage.as_ref())?;
        }
        Ok(())
    }

    pub fn begin_stroke(&mut self, pos: Point, tool: Tool) {
        self.canvas.begin_stroke(pos, tool);
    }

    pub fn continue_stroke(&mut self, pos: Point, tool: Tool) {
        self.canvas.continue_stroke(pos, tool);
    }

    /// Saves the mask. A finished stroke reloads the current image so the
    /// display matches what is stored.
    pub fn end_stroke(&mut self) -> Result<StrokeEnd> {
        let end = self.canvas.end_stroke(self.storage.as_ref())?;
        if end == StrokeEnd::Finished {
            self.show_current(None)?;
        }
        Ok(end)
    }

    pub fn redraw(&mut self) -> Frame<'_> {
        self.canvas.redraw()
    }

    pub fn ui_state(&self) -> UiState {
        self.navigation.ui_state()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn current_dir(&self) -> Option<&Path> {
        self.navigation.dir()
    }

    pub fn canvas(&self) -> &CanvasSurface {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasSurface {
        &mut self.canvas
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgb, RgbImage};

    use super::*;
    use crate::{InMemoryStorage, MaskBuffer, Size};

    const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn config() -> EditorConfig {
        EditorConfig {
            mask_size: Size::new(16, 16),
            viewport: Size::new(16, 16),
            ..Default::default()
        }
    }

    fn storage() -> InMemoryStorage {
        let image = |w, h| DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([51, 51, 51])));
        InMemoryStorage::new(
            config().mask_size,
            BLACK,
            [
                (PathBuf::from("/set/c.bmp"), image(8, 8)),
                (PathBuf::from("/set/a.png"), image(8, 4)),
                (PathBuf::from("/set/b.jpg"), image(8, 8)),
            ],
        )
    }

    fn editor(storage: &InMemoryStorage) -> Editor {
        let mut editor = Editor::new(Box::new(storage.clone()), config());
        assert_eq!(
            editor.select_directory("/set").unwrap(),
            SelectOutcome::Browsing
        );
        editor
    }

    fn stored(storage: &InMemoryStorage, stem: &str) -> MaskBuffer {
        storage
            .mask(&PathBuf::from(format!("/set/mask/{stem}.bmp")))
            .unwrap()
    }

    #[test]
    fn selecting_shows_first_image() {
        let storage = storage();
        let editor = editor(&storage);
        assert_eq!(editor.navigation().index(), Some(0));
        assert_eq!(
            editor.canvas().mask_path(),
            Some(Path::new("/set/mask/a.bmp"))
        );
        assert_eq!(stored(&storage, "a").count_color(BLACK), 256);
        assert!(storage.mask(Path::new("/set/mask/b.bmp")).is_none());
    }

    #[test]
    fn empty_directory_keeps_session() {
        let storage = storage();
        let mut editor = editor(&storage);
        assert_eq!(
            editor.select_directory("/elsewhere").unwrap(),
            SelectOutcome::NoImages
        );
        assert_eq!(editor.current_dir(), Some(Path::new("/set")));
    }

    #[test]
    fn finished_stroke_is_saved_and_reloaded() {
        let storage = storage();
        let mut editor = editor(&storage);
        editor.begin_stroke(Point::new(8, 8), Tool::Brush);
        editor.redraw();
        assert_eq!(editor.end_stroke().unwrap(), StrokeEnd::Finished);

        assert_eq!(stored(&storage, "a").count_color(YELLOW), 21);
        assert_eq!(editor.canvas().mask_snapshot(), Some(stored(&storage, "a")));
        assert!(editor.canvas().stroke().is_none());
    }

    #[test]
    fn erasing_removes_annotations() {
        let storage = storage();
        let mut editor = editor(&storage);
        editor.begin_stroke(Point::new(8, 8), Tool::Brush);
        editor.redraw();
        editor.end_stroke().unwrap();

        editor.begin_stroke(Point::new(8, 8), Tool::Eraser);
        editor.redraw();
        editor.end_stroke().unwrap();
        assert_eq!(stored(&storage, "a").count_color(YELLOW), 0);
    }

    #[test]
    fn navigation_saves_before_switching() {
        let storage = storage();
        let mut editor = editor(&storage);
        editor.begin_stroke(Point::new(4, 4), Tool::Brush);
        editor.redraw();

        assert!(editor.next().unwrap());
        assert_eq!(stored(&storage, "a").count_color(YELLOW), 21);
        assert_eq!(
            editor.canvas().mask_path(),
            Some(Path::new("/set/mask/b.bmp"))
        );

        assert!(editor.next().unwrap());
        assert!(!editor.next().unwrap());
        assert!(editor.prev().unwrap());
        assert_eq!(editor.ui_state().page, Some(2));
    }

    #[test]
    fn invalid_jump_reloads_current_image() {
        let storage = storage();
        let mut editor = editor(&storage);
        assert!(!editor.jump_to(0).unwrap());
        assert!(!editor.jump_to(4).unwrap());
        assert_eq!(editor.navigation().index(), Some(0));
        assert!(editor.jump_to(3).unwrap());
        assert_eq!(
            editor.canvas().mask_path(),
            Some(Path::new("/set/mask/c.bmp"))
        );
    }

    #[test]
    fn clear_discards_annotations() {
        let storage = storage();
        let mut editor = editor(&storage);
        editor.begin_stroke(Point::new(8, 8), Tool::Brush);
        editor.redraw();
        editor.end_stroke().unwrap();

        editor.clear_mask().unwrap();
        assert_eq!(stored(&storage, "a").count_color(YELLOW), 0);
        assert_eq!(
            editor.canvas().mask_snapshot().unwrap().count_color(YELLOW),
            0
        );
    }

    #[test]
    fn rotations_turn_the_stored_files() {
        let storage = storage();
        let mut editor = editor(&storage);
        editor.canvas_mut().set_brush_diameter(1);
        editor.begin_stroke(Point::new(0, 0), Tool::Brush);
        editor.redraw();
        editor.end_stroke().unwrap();

        editor.rotate_image_and_mask().unwrap();
        let mask = stored(&storage, "a");
        assert_eq!(mask.pixel(15, 0), YELLOW);
        let image = storage.image(Path::new("/set/a.png")).unwrap();
        assert_eq!((image.width(), image.height()), (4, 8));

        editor.rotate_mask_only().unwrap();
        assert_eq!(stored(&storage, "a").pixel(15, 15), YELLOW);

        editor.rotate_image_only().unwrap();
        let image = storage.image(Path::new("/set/a.png")).unwrap();
        assert_eq!((image.width(), image.height()), (8, 4));
        assert_eq!(stored(&storage, "a").pixel(15, 15), YELLOW);
    }

    #[test]
    fn failed_load_leaves_canvas_empty() {
        let storage = storage();
        let mut editor = editor(&storage);
        storage.remove_image(Path::new("/set/b.jpg"));

        assert!(editor.next().is_err());
        assert_eq!(editor.navigation().index(), Some(1));
        assert_eq!(editor.canvas().mask_path(), None);

        editor.begin_stroke(Point::new(8, 8), Tool::Brush);
        editor.redraw();
        assert!(editor.end_stroke().is_err());
        assert_eq!(stored(&storage, "a").count_color(YELLOW), 0);
        assert_eq!(stored(&storage, "b").count_color(YELLOW), 0);

        assert!(editor.next().unwrap());
        assert_eq!(
            editor.canvas().mask_path(),
            Some(Path::new("/set/mask/c.bmp"))
        );
    }

    #[test]
    fn failed_rotation_leaves_canvas_empty() {
        let storage = storage();
        let mut editor = editor(&storage);
        storage.remove_image(Path::new("/set/a.png"));

        assert!(editor.rotate_image_only().is_err());
        assert_eq!(editor.canvas().mask_path(), None);
        assert_eq!(editor.ui_state().page, Some(1));
    }

    #[test]
    fn actions_need_an_image() {
        let mut editor = Editor::new(Box::new(storage()), config());
        assert!(matches!(editor.clear_mask(), Err(Error::NoContent)));
        assert!(matches!(editor.rotate_image_only(), Err(Error::NoContent)));
        assert!(!editor.next().unwrap());
    }

    #[test]
    fn directory_collision_is_fatal() {
        let storage = storage().with_directory("/set/mask/a.bmp");
        let mut editor = Editor::new(Box::new(storage.clone()), config());
        let err = editor.select_directory("/set").unwrap_err();
        assert!(err.is_fatal());
        assert!(storage.mask(Path::new("/set/mask/a.bmp")).is_none());
    }
}
