use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbaImage};
use log::debug;

use crate::{
    CursorGlyph, EditorConfig, Error, MaskBuffer, Point, Rect, Result, Size, Storage, StrokeStyle,
    Tool, ToolState, backdrop_from, flatten_layer, key_transparency, overlay,
};

/// State of a held pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeSession {
    /// Last pointer position in viewport coordinates.
    pub pos: Point,
    pub tool: Tool,
    last_stamped: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeEnd {
    /// There was no stroke to finish.
    Idle,
    /// A stroke ended. The displayed composite should be re-derived from storage.
    Finished,
}

struct Content {
    backdrop: RgbaImage,
    layer: RgbaImage,
    mask_path: PathBuf,
}

/// Fixed-resolution paint surface centered inside a resizable viewport.
pub struct CanvasSurface {
    config: EditorConfig,
    tools: ToolState,
    viewport: Size,
    image_rect: Rect,
    content: Option<Content>,
    stroke: Option<StrokeSession>,
    cursor_tool: Tool,
    composite: Option<RgbaImage>,
    revision: u64,
}

/// What to display for one redraw.
pub struct Frame<'a> {
    pub viewport: Size,
    pub image_rect: Rect,
    /// Fill of the viewport around the image.
    pub backdrop: Rgb<u8>,
    /// Source image with the mask layer blended on top, sized like the mask.
    pub composite: Option<&'a RgbaImage>,
    /// Changes whenever `composite` does.
    pub revision: u64,
}

impl CanvasSurface {
    pub fn new(config: EditorConfig) -> Self {
        let tools = ToolState::from(&config);
        let viewport = config.viewport;
        Self {
            image_rect: Rect::centered(viewport, config.mask_size),
            config,
            tools,
            viewport,
            content: None,
            stroke: None,
            cursor_tool: Tool::Brush,
            composite: None,
            revision: 0,
        }
    }

    pub fn resize(&mut self, viewport: Size) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.image_rect = Rect::centered(viewport, self.config.mask_size);
        }
    }

    pub fn image_rect(&self) -> Rect {
        self.image_rect
    }

    pub fn mask_path(&self) -> Option<&Path> {
        self.content.as_ref().map(|c| c.mask_path.as_path())
    }

    /// Replaces the displayed image and mask. Only pixels in the current brush
    /// color are kept from `mask`, everything else shows the image through.
    pub fn load_content(&mut self, image: &DynamicImage, mask: MaskBuffer, mask_path: PathBuf) {
        let key = self.tools.color(Tool::Brush);
        debug!("Loading {} into canvas", mask_path.display());
        self.content = Some(Content {
            backdrop: backdrop_from(image, self.config.mask_size),
            layer: key_transparency(&mask, key),
            mask_path,
        });
        self.invalidate();
    }

    pub fn unload(&mut self) {
        self.content = None;
        self.stroke = None;
        self.cursor_tool = Tool::Brush;
        self.invalidate();
    }

    pub fn begin_stroke(&mut self, pos: Point, tool: Tool) {
        debug!("Begin {tool:?} stroke at {pos:?}");
        self.stroke = Some(StrokeSession {
            pos,
            tool,
            last_stamped: None,
        });
        self.cursor_tool = tool;
    }

    /// Ignored while no stroke is active. Painting happens on the next `redraw`.
    pub fn continue_stroke(&mut self, pos: Point, tool: Tool) {
        if let Some(session) = &mut self.stroke {
            session.pos = pos;
            session.tool = tool;
            self.cursor_tool = tool;
        }
    }

    /// Saves the mask and finishes the active stroke, if any.
    pub fn end_stroke(&mut self, storage: &dyn Storage) -> Result<StrokeEnd> {
        let finished = self.stroke.take().is_some();
        if finished {
            self.cursor_tool = Tool::Brush;
            debug!("End stroke");
        }
        if self.content.is_some() {
            self.save(storage)?;
        }
        Ok(if finished {
            StrokeEnd::Finished
        } else {
            StrokeEnd::Idle
        })
    }

    /// Stamps the active stroke into the mask layer and returns the frame to display.
    pub fn redraw(&mut self) -> Frame<'_> {
        self.stamp_stroke();
        if self.composite.is_none() {
            self.composite = self
                .content
                .as_ref()
                .map(|c| overlay(&c.backdrop, &c.layer));
        }
        Frame {
            viewport: self.viewport,
            image_rect: self.image_rect,
            backdrop: self.config.backdrop_color.into(),
            composite: self.composite.as_ref(),
            revision: self.revision,
        }
    }

    fn stamp_stroke(&mut self) {
        let (Some(content), Some(session)) = (&mut self.content, &mut self.stroke) else {
            return;
        };
        let pen = self.tools.pen(session.tool);
        let local = self.image_rect.to_local(session.pos);

        match (self.config.stroke_style, session.last_stamped) {
            (StrokeStyle::Segments, Some(previous)) => {
                pen.stamp
                    .paint_segment(&mut content.layer, previous, local, pen.rgba())
            }
            _ => pen.stamp.paint(&mut content.layer, local, pen.rgba()),
        }
        session.last_stamped = Some(local);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.composite = None;
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn stroke(&self) -> Option<&StrokeSession> {
        self.stroke.as_ref()
    }

    pub fn cursor_tool(&self) -> Tool {
        self.cursor_tool
    }

    pub fn cursor(&self) -> &CursorGlyph {
        self.tools.cursor(self.cursor_tool)
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_brush_color(&mut self, color: Rgb<u8>) {
        self.tools.set_brush_color(color);
    }

    pub fn set_brush_diameter(&mut self, diameter: u32) {
        self.tools.set_brush_diameter(diameter);
    }

    pub fn set_eraser_diameter(&mut self, diameter: u32) {
        self.tools.set_eraser_diameter(diameter);
    }

    /// The mask as it would be written to disk right now.
    pub fn mask_snapshot(&self) -> Option<MaskBuffer> {
        let background = self.tools.color(Tool::Eraser);
        self.content
            .as_ref()
            .map(|c| flatten_layer(&c.layer, background))
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        let content = self.content.as_ref().ok_or(Error::NoContent)?;
        let mask = flatten_layer(&content.layer, self.tools.color(Tool::Eraser));
        storage.store_mask(&content.mask_path, &mask)?;
        debug!("Saved mask {}", content.mask_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbImage};

    use super::*;
    use crate::InMemoryStorage;

    const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const GRAY: Rgb<u8> = Rgb([190, 190, 190]);

    fn surface(config: EditorConfig) -> CanvasSurface {
        let mut canvas = CanvasSurface::new(config.clone());
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([51, 51, 51])));
        let mask = MaskBuffer::new_filled(config.mask_size, BLACK);
        canvas.load_content(&image, mask, PathBuf::from("/set/mask/a.bmp"));
        canvas
    }

    fn small() -> EditorConfig {
        EditorConfig {
            mask_size: Size::new(16, 16),
            viewport: Size::new(20, 20),
            ..Default::default()
        }
    }

    #[test]
    fn stroke_is_mapped_into_mask_space() {
        let config = EditorConfig {
            viewport: Size::new(612, 562),
            ..Default::default()
        };
        let mut canvas = surface(config);
        assert_eq!(canvas.image_rect().min, Point::new(50, 25));

        canvas.begin_stroke(Point::new(100, 100), Tool::Brush);
        canvas.redraw();

        let mask = canvas.mask_snapshot().unwrap();
        assert_eq!(mask.pixel(50, 75), YELLOW);
        assert_eq!(mask.count_color(YELLOW), 21);
    }

    #[test]
    fn moves_without_stroke_do_not_paint() {
        let mut canvas = surface(small());
        canvas.continue_stroke(Point::new(10, 10), Tool::Brush);
        canvas.redraw();
        assert!(canvas.stroke().is_none());
        assert_eq!(canvas.mask_snapshot().unwrap().count_color(YELLOW), 0);
    }

    #[test]
    fn modifier_switches_tool_mid_stroke() {
        let mut canvas = surface(small());
        canvas.set_eraser_diameter(3);

        canvas.begin_stroke(Point::new(10, 10), Tool::Brush);
        canvas.redraw();
        canvas.continue_stroke(Point::new(10, 10), Tool::Eraser);
        assert_eq!(canvas.cursor_tool(), Tool::Eraser);
        assert_eq!(canvas.cursor().tool, Tool::Eraser);
        canvas.redraw();

        let mask = canvas.mask_snapshot().unwrap();
        assert_eq!(mask.pixel(8, 8), BLACK);
        assert_eq!(mask.count_color(YELLOW), 21 - 9);
    }

    #[test]
    fn dots_do_not_connect() {
        let mut canvas = surface(small());
        canvas.set_brush_diameter(1);
        canvas.begin_stroke(Point::new(2, 10), Tool::Brush);
        canvas.redraw();
        canvas.continue_stroke(Point::new(8, 10), Tool::Brush);
        canvas.redraw();
        assert_eq!(canvas.mask_snapshot().unwrap().count_color(YELLOW), 2);
    }

    #[test]
    fn segments_connect_consecutive_positions() {
        let mut canvas = surface(EditorConfig {
            stroke_style: StrokeStyle::Segments,
            ..small()
        });
        canvas.set_brush_diameter(1);
        canvas.begin_stroke(Point::new(2, 10), Tool::Brush);
        canvas.redraw();
        canvas.continue_stroke(Point::new(8, 10), Tool::Brush);
        canvas.redraw();

        let mask = canvas.mask_snapshot().unwrap();
        assert_eq!(mask.count_color(YELLOW), 7);
        assert!((0..=6).all(|x| mask.pixel(x, 8) == YELLOW));
    }

    #[test]
    fn end_stroke_saves_and_resets_cursor() {
        let storage = InMemoryStorage::new(small().mask_size, BLACK, []);
        let mut canvas = surface(small());
        canvas.begin_stroke(Point::new(10, 10), Tool::Eraser);
        canvas.redraw();

        assert_eq!(canvas.end_stroke(&storage).unwrap(), StrokeEnd::Finished);
        assert_eq!(canvas.cursor_tool(), Tool::Brush);
        assert!(storage.mask(Path::new("/set/mask/a.bmp")).is_some());

        assert_eq!(canvas.end_stroke(&storage).unwrap(), StrokeEnd::Idle);
    }

    #[test]
    fn end_stroke_without_content_is_idle() {
        let storage = InMemoryStorage::new(small().mask_size, BLACK, []);
        let mut canvas = CanvasSurface::new(small());
        assert_eq!(canvas.end_stroke(&storage).unwrap(), StrokeEnd::Idle);
        assert!(matches!(canvas.save(&storage), Err(Error::NoContent)));
    }

    #[test]
    fn previous_annotations_render_opaque() {
        let config = small();
        let mut canvas = CanvasSurface::new(config.clone());
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([51, 51, 51])));
        let mut mask = RgbImage::from_pixel(16, 16, BLACK);
        mask.put_pixel(3, 3, YELLOW);
        canvas.load_content(&image, MaskBuffer::from(mask), PathBuf::from("m.bmp"));

        let frame = canvas.redraw();
        let composite = frame.composite.unwrap();
        assert_eq!(*composite.get_pixel(3, 3), Rgba([102, 102, 0, 255]));
        assert_eq!(*composite.get_pixel(0, 0), Rgba([51, 51, 51, 255]));
    }

    #[test]
    fn frame_places_image_inside_viewport() {
        let mut canvas = surface(small());
        let frame = canvas.redraw();
        assert_eq!(frame.viewport, Size::new(20, 20));
        assert_eq!(frame.image_rect.min, Point::new(2, 2));
        assert_eq!(frame.backdrop, GRAY);

        let composite = frame.composite.unwrap();
        assert_eq!(composite.dimensions(), (16, 16));
        assert_eq!(*composite.get_pixel(0, 0), Rgba([51, 51, 51, 255]));
    }

    #[test]
    fn unloaded_frame_has_no_composite() {
        let mut canvas = surface(small());
        canvas.unload();
        assert!(canvas.redraw().composite.is_none());
        assert_eq!(canvas.mask_path(), None);
    }

    #[test]
    fn revision_changes_with_painting_only() {
        let mut canvas = surface(small());
        let before = canvas.redraw().revision;
        assert_eq!(canvas.redraw().revision, before);
        canvas.begin_stroke(Point::new(5, 5), Tool::Brush);
        assert_ne!(canvas.redraw().revision, before);
    }

    #[test]
    fn resize_recenters_image() {
        let mut canvas = CanvasSurface::new(small());
        canvas.resize(Size::new(40, 30));
        assert_eq!(canvas.image_rect().min, Point::new(12, 7));
    }
}
