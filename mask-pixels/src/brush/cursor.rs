use image::{Rgb, Rgba, RgbaImage};

use super::{Stamp, Tool};

/// Filled circle in the tool color, transparent outside of the circle.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorGlyph {
    pub tool: Tool,
    pub color: Rgb<u8>,
    pub image: RgbaImage,
    /// Pixel of `image` which sits under the pointer.
    pub hotspot: (u32, u32),
}

impl CursorGlyph {
    pub fn new(tool: Tool, color: Rgb<u8>, stamp: Stamp) -> Self {
        let d = stamp.diameter();
        let half = (d / 2) as i32;
        let Rgb([r, g, b]) = color;

        let mut image = RgbaImage::new(d, d);
        for (dx, dy) in stamp.offsets() {
            image.put_pixel((dx + half) as u32, (dy + half) as u32, Rgba([r, g, b, u8::MAX]));
        }
        Self {
            tool,
            color,
            image,
            hotspot: (d / 2, d / 2),
        }
    }

    pub fn key(&self) -> GlyphKey {
        GlyphKey {
            tool: self.tool,
            color: self.color,
            diameter: self.image.width(),
        }
    }
}

/// Identifies a glyph without comparing its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphKey {
    pub tool: Tool,
    pub color: Rgb<u8>,
    pub diameter: u32,
}

/// Hands the cursor glyph to the windowing layer. A glyph is published when a
/// different tool, color or diameter is shown, and withdrawn (`None`) after a
/// frame in which no glyph was shown.
pub struct CursorSystem {
    publish: Box<dyn FnMut(Option<&CursorGlyph>)>,
    published: Option<GlyphKey>,
    shown_this_frame: bool,
}

impl<T: FnMut(Option<&CursorGlyph>) + 'static> From<T> for CursorSystem {
    fn from(value: T) -> Self {
        Self {
            publish: Box::new(value),
            published: None,
            shown_this_frame: false,
        }
    }
}

impl CursorSystem {
    pub fn show(&mut self, glyph: &CursorGlyph) {
        self.shown_this_frame = true;
        let key = glyph.key();
        if self.published != Some(key) {
            (self.publish)(Some(glyph));
            self.published = Some(key);
        }
    }

    pub fn end_frame(&mut self) {
        let shown = std::mem::take(&mut self.shown_this_frame);
        if !shown && self.published.take().is_some() {
            (self.publish)(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

    #[test]
    fn glyph_is_transparent_outside_circle() {
        let glyph = CursorGlyph::new(Tool::Brush, YELLOW, Stamp::new(5));
        assert_eq!(glyph.image.dimensions(), (5, 5));
        assert_eq!(glyph.hotspot, (2, 2));
        assert_eq!(*glyph.image.get_pixel(2, 2), Rgba([255, 255, 0, 255]));
        assert_eq!(glyph.image.get_pixel(0, 0).0[3], 0);
        assert_eq!(glyph.image.pixels().filter(|p| p.0[3] == 255).count(), 21);
    }

    #[test]
    fn publishes_only_changes() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = calls.clone();
        let mut system = CursorSystem::from(move |glyph: Option<&CursorGlyph>| {
            sink.borrow_mut().push(glyph.map(CursorGlyph::key));
        });

        let brush = CursorGlyph::new(Tool::Brush, YELLOW, Stamp::new(5));
        let bigger = CursorGlyph::new(Tool::Brush, YELLOW, Stamp::new(6));
        let eraser = CursorGlyph::new(Tool::Eraser, Rgb([0, 0, 0]), Stamp::new(50));

        system.show(&brush);
        system.end_frame();
        system.show(&brush);
        system.end_frame();
        system.show(&bigger);
        system.show(&eraser);
        system.end_frame();
        system.end_frame();
        system.end_frame();

        assert_eq!(
            *calls.borrow(),
            vec![
                Some(brush.key()),
                Some(bigger.key()),
                Some(eraser.key()),
                None
            ]
        );
    }

    #[test]
    fn key_tracks_diameter() {
        let glyph = CursorGlyph::new(Tool::Eraser, Rgb([0, 0, 0]), Stamp::new(12));
        assert_eq!(glyph.key().diameter, 12);
        assert_eq!(glyph.key().tool, Tool::Eraser);
    }
}
