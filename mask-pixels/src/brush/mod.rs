use image::{Rgb, Rgba, RgbaImage};
use log::debug;

use crate::{EditorConfig, Point};

mod cursor;

pub use cursor::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
}

impl Tool {
    /// The alternate modifier (Alt) selects the eraser for the current event.
    pub fn from_modifier(alternate_held: bool) -> Self {
        if alternate_held {
            Self::Eraser
        } else {
            Self::Brush
        }
    }
}

/// Round stamp of a given diameter.
///
/// Odd diameters are centered on the pixel under the pointer, even diameters
/// on its top-left corner, so a stamp always covers exactly `diameter` pixels
/// along both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stamp {
    diameter: u32,
}

impl Stamp {
    pub fn new(diameter: u32) -> Self {
        Self {
            diameter: diameter.max(1),
        }
    }

    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    /// Offsets relative to the stamped position which the stamp covers.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        let d = self.diameter as i32;
        let radius = self.diameter as f32 / 2.0;
        let radius_sq = radius * radius;
        let shift = if d % 2 == 0 { 0.5 } else { 0.0 };
        let range = -(d / 2)..=(d - 1) / 2;

        range.clone().flat_map(move |dy| {
            range.clone().filter_map(move |dx| {
                let fx = dx as f32 + shift;
                let fy = dy as f32 + shift;
                (fx * fx + fy * fy <= radius_sq).then_some((dx, dy))
            })
        })
    }

    /// Paints the stamp into `layer`, clipping at its borders.
    pub fn paint(&self, layer: &mut RgbaImage, center: Point, color: Rgba<u8>) {
        let (width, height) = layer.dimensions();
        for (dx, dy) in self.offsets() {
            let x = center.x + dx;
            let y = center.y + dy;
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                layer.put_pixel(x as u32, y as u32, color);
            }
        }
    }

    /// Paints stamps on every pixel of the line from `from` to `to`.
    pub fn paint_segment(&self, layer: &mut RgbaImage, from: Point, to: Point, color: Rgba<u8>) {
        for p in line_points(from, to) {
            self.paint(layer, p, color);
        }
    }
}

/// Bresenham rasterization including both end points.
fn line_points(from: Point, to: Point) -> impl Iterator<Item = Point> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut current = Some(from);

    std::iter::from_fn(move || {
        let p = current?;
        current = if p == to {
            None
        } else {
            let mut next = p;
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                next.x += sx;
            }
            if e2 <= dx {
                err += dx;
                next.y += sy;
            }
            Some(next)
        };
        Some(p)
    })
}

/// Solid pen with round cap used for one paint action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pen {
    pub tool: Tool,
    pub color: Rgb<u8>,
    pub stamp: Stamp,
}

impl Pen {
    pub fn rgba(&self) -> Rgba<u8> {
        let Rgb([r, g, b]) = self.color;
        Rgba([r, g, b, u8::MAX])
    }
}

/// Colors and stamp diameters of both tools. Diameter ranges are enforced by
/// the caller, any positive value is accepted here.
#[derive(Debug, Clone)]
pub struct ToolState {
    brush_color: Rgb<u8>,
    eraser_color: Rgb<u8>,
    brush_diameter: u32,
    eraser_diameter: u32,
    brush_cursor: CursorGlyph,
    eraser_cursor: CursorGlyph,
}

impl ToolState {
    pub fn new(
        brush_color: Rgb<u8>,
        eraser_color: Rgb<u8>,
        brush_diameter: u32,
        eraser_diameter: u32,
    ) -> Self {
        Self {
            brush_color,
            eraser_color,
            brush_diameter,
            eraser_diameter,
            brush_cursor: CursorGlyph::new(Tool::Brush, brush_color, Stamp::new(brush_diameter)),
            eraser_cursor: CursorGlyph::new(
                Tool::Eraser,
                eraser_color,
                Stamp::new(eraser_diameter),
            ),
        }
    }

    pub fn color(&self, tool: Tool) -> Rgb<u8> {
        match tool {
            Tool::Brush => self.brush_color,
            Tool::Eraser => self.eraser_color,
        }
    }

    pub fn diameter(&self, tool: Tool) -> u32 {
        match tool {
            Tool::Brush => self.brush_diameter,
            Tool::Eraser => self.eraser_diameter,
        }
    }

    pub fn pen(&self, tool: Tool) -> Pen {
        Pen {
            tool,
            color: self.color(tool),
            stamp: Stamp::new(self.diameter(tool)),
        }
    }

    pub fn cursor(&self, tool: Tool) -> &CursorGlyph {
        match tool {
            Tool::Brush => &self.brush_cursor,
            Tool::Eraser => &self.eraser_cursor,
        }
    }

    pub fn set_brush_color(&mut self, color: Rgb<u8>) {
        self.brush_color = color;
        self.regenerate(Tool::Brush);
    }

    pub fn set_brush_diameter(&mut self, diameter: u32) {
        self.brush_diameter = diameter;
        self.regenerate(Tool::Brush);
    }

    pub fn set_eraser_diameter(&mut self, diameter: u32) {
        self.eraser_diameter = diameter;
        self.regenerate(Tool::Eraser);
    }

    fn regenerate(&mut self, tool: Tool) {
        let glyph = CursorGlyph::new(tool, self.color(tool), Stamp::new(self.diameter(tool)));
        debug!("Regenerated {tool:?} cursor ({}px)", glyph.image.width());
        match tool {
            Tool::Brush => self.brush_cursor = glyph,
            Tool::Eraser => self.eraser_cursor = glyph,
        }
    }
}

impl From<&EditorConfig> for ToolState {
    fn from(config: &EditorConfig) -> Self {
        Self::new(
            config.brush_color.into(),
            config.eraser_color.into(),
            config.brush_diameter.default,
            config.eraser_diameter.default,
        )
    }
}
