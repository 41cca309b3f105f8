use crate::Size;

/// Inclusive diameter range of one tool, plus its start value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct DiameterRange {
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl DiameterRange {
    pub fn contains(&self, diameter: u32) -> bool {
        (self.min..=self.max).contains(&diameter)
    }

    /// One wheel notch. Steps leaving the range are dropped.
    pub fn step(&self, current: u32, delta: f32) -> Option<u32> {
        let next = if delta > 0.0 {
            current.checked_add(1)?
        } else if delta < 0.0 {
            current.checked_sub(1)?
        } else {
            return None;
        };
        self.contains(next).then_some(next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
pub enum StrokeStyle {
    /// One stamp per redraw at the pointer position.
    #[default]
    Dots,
    /// Stamps along the line between the previous and the current position.
    Segments,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct EditorConfig {
    pub mask_size: Size,
    pub viewport: Size,
    pub brush_color: [u8; 3],
    pub eraser_color: [u8; 3],
    pub backdrop_color: [u8; 3],
    pub brush_diameter: DiameterRange,
    pub eraser_diameter: DiameterRange,
    pub stroke_style: StrokeStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mask_size: Size::new(512, 512),
            viewport: Size::new(700, 600),
            brush_color: [255, 255, 0],
            eraser_color: [0, 0, 0],
            backdrop_color: [190, 190, 190],
            brush_diameter: DiameterRange {
                min: 1,
                max: 50,
                default: 5,
            },
            eraser_diameter: DiameterRange {
                min: 5,
                max: 50,
                default: 50,
            },
            stroke_style: StrokeStyle::Dots,
        }
    }
}
