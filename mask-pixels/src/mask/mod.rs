use image::{DynamicImage, Rgb, RgbImage, imageops};

use crate::Size;

/// Fixed-resolution RGB mask. Pixels equal to the brush color are annotated,
/// everything else counts as background.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskBuffer(RgbImage);

impl MaskBuffer {
    pub fn new_filled(size: Size, color: Rgb<u8>) -> Self {
        Self(RgbImage::from_pixel(size.width, size.height, color))
    }

    /// Returns None if the decoded image does not have the expected resolution.
    pub fn from_image(image: DynamicImage, expected: Size) -> Option<Self> {
        let buffer = Self(image.into_rgb8());
        (buffer.size() == expected).then_some(buffer)
    }

    pub fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.0.get_pixel(x, y)
    }

    pub fn as_image(&self) -> &RgbImage {
        &self.0
    }

    pub fn count_color(&self, color: Rgb<u8>) -> usize {
        self.0.pixels().filter(|p| **p == color).count()
    }

    /// Quarter turn clockwise.
    pub fn rotated(&self) -> Self {
        Self(imageops::rotate90(&self.0))
    }
}

impl From<RgbImage> for MaskBuffer {
    fn from(value: RgbImage) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

    #[test]
    fn wrong_resolution_is_rejected() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(256, 256));
        assert!(MaskBuffer::from_image(image, Size::new(512, 512)).is_none());
    }

    #[test]
    fn grayscale_input_is_normalized_to_rgb() {
        let image = DynamicImage::ImageLuma8(image::GrayImage::new(4, 4));
        let mask = MaskBuffer::from_image(image, Size::new(4, 4)).unwrap();
        assert_eq!(mask.count_color(BLACK), 16);
    }

    #[test]
    fn rotation_moves_top_left_to_top_right() {
        let mut image = RgbImage::from_pixel(3, 3, BLACK);
        image.put_pixel(0, 0, YELLOW);
        let rotated = MaskBuffer::from(image).rotated();
        assert_eq!(rotated.pixel(2, 0), YELLOW);
        assert_eq!(rotated.count_color(YELLOW), 1);
    }
}
