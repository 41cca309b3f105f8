use image::{DynamicImage, Rgb, Rgba, RgbaImage, imageops::FilterType};

use crate::{MaskBuffer, Size};

/// Scales `image` to exactly `size`, ignoring its aspect ratio.
pub fn backdrop_from(image: &DynamicImage, size: Size) -> RgbaImage {
    image
        .resize_exact(size.width, size.height, FilterType::Nearest)
        .into_rgba8()
}

/// Turns the mask into a paint layer: pixels equal to `key` stay opaque,
/// all other pixels become fully transparent.
pub fn key_transparency(mask: &MaskBuffer, key: Rgb<u8>) -> RgbaImage {
    let Size { width, height } = mask.size();
    RgbaImage::from_fn(width, height, |x, y| {
        let pixel = mask.pixel(x, y);
        if pixel == key {
            let Rgb([r, g, b]) = pixel;
            Rgba([r, g, b, u8::MAX])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Collapses a paint layer back into a mask. Transparent pixels become `background`.
pub fn flatten_layer(layer: &RgbaImage, background: Rgb<u8>) -> MaskBuffer {
    let (width, height) = layer.dimensions();
    MaskBuffer::from(image::RgbImage::from_fn(width, height, |x, y| {
        match *layer.get_pixel(x, y) {
            Rgba([_, _, _, 0]) => background,
            Rgba([r, g, b, _]) => Rgb([r, g, b]),
        }
    }))
}

/// Draws `layer` over `backdrop` with the overlay blend mode, anchored at the
/// top-left corner. The result has the size of the backdrop.
pub fn overlay(backdrop: &RgbaImage, layer: &RgbaImage) -> RgbaImage {
    let mut result = backdrop.clone();
    let (width, height) = backdrop.dimensions();
    let width = width.min(layer.width());
    let height = height.min(layer.height());

    for y in 0..height {
        for x in 0..width {
            let dst = result.get_pixel_mut(x, y);
            *dst = overlay_pixel(*dst, *layer.get_pixel(x, y));
        }
    }
    result
}

fn overlay_pixel(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3] as f32 / 255.0;
    let da = dst.0[3] as f32 / 255.0;
    if sa == 0.0 {
        return dst;
    }
    let ra = sa + da - sa * da;

    let mut out = [0u8; 4];
    for c in 0..3 {
        // Premultiplied channels
        let s = src.0[c] as f32 / 255.0 * sa;
        let d = dst.0[c] as f32 / 255.0 * da;
        let blended = if 2.0 * d < da {
            2.0 * s * d
        } else {
            sa * da - 2.0 * (da - d) * (sa - s)
        };
        let r = blended + s * (1.0 - da) + d * (1.0 - sa);
        out[c] = (r / ra * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (ra * 255.0).round() as u8;
    Rgba(out)
}
