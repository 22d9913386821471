//! Raster conversion of 2D frames.

use egui::ColorImage;
use pmtdisplay_render::{Colormap, Frame};

/// RGBA bytes and `[width, height]` of a 2D frame. The 3D scatter has no
/// raster and returns `None`.
#[must_use]
pub fn frame_rgba(frame: &Frame, colormap: Colormap) -> Option<([usize; 2], Vec<u8>)> {
    match frame {
        Frame::Image(image) => Some(([image.cols(), image.rows()], image.to_rgba(colormap))),
        Frame::Histogram(hist) => Some((
            [hist.n_time_bins(), hist.n_charge_bins()],
            hist.to_rgba(colormap),
        )),
        Frame::Scatter(_) => None,
    }
}

/// Keeps every `step`-th pixel along both axes, with the smallest step that
/// brings both sides within `max_side`.
///
/// Hits are painted as 7x7 blocks on the flat image, so a step of 2 (the
/// one the full-size image needs under the common 2048 limit) keeps every
/// hit visible.
#[must_use]
pub fn downsample_rgba(
    size: [usize; 2],
    pixels: Vec<u8>,
    max_side: usize,
) -> ([usize; 2], Vec<u8>) {
    let [width, height] = size;
    let step = width.max(height).div_ceil(max_side.max(1)).max(1);
    if step == 1 {
        return (size, pixels);
    }
    let out = [width.div_ceil(step), height.div_ceil(step)];
    let mut sampled = Vec::with_capacity(out[0] * out[1] * 4);
    for y in (0..height).step_by(step) {
        for x in (0..width).step_by(step) {
            let at = (y * width + x) * 4;
            sampled.extend_from_slice(&pixels[at..at + 4]);
        }
    }
    log::debug!("texture downsampled from {width}x{height} to {}x{}", out[0], out[1]);
    (out, sampled)
}

/// Texture image of a 2D frame whose sides do not exceed `max_side`.
#[must_use]
pub fn frame_image(frame: &Frame, colormap: Colormap, max_side: usize) -> Option<ColorImage> {
    let (size, pixels) = frame_rgba(frame, colormap)?;
    let (size, pixels) = downsample_rgba(size, pixels, max_side);
    Some(ColorImage::from_rgba_unmultiplied(size, &pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmtdisplay_render::{ChargeTimeHistogram, FlatImage, RenderConfig};

    #[test]
    fn test_image_size_is_width_by_height() {
        let frame = Frame::Image(FlatImage::new(3, 5));
        let image = frame_image(&frame, Colormap::Grayscale, 2048).unwrap();
        assert_eq!(image.size, [5, 3]);
    }

    #[test]
    fn test_histogram_raster() {
        let hist = ChargeTimeHistogram::new(4, 2, (0.0, 1.0), (0.0, 1.0));
        let (size, pixels) = frame_rgba(&Frame::Histogram(hist), Colormap::Hot).unwrap();
        assert_eq!(size, [4, 2]);
        assert_eq!(pixels.len(), 4 * 2 * 4);
    }

    #[test]
    fn test_full_flat_image_fits_texture_limit() {
        let config = RenderConfig::default();
        let frame = Frame::Image(FlatImage::new(config.image_rows, config.image_cols));
        let image = frame_image(&frame, Colormap::Grayscale, 2048).unwrap();
        assert!(image.size[0] <= 2048 && image.size[1] <= 2048);
        assert_eq!(
            image.size,
            [config.image_cols.div_ceil(2), config.image_rows.div_ceil(2)]
        );
        assert_eq!(image.pixels.len(), image.size[0] * image.size[1]);
    }

    #[test]
    fn test_downsample_keeps_sampled_pixels() {
        // 3x2 image, pixel value = its index.
        let pixels: Vec<u8> = (0..6u8).flat_map(|i| [i, i, i, 255]).collect();
        let (size, sampled) = downsample_rgba([3, 2], pixels.clone(), 2);
        assert_eq!(size, [2, 1]);
        assert_eq!(sampled, vec![0, 0, 0, 255, 2, 2, 2, 255]);

        let (size, same) = downsample_rgba([3, 2], pixels.clone(), 3);
        assert_eq!(size, [3, 2]);
        assert_eq!(same, pixels);
    }
}
