/// Pastes rendered cells into the atlas
use image::RgbaImage;
use rayon::prelude::*;

const RGBA_CHANNELS: usize = 4;

/// Resets every atlas pixel to fully transparent.
pub fn clear(atlas: &mut RgbaImage) {
    let atlas_bytes: &mut [u8] = &mut **atlas;
    atlas_bytes.fill(0);
}

/// Overwrites the atlas region at (`offset_x`, `offset_y`) with `cell`.
/// No blending; rows are copied in parallel. The caller guarantees the cell fits.
pub fn composite(atlas: &mut RgbaImage, cell: &RgbaImage, offset_x: u32, offset_y: u32) {
    let (cell_width, cell_height) = cell.dimensions();
    debug_assert!(
        offset_x + cell_width <= atlas.width() && offset_y + cell_height <= atlas.height(),
        "cell {}x{} at ({}, {}) overflows {}x{} atlas",
        cell_width,
        cell_height,
        offset_x,
        offset_y,
        atlas.width(),
        atlas.height()
    );

    let atlas_stride = atlas.width() as usize * RGBA_CHANNELS;
    let cell_stride = cell_width as usize * RGBA_CHANNELS;
    let start = offset_x as usize * RGBA_CHANNELS;
    let atlas_bytes: &mut [u8] = &mut **atlas;

    atlas_bytes
        .par_chunks_exact_mut(atlas_stride)
        .skip(offset_y as usize)
        .take(cell_height as usize)
        .zip(cell.as_raw().par_chunks_exact(cell_stride))
        .for_each(|(atlas_row, cell_row)| {
            atlas_row[start..start + cell_stride].copy_from_slice(cell_row);
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(size: u32, colour: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba(colour))
    }

    #[test]
    fn composited_region_reads_back_exactly() {
        let mut atlas = RgbaImage::new(64, 64);
        let colour = [12, 200, 34, 255];
        composite(&mut atlas, &solid(16, colour), 32, 16);

        for (x, y, pixel) in atlas.enumerate_pixels() {
            let inside = (32..48).contains(&x) && (16..32).contains(&y);
            if inside {
                assert_eq!(pixel.0, colour, "({x}, {y})");
            } else {
                assert_eq!(pixel.0, [0, 0, 0, 0], "({x}, {y})");
            }
        }
    }

    #[test]
    fn overwrites_without_blending() {
        let mut atlas = solid(32, [255, 255, 255, 255]);
        composite(&mut atlas, &solid(16, [10, 20, 30, 0]), 16, 16);

        assert_eq!(atlas.get_pixel(20, 20).0, [10, 20, 30, 0]);
        assert_eq!(atlas.get_pixel(4, 4).0, [255, 255, 255, 255]);
    }

    #[test]
    fn preserves_cell_pixel_layout() {
        let mut cell = RgbaImage::new(4, 4);
        for (x, y, pixel) in cell.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8, y as u8, 7, 255]);
        }
        let mut atlas = RgbaImage::new(8, 8);
        composite(&mut atlas, &cell, 4, 4);

        assert_eq!(atlas.get_pixel(4, 4).0, [0, 0, 7, 255]);
        assert_eq!(atlas.get_pixel(7, 5).0, [3, 1, 7, 255]);
        assert_eq!(atlas.get_pixel(5, 7).0, [1, 3, 7, 255]);
    }

    #[test]
    fn clear_makes_everything_transparent() {
        let mut atlas = solid(8, [1, 2, 3, 4]);
        clear(&mut atlas);
        assert!(atlas.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}
