/// Atlas grid sizing and cell placement
use serde::{Deserialize, Serialize};

/// Square atlas made of square cells laid out row-major from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasLayout {
    /// Cells per row and per column, always a power of two.
    pub grid_width: u32,
    pub cell_pixel_size: u32,
    /// Width and height of the whole atlas in pixels.
    pub atlas_pixel_size: u32,
}

impl AtlasLayout {
    /// Smallest power-of-two square grid holding `total_count` cells.
    /// A zero count is treated as a single cell. `None` when the atlas side
    /// does not fit in a `u32`.
    pub fn plan(total_count: u32, cell_pixel_size: u32) -> Option<Self> {
        let count = total_count.max(1);
        let grid_width = 2f64.powf((count as f64).sqrt().log2().ceil()).round() as u32;
        debug_assert!(
            grid_width as u64 * grid_width as u64 >= count as u64,
            "grid of width {} cannot hold {} cells",
            grid_width,
            count
        );

        Some(Self {
            grid_width,
            cell_pixel_size,
            atlas_pixel_size: grid_width.checked_mul(cell_pixel_size)?,
        })
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.grid_width) * u64::from(self.grid_width)
    }

    /// Bytes of an RGBA8 atlas, if addressable on this platform
    pub fn atlas_byte_len(&self) -> Option<usize> {
        let side = usize::try_from(self.atlas_pixel_size).ok()?;
        side.checked_mul(side)?.checked_mul(4)
    }

    /// Top-left pixel of the cell holding sample `index`
    pub fn cell_offset(&self, index: u32) -> (u32, u32) {
        (
            index % self.grid_width * self.cell_pixel_size,
            index / self.grid_width * self.cell_pixel_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn planned(total: u32, cell: u32) -> AtlasLayout {
        AtlasLayout::plan(total, cell).expect("atlas fits")
    }

    #[test]
    fn plans_documented_sizes() {
        let layout = planned(10, 64);
        assert_eq!(layout.grid_width, 4);
        assert_eq!(layout.atlas_pixel_size, 256);

        assert_eq!(planned(15, 64).grid_width, 4);
        assert_eq!(planned(16, 64).grid_width, 4);
        assert_eq!(planned(17, 64).grid_width, 8);
        assert_eq!(planned(1, 32).grid_width, 1);
        assert_eq!(planned(0, 32).grid_width, 1);
    }

    #[test]
    fn grid_is_smallest_sufficient_power_of_two() {
        for total in 1..=5000u32 {
            let width = planned(total, 16).grid_width;
            assert!(width.is_power_of_two(), "{total} -> {width}");
            assert!(width * width >= total, "{total} -> {width}");
            if width > 1 {
                let half = width / 2;
                assert!(half * half < total, "{total} -> {width} is not minimal");
            }
        }
    }

    #[test]
    fn offsets_are_distinct_and_inside_atlas() {
        for total in [1u32, 3, 15, 36, 81, 153] {
            let layout = planned(total, 24);
            let mut seen = HashSet::new();
            for index in 0..total {
                let (x, y) = layout.cell_offset(index);
                assert!(x + layout.cell_pixel_size <= layout.atlas_pixel_size);
                assert!(y + layout.cell_pixel_size <= layout.atlas_pixel_size);
                assert!(seen.insert((x, y)), "cell {index} collides");
            }
        }
    }

    #[test]
    fn placement_is_row_major() {
        let layout = planned(15, 64);
        assert_eq!(layout.cell_offset(0), (0, 0));
        assert_eq!(layout.cell_offset(3), (192, 0));
        assert_eq!(layout.cell_offset(4), (0, 64));
        assert_eq!(layout.cell_offset(14), (128, 192));
    }

    #[test]
    fn oversized_atlas_side_is_not_planned() {
        assert_eq!(AtlasLayout::plan(15, u32::MAX / 2), None);
        assert_eq!(AtlasLayout::plan(u32::MAX, 1 << 16), None);

        let widest = planned(u32::MAX, 1);
        assert_eq!(widest.grid_width, 1 << 16);
        assert_eq!(widest.cell_count(), 1 << 32);
    }

    #[test]
    fn byte_length_covers_rgba_pixels() {
        assert_eq!(planned(15, 64).atlas_byte_len(), Some(256 * 256 * 4));
    }
}
