/// Compact bit grid, one bit per cell, row-major
///
/// Used both for binarized images and for sampled module matrices.
/// Out-of-range reads return false and out-of-range writes are ignored,
/// so callers can probe freely near edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl BitGrid {
    /// Create a cleared grid with the given dimensions
    pub fn new(width: usize, height: usize) -> Self {
        let bytes_needed = (width * height).div_ceil(8);
        Self {
            width,
            height,
            data: vec![0; bytes_needed],
        }
    }

    /// Grid width in cells
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get bit at (x, y)
    pub fn get(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        (self.data[byte_index] >> bit_index) & 1 == 1
    }

    /// Set bit at (x, y)
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = y * self.width + x;
        let byte_index = index / 8;
        let bit_index = index % 8;
        if value {
            self.data[byte_index] |= 1 << bit_index;
        } else {
            self.data[byte_index] &= !(1 << bit_index);
        }
    }
}
