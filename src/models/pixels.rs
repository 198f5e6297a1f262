/// Borrowed view over a caller-owned row-major RGBA pixel buffer
///
/// The byte length is not validated here; `binarize` checks it against
/// `width * height * 4` before any pixel is touched.
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    /// Raw RGBA bytes, 4 per pixel
    pub data: &'a [u8],
    /// Image width in pixels
    pub width: usize,
    /// Image height in pixels
    pub height: usize,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap an RGBA byte slice with its dimensions
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Self {
        Self { data, width, height }
    }
}
