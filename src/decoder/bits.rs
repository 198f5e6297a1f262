//! MSB-first bit cursor over codeword bytes.

/// Read-only cursor into a byte slice, consumed bit by bit
///
/// Reads past the end return `None` and leave the position unchanged, so
/// a truncated field can be rewound and accounted for instead of panicking.
#[derive(Debug)]
pub struct BitCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BitCursor<'a> {
    /// Cursor at the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current bit offset from the start
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left before the end of the slice
    pub fn remaining(&self) -> usize {
        self.bytes.len() * 8 - self.pos
    }

    /// Move the cursor back to an earlier position
    pub fn rewind_to(&mut self, pos: usize) {
        debug_assert!(pos <= self.pos);
        self.pos = pos;
    }

    /// Read `count` bits MSB-first, `count` at most 32
    pub fn read(&mut self, count: usize) -> Option<u32> {
        debug_assert!(count <= 32);
        if count > self.remaining() {
            return None;
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.bytes[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.pos += 1;
        }
        Some(value)
    }

    /// Advance past `count` bits without decoding them
    pub fn skip(&mut self, count: usize) -> Option<()> {
        if count > self.remaining() {
            return None;
        }
        self.pos += count;
        Some(())
    }
}
