//! Bit-level interpretation of the located symbol: format information,
//! capacity tables and the mode-segment stream.

pub mod bits;
pub mod format;
pub mod segments;
pub mod tables;
