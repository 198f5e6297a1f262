//! Core data structures exchanged between pipeline stages.

/// Packed bit grid for binarized images and module matrices
pub mod grid;
/// Input contract from the localization/decoding collaborator
pub mod location;
/// Borrowed RGBA pixel buffer view
pub mod pixels;
/// 2D floating point coordinate
pub mod point;
/// Structural report types
pub mod report;

pub use grid::BitGrid;
pub use location::{ExternalChunk, LocatedSymbol, SymbolLocation};
pub use pixels::PixelBuffer;
pub use point::Point;
pub use report::{
    BlockGroup, DecodeReport, EcLevel, EcLevelSource, FormatMetadata, PaddingSummary,
    SegmentContent, SegmentHalt, SegmentMode, SegmentReport, VersionCapacity,
};
